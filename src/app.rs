//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves settings and installs logging
//! - dispatches to the TUI or to a one-shot subcommand

use clap::Parser;

use crate::cli::{Command, PredictArgs, SourceArgs, StatsArgs};
use crate::config::Settings;
use crate::data::{DEFAULT_AGE, ReferenceTable};
use crate::domain::{Field, Profile, SALARY_BANDS, matching_band};
use crate::error::AppError;
use crate::logging::LogTarget;
use crate::session::Session;

pub mod pipeline;

/// Entry point for the `salary` binary.
pub fn run() -> Result<(), AppError> {
    // We want `salary` and `salary -d file.csv` to behave like `salary tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let settings = Settings::from_env()?;

    match cli.command {
        Command::Tui(args) => handle_tui(settings, &args),
        Command::Predict(args) => handle_predict(settings, &args),
        Command::Options(args) => handle_options(settings, &args),
        Command::Stats(args) => handle_stats(settings, &args),
    }
}

fn session_for(mut settings: Settings, source: &SourceArgs, target: LogTarget<'_>) -> Result<Session, AppError> {
    source.apply(&mut settings);
    crate::logging::init(&settings.log_filter, target)?;
    Ok(Session::connect(settings))
}

fn handle_tui(settings: Settings, args: &SourceArgs) -> Result<(), AppError> {
    let log_file = settings.log_file.clone();
    let session = session_for(settings, args, LogTarget::File(&log_file))?;
    crate::tui::run(session)
}

fn handle_predict(settings: Settings, args: &PredictArgs) -> Result<(), AppError> {
    let session = session_for(settings, &args.source, LogTarget::Stderr)?;

    let table = session.dataset()?;
    let profile = profile_from_args(args, &table, crate::cli::picker::prompt_for_option)?;
    let model = session.model()?;

    let outcome = pipeline::run_prediction(&profile, model.predictor.as_ref(), &table)?;

    println!("{}", crate::report::format_outcome(&outcome));
    if args.chart {
        let chart = crate::plot::render_band_chart(&SALARY_BANDS, matching_band(&outcome.bracket), args.width);
        println!("{chart}");
    }
    Ok(())
}

fn handle_options(settings: Settings, args: &SourceArgs) -> Result<(), AppError> {
    let session = session_for(settings, args, LogTarget::Stderr)?;
    let table = session.dataset()?;
    print!("{}", crate::report::format_options(&table));
    Ok(())
}

fn handle_stats(settings: Settings, args: &StatsArgs) -> Result<(), AppError> {
    let session = session_for(settings, &args.source, LogTarget::Stderr)?;
    let table = session.dataset()?;
    let version = if args.offline {
        None
    } else {
        Some(session.model()?.version)
    };
    let summary = crate::report::DatasetSummary::of(&table);
    print!("{}", crate::report::format_summary(&summary, version));
    Ok(())
}

/// Build and validate a profile from flags, asking `pick` for missing fields.
pub fn profile_from_args(
    args: &PredictArgs,
    table: &ReferenceTable,
    mut pick: impl FnMut(Field, &[String]) -> Result<String, AppError>,
) -> Result<Profile, AppError> {
    let (min_age, max_age) = table.age_bounds();
    let age = match args.idade {
        Some(age) if !(min_age..=max_age).contains(&age) => {
            return Err(AppError::new(
                3,
                format!("Idade {age} fora do intervalo {min_age}..{max_age}."),
            ));
        }
        Some(age) => age,
        None => DEFAULT_AGE.clamp(min_age, max_age),
    };

    let mut value = |field: Field, flag: &Option<String>| -> Result<String, AppError> {
        match flag {
            Some(v) => Ok(v.trim().to_string()),
            None => pick(field, &table.distinct(field)),
        }
    };

    let profile = Profile {
        age,
        gender: value(Field::Gender, &args.genero)?,
        disability: value(Field::Disability, &args.pcd)?,
        state: value(Field::State, &args.uf)?,
        job_title: value(Field::JobTitle, &args.cargo)?,
        seniority: value(Field::Seniority, &args.nivel)?,
        experience_data: value(Field::ExperienceData, &args.tempo_dados)?,
        experience_it: value(Field::ExperienceIt, &args.tempo_ti)?,
    };

    let unknown = pipeline::unknown_values(&profile, table);
    if !unknown.is_empty() {
        let details: Vec<String> = unknown
            .iter()
            .map(|&f| format!("{} = '{}'", f.column(), profile.text(f).unwrap_or_default()))
            .collect();
        return Err(AppError::new(
            3,
            format!(
                "Valor(es) ausente(s) da base de referência: {}. Veja `salary options`.",
                details.join(", ")
            ),
        ));
    }

    Ok(profile)
}

/// Rewrite argv so `salary` defaults to `salary tui`.
///
/// Rules:
/// - `salary`                      -> `salary tui`
/// - `salary -d data.csv ...`      -> `salary tui -d data.csv ...`
/// - `salary --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "predict" | "options" | "stats");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}
