//! Command-line parsing for the salary predictor.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the registry/pipeline code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Settings;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "salary", version, about = "Preditor de Salário - Área de Dados (MLflow)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive form (default).
    Tui(SourceArgs),
    /// Predict the salary bracket for one profile and print the report.
    ///
    /// Categorical fields left out are asked for interactively.
    Predict(PredictArgs),
    /// List the valid options of every form field.
    Options(SourceArgs),
    /// Print dataset statistics (and the model version when reachable).
    Stats(StatsArgs),
}

/// Where the model and the reference dataset come from.
///
/// Every flag overrides the matching environment variable.
#[derive(Debug, Args, Clone, Default)]
pub struct SourceArgs {
    /// Reference dataset CSV (env: SALARY_DATA_PATH).
    #[arg(short = 'd', long, value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// MLflow tracking server (env: MLFLOW_TRACKING_URI).
    #[arg(long, value_name = "URL")]
    pub tracking_uri: Option<String>,

    /// Model server exposing /invocations (env: SALARY_SCORING_URI).
    #[arg(long, value_name = "URL")]
    pub scoring_uri: Option<String>,

    /// Registered model name (env: SALARY_MODEL_NAME).
    #[arg(long, value_name = "NAME")]
    pub model_name: Option<String>,
}

impl SourceArgs {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(path) = &self.data {
            settings.data_path = path.clone();
        }
        if let Some(uri) = &self.tracking_uri {
            settings.tracking_uri = uri.clone();
        }
        if let Some(uri) = &self.scoring_uri {
            settings.scoring_uri = uri.clone();
        }
        if let Some(name) = &self.model_name {
            settings.model_name = name.clone();
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Idade (padrão: 30, limitada à faixa da base de referência).
    #[arg(long)]
    pub idade: Option<i64>,

    /// Gênero.
    #[arg(long)]
    pub genero: Option<String>,

    /// Pessoa com deficiência (PcD).
    #[arg(long)]
    pub pcd: Option<String>,

    /// Estado (UF) onde mora.
    #[arg(long)]
    pub uf: Option<String>,

    /// Cargo atual.
    #[arg(long)]
    pub cargo: Option<String>,

    /// Nível de senioridade.
    #[arg(long)]
    pub nivel: Option<String>,

    /// Tempo de experiência em dados.
    #[arg(long)]
    pub tempo_dados: Option<String>,

    /// Tempo de experiência em TI.
    #[arg(long)]
    pub tempo_ti: Option<String>,

    /// Append an ASCII chart of the reference salary bands.
    #[arg(long)]
    pub chart: bool,

    /// Chart width (columns).
    #[arg(long, default_value_t = 40)]
    pub width: usize,
}

#[derive(Debug, Args, Clone)]
pub struct StatsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Skip the registry lookup (dataset statistics only).
    #[arg(long)]
    pub offline: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_flags_parse() {
        let cli = Cli::parse_from([
            "salary", "predict", "--idade", "41", "--uf", "SP", "--cargo", "Data Engineer", "--chart",
            "-d", "x.csv",
        ]);
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.idade, Some(41));
        assert_eq!(args.uf.as_deref(), Some("SP"));
        assert_eq!(args.cargo.as_deref(), Some("Data Engineer"));
        assert!(args.chart);
        assert_eq!(args.source.data, Some(PathBuf::from("x.csv")));
        assert!(args.genero.is_none());
    }

    #[test]
    fn source_flags_override_settings() {
        let mut settings = Settings::default();
        let args = SourceArgs {
            tracking_uri: Some("http://mlflow:5000".to_string()),
            ..SourceArgs::default()
        };
        args.apply(&mut settings);
        assert_eq!(settings.tracking_uri, "http://mlflow:5000");
        assert_eq!(settings.model_name, crate::config::DEFAULT_MODEL_NAME);
    }
}
