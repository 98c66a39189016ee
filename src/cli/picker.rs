//! Interactive option picker.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "choose from the valid values" UX for fields
//!   that were not given on the command line

use std::io::{self, BufRead, Write};

use crate::domain::Field;
use crate::error::AppError;

/// Prompt the user to pick one of `options` for `field` on stdin/stdout.
pub fn prompt_for_option(field: Field, options: &[String]) -> Result<String, AppError> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    pick_option(field, options, &mut input, &mut output)
}

/// Behavior:
/// - list the options
/// - accept either a number (from the list) or an exact value
/// - `q` cancels
pub fn pick_option<R: BufRead, W: Write>(
    field: Field,
    options: &[String],
    input: &mut R,
    output: &mut W,
) -> Result<String, AppError> {
    if options.is_empty() {
        return Err(AppError::new(
            2,
            format!("No options available for {} ({}).", field.label(), field.column()),
        ));
    }

    let write_err = |e: io::Error| AppError::new(2, format!("Failed to write prompt: {e}"));

    writeln!(output, "{}: {}", field.label(), field.help()).map_err(write_err)?;
    for (idx, option) in options.iter().enumerate() {
        writeln!(output, "{:>3}) {option}", idx + 1).map_err(write_err)?;
    }

    loop {
        write!(output, "Escolha (1-{}) ou digite o valor (q para sair): ", options.len()).map_err(write_err)?;
        output.flush().map_err(write_err)?;

        let mut line = String::new();
        let bytes = input
            .read_line(&mut line)
            .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;

        if bytes == 0 {
            return Err(AppError::new(
                2,
                format!("No input received for {}. Pass it as a flag.", field.column()),
            ));
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Err(AppError::new(2, "Canceled."));
        }

        if let Ok(choice) = line.parse::<usize>() {
            if (1..=options.len()).contains(&choice) {
                return Ok(options[choice - 1].clone());
            }
            writeln!(output, "Opção inválida: {choice}.").map_err(write_err)?;
            continue;
        }

        if let Some(found) = options.iter().find(|o| o.as_str() == line) {
            return Ok(found.clone());
        }
        writeln!(output, "Valor desconhecido: '{line}'.").map_err(write_err)?;
    }
}
