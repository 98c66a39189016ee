//! `tracing` subscriber setup.
//!
//! The TUI owns the terminal while it runs, so in that mode events are
//! appended to a log file. The one-shot CLI subcommands log to stderr.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
}

pub fn init(filter: &str, target: LogTarget<'_>) -> Result<(), AppError> {
    let filter = EnvFilter::try_new(filter)
        .map_err(|e| AppError::new(2, format!("Invalid SALARY_LOG filter '{filter}': {e}")))?;

    // A subscriber may already be installed (e.g. by a test harness).
    if tracing::dispatcher::has_been_set() {
        tracing::debug!("global subscriber already installed; keeping it");
        return Ok(());
    }

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let result = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| AppError::new(2, format!("Failed to open log file '{}': {e}", path.display())))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
    };

    result.map_err(|e| AppError::new(2, format!("Failed to install logger: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_filter_is_a_config_error() {
        let err = init("salary=[", LogTarget::Stderr).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn second_init_keeps_first_subscriber() {
        init("info", LogTarget::Stderr).unwrap();
        init("debug", LogTarget::Stderr).unwrap();
        assert!(tracing::dispatcher::has_been_set());
    }
}
