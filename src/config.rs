//! Runtime settings resolved from the environment (`.env` is honored).
//!
//! | variable                | default                 |
//! |-------------------------|-------------------------|
//! | `MLFLOW_TRACKING_URI`   | `http://127.0.0.1:5000` |
//! | `SALARY_MODEL_NAME`     | `salario-model`         |
//! | `SALARY_SCORING_URI`    | `http://127.0.0.1:5001` |
//! | `SALARY_DATA_PATH`      | `data/template.csv`     |
//! | `SALARY_MODEL_TTL_SECS` | `86400`                 |
//! | `SALARY_DATA_TTL_SECS`  | `3600`                  |
//! | `SALARY_LOG`            | `info`                  |
//! | `SALARY_LOG_FILE`       | `salary.log`            |

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_TRACKING_URI: &str = "http://127.0.0.1:5000";
pub const DEFAULT_SCORING_URI: &str = "http://127.0.0.1:5001";
pub const DEFAULT_MODEL_NAME: &str = "salario-model";
pub const DEFAULT_DATA_PATH: &str = "data/template.csv";
const DEFAULT_MODEL_TTL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_DATA_TTL_SECS: u64 = 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub tracking_uri: String,
    pub scoring_uri: String,
    pub model_name: String,
    pub data_path: PathBuf,
    pub model_ttl: Duration,
    pub data_ttl: Duration,
    pub log_filter: String,
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tracking_uri: DEFAULT_TRACKING_URI.to_string(),
            scoring_uri: DEFAULT_SCORING_URI.to_string(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            model_ttl: Duration::from_secs(DEFAULT_MODEL_TTL_SECS),
            data_ttl: Duration::from_secs(DEFAULT_DATA_TTL_SECS),
            log_filter: "info".to_string(),
            log_file: PathBuf::from("salary.log"),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let settings = Self {
            tracking_uri: get("MLFLOW_TRACKING_URI").unwrap_or(defaults.tracking_uri),
            scoring_uri: get("SALARY_SCORING_URI").unwrap_or(defaults.scoring_uri),
            model_name: get("SALARY_MODEL_NAME").unwrap_or(defaults.model_name),
            data_path: get("SALARY_DATA_PATH").map(PathBuf::from).unwrap_or(defaults.data_path),
            model_ttl: parse_secs("SALARY_MODEL_TTL_SECS", get("SALARY_MODEL_TTL_SECS"))?
                .unwrap_or(defaults.model_ttl),
            data_ttl: parse_secs("SALARY_DATA_TTL_SECS", get("SALARY_DATA_TTL_SECS"))?
                .unwrap_or(defaults.data_ttl),
            log_filter: get("SALARY_LOG").unwrap_or(defaults.log_filter),
            log_file: get("SALARY_LOG_FILE").map(PathBuf::from).unwrap_or(defaults.log_file),
        };

        // The dataset must refresh more often than the model.
        if settings.data_ttl >= settings.model_ttl {
            return Err(AppError::new(
                2,
                format!(
                    "SALARY_DATA_TTL_SECS ({}) must be shorter than SALARY_MODEL_TTL_SECS ({}).",
                    settings.data_ttl.as_secs(),
                    settings.model_ttl.as_secs()
                ),
            ));
        }
        Ok(settings)
    }
}

fn parse_secs(key: &str, raw: Option<String>) -> Result<Option<Duration>, AppError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    raw.parse::<u64>()
        .map(|s| Some(Duration::from_secs(s)))
        .map_err(|_| AppError::new(2, format!("Invalid {key} '{raw}': expected whole seconds.")))
}
