//! Application-boundary error.
//!
//! Component modules return their own typed errors; everything is folded into
//! `AppError` before it reaches `main`, which maps it to a process exit code.
//!
//! Exit codes:
//! - `2`: usage, configuration, or reference dataset problems
//! - `3`: the submitted profile is invalid for the reference dataset
//! - `4`: model registry / scoring / terminal failures

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<crate::registry::RegistryError> for AppError {
    fn from(err: crate::registry::RegistryError) -> Self {
        AppError::new(4, format!("Erro ao carregar modelo: {err}"))
    }
}

impl From<crate::app::pipeline::PredictionError> for AppError {
    fn from(err: crate::app::pipeline::PredictionError) -> Self {
        AppError::new(4, format!("Erro na predição: {err}"))
    }
}
