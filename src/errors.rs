use std::result::Result as StdResult;

use attend_config::ConfigError;
use attend_core::CoreError;
use thiserror::Error;

/// Unified error type for tracker, storage and configuration failures.
#[derive(Error, Debug)]
pub enum AttendanceError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("No student selected. Use `student <id>` or set ATTENDANCE_STUDENT.")]
    NoStudent,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AttendanceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AttendanceError::Core(err) if err.is_not_found())
    }
}

pub type AttendanceResult<T> = StdResult<T, AttendanceError>;

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] AttendanceError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::from(AttendanceError::from(err))
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::from(AttendanceError::from(err))
    }
}
