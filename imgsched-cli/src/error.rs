//! CLI error types.

use imgsched::config::ConfigError;
use imgsched::logging::LoggingError;
use imgsched::SchedulerError;
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging setup failed: {0}")]
    Logging(#[from] LoggingError),

    #[error("{0} input file(s) missing")]
    MissingInputs(usize),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 2,
            CliError::Scheduler(SchedulerError::Config(_)) => 2,
            _ => 1,
        }
    }
}
