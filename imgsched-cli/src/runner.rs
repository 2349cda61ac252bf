//! Shared command setup: logging and config file loading.

use std::path::PathBuf;

use imgsched::config::ConfigFile;
use imgsched::logging::{init_logging, LogGuard};
use tracing::{debug, info};

use crate::error::CliError;

/// Options every command accepts.
#[derive(Debug, Clone, Default)]
pub struct RunnerOptions {
    pub config: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub verbose: bool,
}

/// Per-invocation context: installs logging and loads the config file.
pub struct CliRunner {
    config_file: ConfigFile,
    _log_guard: LogGuard,
}

impl CliRunner {
    pub fn new(options: &RunnerOptions) -> Result<Self, CliError> {
        let log_guard = init_logging(options.verbose, options.log_file.as_deref())?;

        let config_file = match options.config {
            Some(ref path) => ConfigFile::load_from(path)?,
            None => ConfigFile::load()?,
        };
        debug!(config = ?config_file, "Loaded config file");

        Ok(Self {
            config_file,
            _log_guard: log_guard,
        })
    }

    /// Values read from the config file (all optional).
    pub fn config_file(&self) -> &ConfigFile {
        &self.config_file
    }

    pub fn log_startup(&self, command: &str) {
        info!(version = imgsched::VERSION, command, "imgsched starting");
    }
}
