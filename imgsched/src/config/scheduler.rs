//! Run configuration for the schedulers.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::feed::{DataLayout, FeedPolicy};

/// Default root directory holding `effects.txt`, `in/` and `out/`.
pub const DEFAULT_DATA_ROOT: &str = "../data";

/// Name of the task feed file inside the data root.
pub const EFFECTS_FILE_NAME: &str = "effects.txt";

/// Errors raised while building or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Worker count was zero.
    #[error("worker count must be at least 1")]
    NoWorkers,

    /// No data directory was given.
    #[error("at least one data directory is required")]
    NoDataDirs,

    /// Execution model name not recognized.
    #[error("unknown execution model {0:?} (expected s, pipeline or bsp)")]
    UnknownModel(String),

    /// A config file value could not be parsed.
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Read(#[from] ini::Error),

    /// The config file is not valid INI.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] ini::ParseError),
}

/// Which scheduler drives the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionModel {
    /// Single-threaded baseline.
    #[default]
    Sequential,
    /// Worker pool over a FIFO queue, per-effect fan-out/join.
    Pipeline,
    /// Lock-stepped workers with one global barrier per effect application.
    Bsp,
}

impl ExecutionModel {
    /// Canonical short name (`s`, `pipeline`, `bsp`).
    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionModel::Sequential => "s",
            ExecutionModel::Pipeline => "pipeline",
            ExecutionModel::Bsp => "bsp",
        }
    }
}

impl fmt::Display for ExecutionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutionModel::Sequential => "sequential",
            ExecutionModel::Pipeline => "pipeline",
            ExecutionModel::Bsp => "bsp",
        };
        f.write_str(name)
    }
}

impl FromStr for ExecutionModel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s" | "seq" | "sequential" => Ok(ExecutionModel::Sequential),
            "p" | "pipeline" => Ok(ExecutionModel::Pipeline),
            "bsp" => Ok(ExecutionModel::Bsp),
            _ => Err(ConfigError::UnknownModel(s.to_string())),
        }
    }
}

/// Splits a `+`-separated data directory list (`"small+big"`).
pub fn parse_data_dirs(list: &str) -> Vec<String> {
    list.split('+')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Number of hardware threads, or 1 if it cannot be determined.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Everything a scheduler run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    model: ExecutionModel,
    worker_count: usize,
    data_dirs: Vec<String>,
    data_root: PathBuf,
    effects_file: Option<PathBuf>,
    feed_policy: FeedPolicy,
}

impl SchedulerConfig {
    /// Creates a config with default worker count, data root and feed policy.
    pub fn new(model: ExecutionModel, data_dirs: Vec<String>) -> Self {
        Self {
            model,
            worker_count: default_worker_count(),
            data_dirs,
            data_root: PathBuf::from(DEFAULT_DATA_ROOT),
            effects_file: None,
            feed_policy: FeedPolicy::default(),
        }
    }

    /// Set the execution model.
    pub fn with_model(mut self, model: ExecutionModel) -> Self {
        self.model = model;
        self
    }

    /// Set the number of workers.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.worker_count = workers;
        self
    }

    /// Set the data root directory.
    pub fn with_data_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.data_root = root.into();
        self
    }

    /// Read tasks from `path` instead of `<data_root>/effects.txt`.
    pub fn with_effects_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.effects_file = Some(path.into());
        self
    }

    /// Set how malformed feed entries are handled.
    pub fn with_feed_policy(mut self, policy: FeedPolicy) -> Self {
        self.feed_policy = policy;
        self
    }

    pub fn model(&self) -> ExecutionModel {
        self.model
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn data_dirs(&self) -> &[String] {
        &self.data_dirs
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    pub fn feed_policy(&self) -> FeedPolicy {
        self.feed_policy
    }

    /// Path of the task feed file.
    pub fn effects_file(&self) -> PathBuf {
        self.effects_file
            .clone()
            .unwrap_or_else(|| self.data_root.join(EFFECTS_FILE_NAME))
    }

    /// Input/output layout derived from the data root and directories.
    pub fn layout(&self) -> DataLayout {
        DataLayout::new(self.data_root.clone(), self.data_dirs.clone())
    }

    /// Checks the invariants every scheduler relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.data_dirs.is_empty() {
            return Err(ConfigError::NoDataDirs);
        }
        Ok(())
    }
}
