//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;

use clap::ValueEnum;
use imgsched::config::{parse_data_dirs, ConfigFile};
use imgsched::{ExecutionModel, FeedPolicy, SchedulerConfig};

use crate::error::CliError;

/// Execution model selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ModeArg {
    /// Sequential baseline (one thread)
    #[value(name = "s", alias = "sequential")]
    Sequential,
    /// Image queue served by a worker pool, effects split into row sub-tasks
    #[value(name = "pipeline", alias = "p")]
    Pipeline,
    /// Lock-stepped workers with a barrier per effect
    Bsp,
}

impl From<ModeArg> for ExecutionModel {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Sequential => ExecutionModel::Sequential,
            ModeArg::Pipeline => ExecutionModel::Pipeline,
            ModeArg::Bsp => ExecutionModel::Bsp,
        }
    }
}

/// Flags that override config file values.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub mode: Option<ModeArg>,
    pub threads: Option<usize>,
    pub data_root: Option<PathBuf>,
    pub strict_feed: bool,
}

/// Builds the run configuration: CLI flags, then config file, then defaults.
pub fn resolve_config(
    data_dirs: &str,
    overrides: &Overrides,
    file: &ConfigFile,
) -> Result<SchedulerConfig, CliError> {
    let mut config = file.apply_to(SchedulerConfig::new(
        ExecutionModel::default(),
        parse_data_dirs(data_dirs),
    ));

    if let Some(mode) = overrides.mode {
        config = config.with_model(mode.into());
    }
    if let Some(threads) = overrides.threads {
        config = config.with_workers(threads);
    }
    if let Some(ref root) = overrides.data_root {
        config = config.with_data_root(root.clone());
    }
    if overrides.strict_feed {
        config = config.with_feed_policy(FeedPolicy::Strict);
    }

    config.validate()?;
    Ok(config)
}
