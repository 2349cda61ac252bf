//! INI configuration file.
//!
//! ```ini
//! [scheduler]
//! threads = 8
//! mode = bsp
//! data_root = /srv/images
//! effects_file = /srv/images/effects.txt
//! strict_feed = true
//! ```
//!
//! Every key is optional. A missing file at the default location is not an
//! error; an unreadable or malformed one is.

use std::path::{Path, PathBuf};

use ini::Ini;
use tracing::debug;

use super::{ConfigError, ExecutionModel, SchedulerConfig};
use crate::feed::FeedPolicy;

const SECTION: &str = "scheduler";

/// Default location of the config file (`<config_dir>/imgsched/config.ini`).
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("imgsched").join("config.ini"))
}

/// Values read from the `[scheduler]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub threads: Option<usize>,
    pub mode: Option<ExecutionModel>,
    pub data_root: Option<PathBuf>,
    pub effects_file: Option<PathBuf>,
    pub strict_feed: Option<bool>,
}

impl ConfigFile {
    /// Loads the file at the default location, or defaults if it is absent.
    pub fn load() -> Result<Self, ConfigError> {
        match config_file_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Loads the file at `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Loading config file");
        let ini = Ini::load_from_file(path)?;
        Self::from_ini(&ini)
    }

    /// Parses INI text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(content)?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let Some(section) = ini.section(Some(SECTION)) else {
            return Ok(Self::default());
        };

        let threads = section
            .get("threads")
            .map(parse_threads)
            .transpose()?;
        let mode = section
            .get("mode")
            .map(str::parse::<ExecutionModel>)
            .transpose()?;
        let strict_feed = section
            .get("strict_feed")
            .map(|v| parse_bool("strict_feed", v))
            .transpose()?;

        Ok(Self {
            threads,
            mode,
            data_root: section.get("data_root").map(PathBuf::from),
            effects_file: section.get("effects_file").map(PathBuf::from),
            strict_feed,
        })
    }

    /// Overlays the values present in this file onto `config`.
    pub fn apply_to(&self, mut config: SchedulerConfig) -> SchedulerConfig {
        if let Some(threads) = self.threads {
            config = config.with_workers(threads);
        }
        if let Some(mode) = self.mode {
            config = config.with_model(mode);
        }
        if let Some(ref root) = self.data_root {
            config = config.with_data_root(root.clone());
        }
        if let Some(ref file) = self.effects_file {
            config = config.with_effects_file(file.clone());
        }
        if let Some(strict) = self.strict_feed {
            config = config.with_feed_policy(if strict {
                FeedPolicy::Strict
            } else {
                FeedPolicy::Lenient
            });
        }
        config
    }
}

fn parse_threads(value: &str) -> Result<usize, ConfigError> {
    let threads: usize = value
        .trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
            key: "threads".to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })?;
    if threads == 0 {
        return Err(ConfigError::NoWorkers);
    }
    Ok(threads)
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
