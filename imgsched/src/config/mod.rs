//! Scheduler configuration.
//!
//! [`SchedulerConfig`] is what the run entry points consume. [`ConfigFile`]
//! holds the optional INI overrides; callers layer CLI flags on top:
//!
//! ```text
//! CLI flag  >  config.ini [scheduler]  >  built-in default
//! ```

mod file;
mod scheduler;

pub use file::{config_file_path, ConfigFile};
pub use scheduler::{
    default_worker_count, parse_data_dirs, ConfigError, ExecutionModel, SchedulerConfig,
    DEFAULT_DATA_ROOT, EFFECTS_FILE_NAME,
};
