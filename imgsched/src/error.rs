//! Error types for scheduler runs.
//!
//! Every variant is fatal: a run never skips an item or retries, it stops and
//! hands the first error back to the caller once all worker threads are joined.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::raster::ImageError;

/// Errors that abort a scheduler run.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The task feed could not be opened or read.
    #[error("Failed to open task feed {}: {source}", path.display())]
    FeedOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A feed entry could not be parsed (strict feed policy only).
    #[error("Malformed task feed entry: {0}")]
    Feed(#[from] serde_json::Error),

    /// A source image is missing or corrupt.
    #[error("Failed to load image {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    /// A task requested an effect code outside the supported set.
    #[error("Unknown effect code: {0:?}")]
    UnknownEffect(String),

    /// A result image could not be written.
    #[error("Failed to save image {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    /// The scheduler configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The compute pool for pipeline sub-tasks could not be created.
    #[error("Failed to build compute pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A worker thread panicked.
    #[error("Worker thread panicked: {0}")]
    WorkerPanicked(String),
}

impl SchedulerError {
    /// Builds a [`SchedulerError::WorkerPanicked`] from a join payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        SchedulerError::WorkerPanicked(message)
    }

    /// Short, stable label for the error kind (used in structured logs).
    pub fn kind(&self) -> &'static str {
        match self {
            SchedulerError::FeedOpen { .. } | SchedulerError::Feed(_) => "feed",
            SchedulerError::Load { .. } => "load",
            SchedulerError::UnknownEffect(_) => "unknown_effect",
            SchedulerError::Persist { .. } => "persist",
            SchedulerError::Config(_) => "config",
            SchedulerError::ThreadPool(_) => "thread_pool",
            SchedulerError::WorkerPanicked(_) => "worker_panicked",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_display_includes_path() {
        let err = SchedulerError::Load {
            path: PathBuf::from("/data/in/small/a.png"),
            source: ImageError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no such file",
            )),
        };
        let msg = err.to_string();
        assert!(msg.contains("/data/in/small/a.png"));
        assert!(msg.contains("no such file"));
        assert_eq!(err.kind(), "load");
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;

        let err = SchedulerError::Persist {
            path: PathBuf::from("out.png"),
            source: ImageError::Io(std::io::Error::other("disk full")),
        };
        assert!(err.source().is_some());
    }

    #[test]
    fn test_from_panic_payloads() {
        let err = SchedulerError::from_panic(Box::new("boom"));
        assert_eq!(err.to_string(), "Worker thread panicked: boom");

        let err = SchedulerError::from_panic(Box::new(String::from("owned boom")));
        assert_eq!(err.to_string(), "Worker thread panicked: owned boom");

        let err = SchedulerError::from_panic(Box::new(42u32));
        assert_eq!(err.kind(), "worker_panicked");
    }

    #[test]
    fn test_config_error_conversion() {
        let err: SchedulerError = ConfigError::NoWorkers.into();
        assert!(matches!(err, SchedulerError::Config(ConfigError::NoWorkers)));
        assert_eq!(err.kind(), "config");
    }
}
