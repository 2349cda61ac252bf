//! imgsched - parallel batch image-effect processing
//!
//! Reads a stream of tasks (input image, output image, effect codes), applies
//! the 3×3 effects to every image in every configured data directory and
//! writes the results. Three interchangeable execution models produce
//! byte-identical output:
//!
//! - **Sequential**: one thread, one image at a time
//! - **Pipeline**: a queue of images served by W workers, each effect split
//!   into W row sub-tasks
//! - **BSP**: W lock-stepped workers, one global barrier per effect
//!
//! # Example
//!
//! ```no_run
//! use imgsched::{run, ExecutionModel, SchedulerConfig};
//!
//! let config = SchedulerConfig::new(ExecutionModel::Bsp, vec!["small".to_string()])
//!     .with_workers(4)
//!     .with_data_root("data");
//! let stats = run(&config)?;
//! println!("{}", stats);
//! # Ok::<(), imgsched::SchedulerError>(())
//! ```

pub mod config;
pub mod effect;
pub mod error;
pub mod feed;
pub mod logging;
pub mod partition;
pub mod raster;
pub mod scheduler;

pub use config::{ExecutionModel, SchedulerConfig};
pub use effect::Effect;
pub use error::SchedulerError;
pub use feed::FeedPolicy;
pub use partition::{partition_rows, RowRange};
pub use scheduler::{run, run_bsp, run_pipeline, run_sequential, run_with, RunStats};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
