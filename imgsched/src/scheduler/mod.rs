//! The three execution models.
//!
//! All models consume the same work items, partition rows with the same rule
//! and follow the same buffer discipline (swap after every effect, one more
//! swap before persisting), so their output is byte-identical.
//!
//! # Models
//!
//! ```text
//! Sequential   item ─► effect ─► effect ─► save ─► item ─► ...        (1 thread)
//!
//! Pipeline     feed ─► [queue] ─► worker 0: item A ─► fan-out W ─► join ─► swap ...
//!                               └► worker 1: item B ─► fan-out W ─► join ─► swap ...
//!
//! BSP          worker 0..W: rows(i) of items[t].effects[e] ─► barrier ─► next superstep
//!                           (last arriver swaps / advances / saves, then wakes the rest)
//! ```
//!
//! Every entry point blocks until the run finishes and returns [`RunStats`] or
//! the first fatal [`SchedulerError`].

mod bsp;
mod pipeline;
mod sequential;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::config::{ExecutionModel, SchedulerConfig};
use crate::error::SchedulerError;
use crate::raster::{ImageLoader, PngLoader, RowImage};

pub use bsp::run_bsp_with;
pub use pipeline::run_pipeline_with;
pub use sequential::run_sequential_with;

/// Counters describing a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Model that produced these stats.
    pub model: ExecutionModel,
    /// Worker threads used (1 for sequential).
    pub workers: usize,
    /// Work items persisted.
    pub items: usize,
    /// Effect applications completed (one per effect per item).
    pub effects_applied: usize,
    /// Buffer swaps performed, terminal swaps included.
    pub swaps: usize,
    /// Row-partition applications (pipeline sub-tasks, BSP worker arrivals).
    pub subtasks: usize,
    /// BSP barrier releases (supersteps).
    pub barrier_releases: usize,
    /// Wall-clock duration of the run, feed included.
    pub elapsed: Duration,
}

impl RunStats {
    pub(crate) fn new(model: ExecutionModel, workers: usize) -> Self {
        Self {
            model,
            workers,
            ..Self::default()
        }
    }

    /// Adds another tally's counters into this one.
    pub(crate) fn absorb(&mut self, other: &RunStats) {
        self.items += other.items;
        self.effects_applied += other.effects_applied;
        self.swaps += other.swaps;
        self.subtasks += other.subtasks;
        self.barrier_releases += other.barrier_releases;
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} items, {} effects, {} swaps, {} subtasks, {} barriers, {} workers in {:.3}s",
            self.model,
            self.items,
            self.effects_applied,
            self.swaps,
            self.subtasks,
            self.barrier_releases,
            self.workers,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Terminal swap then persist: leaves the final result in the staging buffer
/// and writes it out.
pub(crate) fn finish_image<I: RowImage>(image: &mut I, output: &Path) -> Result<(), SchedulerError> {
    image.swap();
    image.save(output).map_err(|source| SchedulerError::Persist {
        path: output.to_path_buf(),
        source,
    })
}

/// Runs the model selected by `config` over PNG images.
pub fn run(config: &SchedulerConfig) -> Result<RunStats, SchedulerError> {
    run_with(config, &PngLoader)
}

/// Runs the model selected by `config` with a custom image loader.
pub fn run_with<L: ImageLoader>(
    config: &SchedulerConfig,
    loader: &L,
) -> Result<RunStats, SchedulerError> {
    match config.model() {
        ExecutionModel::Sequential => run_sequential_with(config, loader),
        ExecutionModel::Pipeline => run_pipeline_with(config, loader),
        ExecutionModel::Bsp => run_bsp_with(config, loader),
    }
}

/// Sequential model over PNG images.
pub fn run_sequential(config: &SchedulerConfig) -> Result<RunStats, SchedulerError> {
    run_sequential_with(config, &PngLoader)
}

/// Pipeline model over PNG images.
pub fn run_pipeline(config: &SchedulerConfig) -> Result<RunStats, SchedulerError> {
    run_pipeline_with(config, &PngLoader)
}

/// BSP model over PNG images.
pub fn run_bsp(config: &SchedulerConfig) -> Result<RunStats, SchedulerError> {
    run_bsp_with(config, &PngLoader)
}
