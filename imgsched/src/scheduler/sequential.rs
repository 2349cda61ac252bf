//! Single-threaded baseline.

use std::time::Instant;

use tracing::{debug, info};

use super::{finish_image, RunStats};
use crate::config::{ExecutionModel, SchedulerConfig};
use crate::error::SchedulerError;
use crate::feed::{TaskFeed, WorkItem, WorkItems};
use crate::partition::RowRange;
use crate::raster::{ImageLoader, RowImage};

/// Processes every work item in feed order on the calling thread.
///
/// Each effect covers the full row range. Items are loaded lazily, so a load
/// failure leaves earlier outputs written and later ones untouched.
pub fn run_sequential_with<L: ImageLoader>(
    config: &SchedulerConfig,
    loader: &L,
) -> Result<RunStats, SchedulerError> {
    config.validate()?;
    let started = Instant::now();
    let layout = config.layout();
    let feed = TaskFeed::open(&config.effects_file(), config.feed_policy())?;

    info!(
        model = %ExecutionModel::Sequential,
        dirs = ?config.data_dirs(),
        "Starting run"
    );

    let mut stats = RunStats::new(ExecutionModel::Sequential, 1);
    for item in WorkItems::new(feed, &layout, loader) {
        process_item(item?, &mut stats)?;
    }

    stats.elapsed = started.elapsed();
    info!(%stats, "Run complete");
    Ok(stats)
}

fn process_item<I: RowImage>(mut item: WorkItem<I>, stats: &mut RunStats) -> Result<(), SchedulerError> {
    let (min_y, max_y) = item.image.bounds();
    let full = RowRange::new(min_y, max_y);
    for &effect in item.effects.iter() {
        item.image.apply_effect(effect, full);
        item.image.swap();
        stats.effects_applied += 1;
        stats.swaps += 1;
        stats.subtasks += 1;
    }

    finish_image(&mut item.image, &item.output)?;
    stats.swaps += 1;
    stats.items += 1;
    debug!(output = %item.output.display(), effects = item.effects.len(), "Saved image");
    Ok(())
}
