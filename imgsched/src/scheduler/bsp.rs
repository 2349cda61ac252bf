//! Bulk-synchronous model: W lock-stepped workers and one global barrier.
//!
//! All work items are loaded before any worker starts. Each superstep applies
//! one effect of one item: every worker transforms its own row range, then
//! arrives at the barrier. The last worker to arrive performs the release
//! under the barrier lock:
//!
//! 1. swap the item's buffers and advance to the next effect
//! 2. once the item has no effects left, terminal swap, save and drop it,
//!    then advance to the next item
//! 3. bump the barrier generation and wake everyone
//!
//! An item with no effects still costs one (empty) superstep so that it is
//! swapped and saved by the same release path.
//!
//! # Locking
//!
//! Workers hold an item's read lock only while applying their rows, and only
//! the releasing worker takes its write lock, after every other worker has
//! arrived. The barrier mutex is never held during an effect.

use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::Instant;

use parking_lot::{Condvar, Mutex, MutexGuard, RwLock};
use tracing::{debug, info, trace, warn};

use super::{finish_image, RunStats};
use crate::config::{ExecutionModel, SchedulerConfig};
use crate::error::SchedulerError;
use crate::feed::{collect_work_items, TaskFeed, WorkItem};
use crate::partition::row_range_for;
use crate::raster::{ImageLoader, RowImage};

/// Barrier state, guarded by [`BspContext::state`].
#[derive(Debug, Default)]
struct Superstep {
    task_index: usize,
    effect_index: usize,
    arrived: usize,
    generation: u64,
    failure: Option<SchedulerError>,
    stats: RunStats,
}

impl Superstep {
    fn is_finished(&self, items: usize) -> bool {
        self.failure.is_some() || self.task_index >= items
    }
}

struct BspContext<I> {
    items: Vec<RwLock<Option<WorkItem<I>>>>,
    workers: usize,
    state: Mutex<Superstep>,
    released: Condvar,
}

impl<I: RowImage> BspContext<I> {
    fn new(items: Vec<WorkItem<I>>, workers: usize) -> Self {
        Self {
            items: items.into_iter().map(|item| RwLock::new(Some(item))).collect(),
            workers,
            state: Mutex::new(Superstep::default()),
            released: Condvar::new(),
        }
    }

    fn run_worker(&self, id: usize) {
        let mut state = self.state.lock();
        loop {
            if state.is_finished(self.items.len()) {
                break;
            }
            let task = state.task_index;
            let effect_index = state.effect_index;
            let generation = state.generation;

            let applied = MutexGuard::unlocked(&mut state, || {
                panic::catch_unwind(AssertUnwindSafe(|| self.apply(id, task, effect_index)))
            });
            if let Err(payload) = applied {
                let err = SchedulerError::from_panic(payload);
                warn!(worker = id, error = %err, "BSP worker panicked");
                state.failure.get_or_insert(err);
                self.released.notify_all();
                break;
            }

            state.arrived += 1;
            state.stats.subtasks += 1;
            debug_assert!(state.arrived <= self.workers);

            if state.arrived == self.workers {
                let released = panic::catch_unwind(AssertUnwindSafe(|| self.release(&mut state)));
                if let Err(payload) = released {
                    state.failure.get_or_insert(SchedulerError::from_panic(payload));
                }
                self.released.notify_all();
            } else {
                while state.generation == generation && state.failure.is_none() {
                    self.released.wait(&mut state);
                }
            }
        }
        trace!(worker = id, "BSP worker exiting");
    }

    /// Applies the current effect of item `task` to this worker's rows.
    fn apply(&self, id: usize, task: usize, effect_index: usize) {
        let slot = self.items[task].read();
        if let Some(item) = slot.as_ref() {
            if let Some(&effect) = item.effects.get(effect_index) {
                let rows = row_range_for(id, item.image.bounds(), self.workers);
                item.image.apply_effect(effect, rows);
            }
        }
    }

    /// Closes the current superstep. Called by the last arriver only, with
    /// every other worker parked on the condvar.
    fn release(&self, state: &mut Superstep) {
        state.arrived = 0;
        state.generation += 1;
        state.stats.barrier_releases += 1;
        trace!(
            task = state.task_index,
            effect = state.effect_index,
            generation = state.generation,
            "Barrier released"
        );

        let mut slot = self.items[state.task_index].write();
        let item_done = match slot.as_mut() {
            Some(item) => {
                if state.effect_index < item.effects.len() {
                    item.image.swap();
                    state.effect_index += 1;
                    state.stats.swaps += 1;
                    state.stats.effects_applied += 1;
                }
                state.effect_index >= item.effects.len()
            }
            None => true,
        };
        if !item_done {
            return;
        }

        if let Some(mut item) = slot.take() {
            if let Err(e) = finish_image(&mut item.image, &item.output) {
                warn!(output = %item.output.display(), error = %e, "Failed to save image");
                state.failure = Some(e);
                return;
            }
            state.stats.swaps += 1;
            state.stats.items += 1;
            debug!(output = %item.output.display(), effects = item.effects.len(), "Saved image");
        }
        state.effect_index = 0;
        state.task_index += 1;
    }
}

/// Runs the BSP model with `config.worker_count()` workers.
///
/// The whole work list is materialized first, so a feed or load error fails
/// the run before anything is written.
pub fn run_bsp_with<L: ImageLoader>(
    config: &SchedulerConfig,
    loader: &L,
) -> Result<RunStats, SchedulerError> {
    config.validate()?;
    let workers = config.worker_count();
    let started = Instant::now();
    let feed = TaskFeed::open(&config.effects_file(), config.feed_policy())?;
    let items = collect_work_items(feed, &config.layout(), loader)?;

    info!(
        model = %ExecutionModel::Bsp,
        workers,
        items = items.len(),
        dirs = ?config.data_dirs(),
        "Starting run"
    );

    let context = BspContext::new(items, workers);
    let joined: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|id| {
                let context = &context;
                scope.spawn(move || context.run_worker(id))
            })
            .collect();
        handles.into_iter().map(|handle| handle.join()).collect()
    });

    let state = context.state.into_inner();
    if let Some(err) = state.failure {
        return Err(err);
    }
    for outcome in joined {
        outcome.map_err(SchedulerError::from_panic)?;
    }

    let mut stats = RunStats::new(ExecutionModel::Bsp, workers);
    stats.absorb(&state.stats);
    stats.elapsed = started.elapsed();
    info!(%stats, "Run complete");
    Ok(stats)
}
