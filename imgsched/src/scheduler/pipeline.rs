//! Pipeline model: a feed thread, a FIFO queue and W image workers.
//!
//! The calling thread walks the feed, loads each item and hands it to the
//! queue. Each image worker pulls an item, and for every effect fans out W
//! row sub-tasks onto a dedicated compute pool, joins them, swaps and moves
//! on. Several images are in flight at once; within one image effects are
//! strictly sequential.
//!
//! The queue is a rendezvous channel: a send completes only when a worker
//! takes the item, so at most W loaded images wait on workers at any time.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use rayon::ThreadPool;
use tracing::{debug, info, trace, warn};

use super::{finish_image, RunStats};
use crate::config::{ExecutionModel, SchedulerConfig};
use crate::effect::Effect;
use crate::error::SchedulerError;
use crate::feed::{TaskFeed, WorkItem, WorkItems};
use crate::partition::{partition_rows, RowRange};
use crate::raster::{ImageLoader, RowImage};

/// Runs the pipeline model with `config.worker_count()` image workers and a
/// compute pool of the same size.
///
/// Returns once the feed is exhausted and every worker has drained the queue.
/// The first fatal error stops the feed and the workers; a feed error takes
/// precedence over worker errors.
pub fn run_pipeline_with<L: ImageLoader>(
    config: &SchedulerConfig,
    loader: &L,
) -> Result<RunStats, SchedulerError> {
    config.validate()?;
    let workers = config.worker_count();
    let started = Instant::now();
    let layout = config.layout();
    let feed = TaskFeed::open(&config.effects_file(), config.feed_policy())?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("imgsched-compute-{}", i))
        .build()?;

    info!(
        model = %ExecutionModel::Pipeline,
        workers,
        dirs = ?config.data_dirs(),
        "Starting run"
    );

    let (queue_tx, queue_rx) = crossbeam_channel::bounded::<WorkItem<L::Image>>(0);
    let abort = AtomicBool::new(false);

    let (fed, outcomes) = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|id| {
                let queue = queue_rx.clone();
                let pool = &pool;
                let abort = &abort;
                scope.spawn(move || image_worker(id, queue, pool, workers, abort))
            })
            .collect();
        drop(queue_rx);

        let fed = feed_queue(WorkItems::new(feed, &layout, loader), &queue_tx, &abort);
        // Closing the queue lets idle workers exit.
        drop(queue_tx);

        let outcomes: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().map_err(SchedulerError::from_panic).and_then(|r| r))
            .collect();
        (fed, outcomes)
    });

    let fed = fed?;
    let mut stats = RunStats::new(ExecutionModel::Pipeline, workers);
    for outcome in outcomes {
        stats.absorb(&outcome?);
    }
    debug_assert_eq!(stats.items, fed);

    stats.elapsed = started.elapsed();
    info!(%stats, "Run complete");
    Ok(stats)
}

/// Pushes work items onto the queue until the feed ends, an item fails to
/// load or the workers abort. Returns the number of items handed over.
fn feed_queue<I, It>(items: It, queue: &Sender<WorkItem<I>>, abort: &AtomicBool) -> Result<usize, SchedulerError>
where
    It: Iterator<Item = Result<WorkItem<I>, SchedulerError>>,
{
    let mut items = items;
    let mut fed = 0;
    loop {
        // Checked before pulling: the next pull decodes an image.
        if abort.load(Ordering::Acquire) {
            debug!("Workers aborted, stopping feed");
            break;
        }
        let Some(item) = items.next() else {
            break;
        };
        let item = match item {
            Ok(item) => item,
            Err(e) => {
                abort.store(true, Ordering::Release);
                return Err(e);
            }
        };
        if queue.send(item).is_err() {
            // Every worker has exited.
            break;
        }
        fed += 1;
    }
    Ok(fed)
}

fn image_worker<I: RowImage>(
    id: usize,
    queue: Receiver<WorkItem<I>>,
    pool: &ThreadPool,
    workers: usize,
    abort: &AtomicBool,
) -> Result<RunStats, SchedulerError> {
    let mut tally = RunStats::default();
    for item in queue.iter() {
        if abort.load(Ordering::Acquire) {
            break;
        }
        if let Err(e) = process_item(item, pool, workers, &mut tally) {
            warn!(worker = id, error = %e, "Image worker failed");
            abort.store(true, Ordering::Release);
            return Err(e);
        }
    }
    debug!(worker = id, items = tally.items, "Image worker exiting");
    Ok(tally)
}

fn process_item<I: RowImage>(
    mut item: WorkItem<I>,
    pool: &ThreadPool,
    workers: usize,
    tally: &mut RunStats,
) -> Result<(), SchedulerError> {
    for &effect in item.effects.iter() {
        let ranges = partition_rows(item.image.bounds(), workers);
        let completed = fan_out(pool, &item.image, effect, &ranges);
        debug_assert_eq!(completed, workers);
        trace!(effect = %effect, subtasks = completed, "Effect joined");

        item.image.swap();
        tally.subtasks += completed;
        tally.effects_applied += 1;
        tally.swaps += 1;
    }

    finish_image(&mut item.image, &item.output)?;
    tally.swaps += 1;
    tally.items += 1;
    debug!(output = %item.output.display(), effects = item.effects.len(), "Saved image");
    Ok(())
}

/// Runs one sub-task per row range on `pool` and waits for all of them.
/// Returns the number of sub-tasks that completed.
fn fan_out<I: RowImage>(pool: &ThreadPool, image: &I, effect: Effect, ranges: &[RowRange]) -> usize {
    let completed = AtomicUsize::new(0);
    pool.scope(|s| {
        for &range in ranges {
            let completed = &completed;
            s.spawn(move |_| {
                image.apply_effect(effect, range);
                completed.fetch_add(1, Ordering::AcqRel);
            });
        }
    });
    completed.into_inner()
}
