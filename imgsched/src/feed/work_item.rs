//! Expansion of task descriptors into loaded work items.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use super::{TaskDescriptor, TaskFeed};
use crate::effect::Effect;
use crate::error::SchedulerError;
use crate::raster::ImageLoader;

/// One loaded image bound to an output path and an effect sequence.
#[derive(Debug)]
pub struct WorkItem<I> {
    pub image: I,
    pub output: PathBuf,
    pub effects: Arc<[Effect]>,
}

/// Where input images live and where results go.
///
/// ```text
/// <root>/in/<dir>/<input>      source image
/// <root>/out/<dir>_<output>    result image
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
    dirs: Vec<String>,
}

impl DataLayout {
    /// Creates a layout over `root` and the data directories, in order.
    pub fn new(root: impl Into<PathBuf>, dirs: Vec<String>) -> Self {
        Self {
            root: root.into(),
            dirs,
        }
    }

    /// Root directory holding `in/` and `out/`.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Configured data directories, in expansion order.
    pub fn dirs(&self) -> &[String] {
        &self.dirs
    }

    /// Path of the source image `name` inside data directory `dir`.
    pub fn input_path(&self, dir: &str, name: &str) -> PathBuf {
        self.root.join("in").join(dir).join(name)
    }

    /// Path of the result image `name` produced from data directory `dir`.
    pub fn output_path(&self, dir: &str, name: &str) -> PathBuf {
        self.root.join("out").join(format!("{}_{}", dir, name))
    }
}

/// Lazy iterator of [`WorkItem`]s: every descriptor of the feed expanded
/// against every data directory, loading each image as it is reached.
///
/// The first error (feed, unknown effect or load) is yielded once and ends
/// the iteration.
pub struct WorkItems<'a, L: ImageLoader, R: Read> {
    feed: TaskFeed<R>,
    layout: &'a DataLayout,
    loader: &'a L,
    pending: Option<(TaskDescriptor, usize)>,
    failed: bool,
}

impl<'a, L: ImageLoader, R: Read> WorkItems<'a, L, R> {
    /// Creates the expansion over `feed`.
    pub fn new(feed: TaskFeed<R>, layout: &'a DataLayout, loader: &'a L) -> Self {
        Self {
            feed,
            layout,
            loader,
            pending: None,
            failed: false,
        }
    }

    fn load(&self, task: &TaskDescriptor, dir: &str) -> Result<WorkItem<L::Image>, SchedulerError> {
        let input = self.layout.input_path(dir, &task.input);
        let image = self
            .loader
            .load(&input)
            .map_err(|source| SchedulerError::Load {
                path: input.clone(),
                source,
            })?;
        let output = self.layout.output_path(dir, &task.output);
        debug!(
            input = %input.display(),
            output = %output.display(),
            effects = task.effects.len(),
            "Loaded work item"
        );
        Ok(WorkItem {
            image,
            output,
            effects: Arc::clone(&task.effects),
        })
    }
}

impl<L: ImageLoader, R: Read> Iterator for WorkItems<'_, L, R> {
    type Item = Result<WorkItem<L::Image>, SchedulerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            if let Some((task, dir_index)) = self.pending.take() {
                if let Some(dir) = self.layout.dirs.get(dir_index) {
                    let result = self.load(&task, dir);
                    self.pending = Some((task, dir_index + 1));
                    if result.is_err() {
                        self.failed = true;
                    }
                    return Some(result);
                }
            }

            match self.feed.next()? {
                Ok(task) => self.pending = Some((task, 0)),
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Loads every work item of the feed up front, in feed order.
pub fn collect_work_items<L: ImageLoader, R: Read>(
    feed: TaskFeed<R>,
    layout: &DataLayout,
    loader: &L,
) -> Result<Vec<WorkItem<L::Image>>, SchedulerError> {
    WorkItems::new(feed, layout, loader).collect()
}
