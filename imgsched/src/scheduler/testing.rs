//! Test doubles for the scheduler tests.
//!
//! [`RecordingLoader`] hands out real [`PngImage`]s (so kernels run for real)
//! wrapped in [`RecordingImage`], which logs every row range applied, counts
//! swaps and captures the persisted buffer instead of writing a file.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::TempDir;

use crate::config::{ExecutionModel, SchedulerConfig};
use crate::effect::Effect;
use crate::feed::FeedPolicy;
use crate::partition::RowRange;
use crate::raster::{ImageError, ImageLoader, Pixel, PngImage, RowImage};

const WIDTH: usize = 7;

/// What a [`RecordingImage`] looked like when it was saved.
#[derive(Debug, Clone)]
pub(crate) struct SavedImage {
    pub path: PathBuf,
    pub swaps: usize,
    pub applied: Vec<(Effect, RowRange)>,
    pub pixels: Vec<Pixel>,
}

#[derive(Debug, Default)]
struct Shared {
    saved: Mutex<Vec<SavedImage>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[derive(Debug)]
pub(crate) struct RecordingImage {
    inner: PngImage,
    swaps: usize,
    applied: Mutex<Vec<(Effect, RowRange)>>,
    shared: Arc<Shared>,
}

impl RowImage for RecordingImage {
    fn bounds(&self) -> (usize, usize) {
        self.inner.bounds()
    }

    fn apply_effect(&self, effect: Effect, rows: RowRange) {
        let now = self.shared.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.peak.fetch_max(now, Ordering::SeqCst);
        self.inner.apply_effect(effect, rows);
        self.applied.lock().push((effect, rows));
        self.shared.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    fn swap(&mut self) {
        self.inner.swap();
        self.swaps += 1;
    }

    fn save(&self, path: &Path) -> Result<(), ImageError> {
        if path.to_string_lossy().contains("readonly") {
            return Err(ImageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only output",
            )));
        }

        let mut applied = self.applied.lock().clone();
        applied.sort_by_key(|(_, range)| range.start);
        let pixels = (0..self.inner.height())
            .flat_map(|y| (0..self.inner.width()).map(move |x| (x, y)))
            .map(|(x, y)| self.inner.staging_pixel(x, y))
            .collect();

        self.shared.saved.lock().push(SavedImage {
            path: path.to_path_buf(),
            swaps: self.swaps,
            applied,
            pixels,
        });
        Ok(())
    }
}

/// Loader producing deterministic images of a fixed height.
///
/// Pixel content depends only on the file name and its data directory, so
/// the same feed yields the same images whatever the temp root. Paths
/// containing "missing" fail to load; outputs containing "readonly" fail to
/// save.
#[derive(Debug)]
pub(crate) struct RecordingLoader {
    height: usize,
    shared: Arc<Shared>,
}

impl RecordingLoader {
    pub fn new(height: usize) -> Self {
        Self {
            height,
            shared: Arc::new(Shared::default()),
        }
    }

    /// Saved images, in save order.
    pub fn saved(&self) -> Vec<SavedImage> {
        self.shared.saved.lock().clone()
    }

    /// Highest number of `apply_effect` calls seen running at once.
    pub fn peak_concurrency(&self) -> usize {
        self.shared.peak.load(Ordering::SeqCst)
    }
}

impl ImageLoader for RecordingLoader {
    type Image = RecordingImage;

    fn load(&self, path: &Path) -> Result<RecordingImage, ImageError> {
        if path.to_string_lossy().contains("missing") {
            return Err(ImageError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no such image",
            )));
        }

        let name = path
            .iter()
            .rev()
            .take(2)
            .flat_map(|c| c.to_string_lossy().into_owned().into_bytes())
            .fold(17usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
        let pixels = (0..WIDTH * self.height)
            .map(|i| {
                let v = name.wrapping_add(i * 7919) % 65_536;
                [v as u16, (v * 3 % 65_536) as u16, (v / 5) as u16, 60_000]
            })
            .collect();

        Ok(RecordingImage {
            inner: PngImage::from_pixels(WIDTH, self.height, pixels)?,
            swaps: 0,
            applied: Mutex::new(Vec::new()),
            shared: Arc::clone(&self.shared),
        })
    }
}

/// A temp data root holding an `effects.txt`.
pub(crate) struct Fixture {
    dir: TempDir,
    dirs: Vec<String>,
}

impl Fixture {
    pub fn new(feed: &str, dirs: &[&str]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("effects.txt"), feed).unwrap();
        Self {
            dir,
            dirs: dirs.iter().map(|d| d.to_string()).collect(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self, model: ExecutionModel, workers: usize) -> SchedulerConfig {
        SchedulerConfig::new(model, self.dirs.clone())
            .with_workers(workers)
            .with_data_root(self.root())
            .with_feed_policy(FeedPolicy::Strict)
    }
}
