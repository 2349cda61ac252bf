//! Traits the schedulers use to drive images.

use std::path::Path;

use super::ImageError;
use crate::effect::Effect;
use crate::partition::RowRange;

/// A double-buffered image whose rows can be transformed in parallel.
///
/// # Concurrency Contract
///
/// - `apply_effect` takes `&self`: several callers may run it at once as long
///   as their row ranges are disjoint. Each call reads the *current* buffer and
///   writes only its own rows of the *staging* buffer.
/// - `swap` takes `&mut self`, so it can never overlap an `apply_effect`.
/// - `save` persists the *staging* buffer.
pub trait RowImage: Send + Sync {
    /// Returns the row bounds `(min_y, max_y)`, half-open.
    fn bounds(&self) -> (usize, usize);

    /// Applies `effect` to `rows`, reading current and writing staging.
    fn apply_effect(&self, effect: Effect, rows: RowRange);

    /// Exchanges the roles of the current and staging buffers.
    fn swap(&mut self);

    /// Encodes the staging buffer to `path`.
    fn save(&self, path: &Path) -> Result<(), ImageError>;
}

/// Creates images from a path.
pub trait ImageLoader: Sync {
    /// The image type produced by this loader.
    type Image: RowImage + 'static;

    /// Loads the image at `path`.
    fn load(&self, path: &Path) -> Result<Self::Image, ImageError>;
}
