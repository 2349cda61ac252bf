//! The image collaborator: double-buffered, row-addressable images.
//!
//! Schedulers only talk to images through the [`RowImage`] and [`ImageLoader`]
//! traits, so the buffer representation and codec stay swappable.
//!
//! # Buffer Roles
//!
//! ```text
//!            apply_effect(rows)
//!   current ────────────────────► staging   (only `rows` are written)
//!      ▲                             │
//!      └─────────── swap() ──────────┘
//!
//!   save() encodes the staging buffer
//! ```
//!
//! Because `save` reads *staging*, every scheduler swaps once after each effect
//! (so the next effect reads the fresh result) and once more after the last
//! effect (so the final result sits in staging when it is persisted).
//!
//! # Available Implementations
//!
//! - [`PngImage`] / [`PngLoader`] - 16-bit RGBA buffers backed by the `image` crate

mod error;
mod kernel;
mod png;
mod traits;

pub use error::ImageError;
pub use png::{Pixel, PngImage, PngLoader};
pub use traits::{ImageLoader, RowImage};
