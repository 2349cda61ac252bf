//! Error types for image loading and saving.

use thiserror::Error;

/// Errors raised by the image collaborator.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Filesystem error while reading or writing an image.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The image could not be decoded or encoded.
    #[error("Codec error: {0}")]
    Codec(#[from] image::ImageError),

    /// Pixel data does not match the stated dimensions.
    #[error("Invalid dimensions {width}×{height}: {reason}")]
    InvalidDimensions {
        width: usize,
        height: usize,
        reason: String,
    },
}
