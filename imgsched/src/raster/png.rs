//! PNG-backed double-buffered image.

use std::path::Path;

use image::{ImageBuffer, Rgba};
use parking_lot::Mutex;

use super::kernel::render_row;
use super::{ImageError, ImageLoader, RowImage};
use crate::effect::Effect;
use crate::partition::RowRange;

/// One 16-bit RGBA pixel.
pub type Pixel = [u16; 4];

type Rgba16Image = ImageBuffer<Rgba<u16>, Vec<u16>>;

/// A 16-bit RGBA image with a current and a staging buffer.
///
/// Rows of the staging buffer each sit behind their own lock so that
/// concurrent `apply_effect` calls over disjoint row ranges never contend.
/// The staging buffer starts out fully transparent.
#[derive(Debug)]
pub struct PngImage {
    width: usize,
    current: Vec<Vec<Pixel>>,
    staging: Vec<Mutex<Vec<Pixel>>>,
}

impl PngImage {
    /// Creates an image from row-major pixels.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Pixel>) -> Result<Self, ImageError> {
        if pixels.len() != width * height {
            return Err(ImageError::InvalidDimensions {
                width,
                height,
                reason: format!("expected {} pixels, got {}", width * height, pixels.len()),
            });
        }

        Ok(Self::from_row_major(width, height, &pixels))
    }

    /// Creates an image from a decoded 16-bit RGBA buffer.
    pub fn from_rgba16(buffer: Rgba16Image) -> Self {
        let width = buffer.width() as usize;
        let height = buffer.height() as usize;
        let pixels: Vec<Pixel> = buffer.pixels().map(|p| p.0).collect();
        Self::from_row_major(width, height, &pixels)
    }

    fn from_row_major(width: usize, height: usize, pixels: &[Pixel]) -> Self {
        let current: Vec<Vec<Pixel>> = if width == 0 {
            vec![Vec::new(); height]
        } else {
            pixels.chunks(width).map(<[Pixel]>::to_vec).collect()
        };
        let staging = (0..height)
            .map(|_| Mutex::new(vec![[0; 4]; width]))
            .collect();
        Self {
            width,
            current,
            staging,
        }
    }

    /// Decodes the image at `path`.
    pub fn open(path: &Path) -> Result<Self, ImageError> {
        let decoded = image::open(path)?;
        Ok(Self::from_rgba16(decoded.into_rgba16()))
    }

    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.current.len()
    }

    /// Returns a pixel of the current buffer.
    pub fn current_pixel(&self, x: usize, y: usize) -> Pixel {
        self.current[y][x]
    }

    /// Returns a pixel of the staging buffer.
    pub fn staging_pixel(&self, x: usize, y: usize) -> Pixel {
        self.staging[y].lock()[x]
    }

    /// Copies the staging buffer into an encodable image.
    fn staging_buffer(&self) -> Result<Rgba16Image, ImageError> {
        let mut raw = Vec::with_capacity(self.width * self.height() * 4);
        for row in &self.staging {
            for px in row.lock().iter() {
                raw.extend_from_slice(px);
            }
        }
        ImageBuffer::from_raw(self.width as u32, self.height() as u32, raw).ok_or_else(|| {
            ImageError::InvalidDimensions {
                width: self.width,
                height: self.height(),
                reason: "staging buffer size mismatch".to_string(),
            }
        })
    }
}

impl RowImage for PngImage {
    fn bounds(&self) -> (usize, usize) {
        (0, self.height())
    }

    fn apply_effect(&self, effect: Effect, rows: RowRange) {
        debug_assert!(
            rows.end <= self.height(),
            "rows {} exceed image height {}",
            rows,
            self.height()
        );
        for y in rows.rows() {
            let mut out = self.staging[y].lock();
            render_row(effect, &self.current, y, &mut out);
        }
    }

    fn swap(&mut self) {
        for (current, staging) in self.current.iter_mut().zip(self.staging.iter_mut()) {
            std::mem::swap(current, staging.get_mut());
        }
    }

    fn save(&self, path: &Path) -> Result<(), ImageError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        self.staging_buffer()?.save(path)?;
        Ok(())
    }
}

/// Loads [`PngImage`]s from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngLoader;

impl ImageLoader for PngLoader {
    type Image = PngImage;

    fn load(&self, path: &Path) -> Result<PngImage, ImageError> {
        PngImage::open(path)
    }
}
