//! Pixel kernels for the supported effects.
//!
//! Convolutions use a 3×3 kernel over the RGB channels with zero padding at
//! the image border; alpha is carried over from the source pixel. Results are
//! clamped to the 16-bit channel range and truncated.

use super::png::Pixel;
use crate::effect::Effect;

const MAX_CHANNEL: f64 = u16::MAX as f64;

type Kernel = [f64; 9];

const SHARPEN: Kernel = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];

const BLUR: Kernel = [
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
];

const EDGE_DETECT: Kernel = [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0];

/// Renders row `y` of `effect` applied to `source` into `out`.
///
/// `source` is the full current buffer (neighbouring rows are needed for the
/// convolutions); `out` is the staging row, `out.len()` equals the image width.
pub(crate) fn render_row(effect: Effect, source: &[Vec<Pixel>], y: usize, out: &mut [Pixel]) {
    match effect {
        Effect::Grayscale => grayscale_row(&source[y], out),
        Effect::Sharpen => convolve_row(&SHARPEN, source, y, out),
        Effect::Blur => convolve_row(&BLUR, source, y, out),
        Effect::EdgeDetect => convolve_row(&EDGE_DETECT, source, y, out),
    }
}

fn clamp(value: f64) -> u16 {
    value.clamp(0.0, MAX_CHANNEL) as u16
}

fn grayscale_row(source: &[Pixel], out: &mut [Pixel]) {
    for (dst, &[r, g, b, a]) in out.iter_mut().zip(source) {
        let grey = clamp((r as f64 + g as f64 + b as f64) / 3.0);
        *dst = [grey, grey, grey, a];
    }
}

fn convolve_row(kernel: &Kernel, source: &[Vec<Pixel>], y: usize, out: &mut [Pixel]) {
    let height = source.len() as isize;
    let width = out.len() as isize;

    for x in 0..width {
        let mut sum = [0.0f64; 3];
        for ky in -1..=1isize {
            let sy = y as isize + ky;
            if sy < 0 || sy >= height {
                continue;
            }
            let row = &source[sy as usize];
            for kx in -1..=1isize {
                let sx = x + kx;
                if sx < 0 || sx >= width {
                    continue;
                }
                let weight = kernel[((ky + 1) * 3 + (kx + 1)) as usize];
                let px = row[sx as usize];
                for (acc, &channel) in sum.iter_mut().zip(&px[..3]) {
                    *acc += weight * channel as f64;
                }
            }
        }
        let alpha = source[y][x as usize][3];
        out[x as usize] = [clamp(sum[0]), clamp(sum[1]), clamp(sum[2]), alpha];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(width: usize, height: usize, px: Pixel) -> Vec<Vec<Pixel>> {
        vec![vec![px; width]; height]
    }

    #[test]
    fn test_grayscale_averages_rgb_and_keeps_alpha() {
        let source = vec![vec![[300, 600, 900, 1234]]];
        let mut out = vec![[0; 4]; 1];
        render_row(Effect::Grayscale, &source, 0, &mut out);
        assert_eq!(out[0], [600, 600, 600, 1234]);
    }

    #[test]
    fn test_blur_of_uniform_interior_is_identity() {
        let source = uniform(3, 3, [900, 900, 900, u16::MAX]);
        let mut out = vec![[0; 4]; 3];
        render_row(Effect::Blur, &source, 1, &mut out);
        // 9 × (900 / 9) may land a hair under 900 in floating point.
        let centre = out[1];
        assert!((899..=900).contains(&centre[0]));
        assert_eq!(centre[3], u16::MAX);
    }

    #[test]
    fn test_blur_zero_pads_corners() {
        let source = uniform(2, 2, [900, 900, 900, 7]);
        let mut out = vec![[0; 4]; 2];
        render_row(Effect::Blur, &source, 0, &mut out);
        // Corner sees 4 of 9 taps.
        assert!((399..=400).contains(&out[0][0]));
        assert_eq!(out[0][3], 7);
    }

    #[test]
    fn test_edge_detect_flat_interior_is_black() {
        let source = uniform(3, 3, [5000, 5000, 5000, 1]);
        let mut out = vec![[0; 4]; 3];
        render_row(Effect::EdgeDetect, &source, 1, &mut out);
        assert_eq!(out[1], [0, 0, 0, 1]);
    }

    #[test]
    fn test_sharpen_clamps_to_channel_range() {
        let mut source = uniform(3, 3, [0, 0, 0, 9]);
        source[1][1] = [u16::MAX, u16::MAX, u16::MAX, 9];
        let mut out = vec![[0; 4]; 3];
        render_row(Effect::Sharpen, &source, 1, &mut out);
        assert_eq!(out[1], [u16::MAX, u16::MAX, u16::MAX, 9]);
        // Neighbours get -1 × MAX and clamp at zero.
        assert_eq!(out[0], [0, 0, 0, 9]);
    }
}
