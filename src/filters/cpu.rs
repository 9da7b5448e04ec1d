// SPDX-License-Identifier: GPL-3.0-only

//! CPU filter kernels over tightly packed RGBA buffers
//!
//! Every kernel reads `src` and writes `dst`; both hold `width * height * 4`
//! bytes. Results are quantized like an 8-bit clamped canvas buffer: rounded
//! half to even, then clamped to 0..=255.

use crate::constants::filters::{BLUR_RADIUS, BRIGHTNESS_GAIN, LUMA_WEIGHTS, SEPIA_MATRIX};

/// Store a computed channel value
#[inline]
pub fn quantize(value: f64) -> u8 {
    value.clamp(0.0, 255.0).round_ties_even() as u8
}

#[inline]
fn luma(r: f64, g: f64, b: f64) -> f64 {
    LUMA_WEIGHTS[0] * r + LUMA_WEIGHTS[1] * g + LUMA_WEIGHTS[2] * b
}

/// Apply a per-pixel RGB transform, carrying alpha through
#[inline]
fn map_pixels(src: &[u8], dst: &mut [u8], f: impl Fn(f64, f64, f64) -> [u8; 3]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        let [r, g, b] = f(s[0] as f64, s[1] as f64, s[2] as f64);
        d[0] = r;
        d[1] = g;
        d[2] = b;
        d[3] = s[3];
    }
}

pub fn grayscale(src: &[u8], dst: &mut [u8]) {
    map_pixels(src, dst, |r, g, b| {
        let l = quantize(luma(r, g, b));
        [l, l, l]
    });
}

pub fn sepia(src: &[u8], dst: &mut [u8]) {
    map_pixels(src, dst, |r, g, b| {
        let row = |m: [f64; 3]| quantize((m[0] * r + m[1] * g + m[2] * b).min(255.0));
        [row(SEPIA_MATRIX[0]), row(SEPIA_MATRIX[1]), row(SEPIA_MATRIX[2])]
    });
}

pub fn invert(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        d[0] = 255 - s[0];
        d[1] = 255 - s[1];
        d[2] = 255 - s[2];
        d[3] = s[3];
    }
}

pub fn brightness(src: &[u8], dst: &mut [u8]) {
    map_pixels(src, dst, |r, g, b| {
        let boost = |c: f64| quantize((c * BRIGHTNESS_GAIN).min(255.0));
        [boost(r), boost(g), boost(b)]
    });
}

/// Box blur over RGB
///
/// Only pixels at least `BLUR_RADIUS` away from every edge are written; the
/// border keeps its source values. All reads come from `src`, never from
/// already blurred output.
pub fn box_blur(src: &[u8], dst: &mut [u8], width: usize, height: usize) {
    dst.copy_from_slice(src);

    let r = BLUR_RADIUS;
    if width <= 2 * r || height <= 2 * r {
        return;
    }

    let window = ((2 * r + 1) * (2 * r + 1)) as f64;
    let stride = width * 4;

    for y in r..height - r {
        for x in r..width - r {
            let mut sum = [0u32; 3];
            for sy in y - r..=y + r {
                let row = sy * stride;
                for sx in x - r..=x + r {
                    let idx = row + sx * 4;
                    sum[0] += src[idx] as u32;
                    sum[1] += src[idx + 1] as u32;
                    sum[2] += src[idx + 2] as u32;
                }
            }

            let out = y * stride + x * 4;
            for c in 0..3 {
                dst[out + c] = quantize(sum[c] as f64 / window);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize_rounds_half_to_even() {
        assert_eq!(quantize(76.5), 76);
        assert_eq!(quantize(77.5), 78);
        assert_eq!(quantize(-3.0), 0);
        assert_eq!(quantize(300.0), 255);
    }

    #[test]
    fn test_sepia_of_white_is_clamped() {
        let src = [255u8, 255, 255, 10];
        let mut dst = [0u8; 4];
        sepia(&src, &mut dst);
        // 0.272 + 0.534 + 0.131 = 0.937 -> 238.935
        assert_eq!(dst, [255, 255, 239, 10]);
    }

    #[test]
    fn test_brightness_keeps_alpha() {
        let src = [100u8, 0, 200, 7];
        let mut dst = [0u8; 4];
        brightness(&src, &mut dst);
        assert_eq!(dst, [130, 0, 255, 7]);
    }

    #[test]
    fn test_blur_averages_single_bright_pixel() {
        // 5x5 frame, only the centre pixel is lit
        let mut src = vec![0u8; 5 * 5 * 4];
        let centre = (2 * 5 + 2) * 4;
        src[centre] = 250;
        let mut dst = vec![0u8; src.len()];
        box_blur(&src, &mut dst, 5, 5);
        assert_eq!(dst[centre], 10);
    }

    #[test]
    fn test_blur_small_frame_is_copied() {
        let src: Vec<u8> = (0..4 * 4 * 4).map(|v| v as u8).collect();
        let mut dst = vec![0u8; src.len()];
        box_blur(&src, &mut dst, 4, 4);
        assert_eq!(dst, src);
    }
}
