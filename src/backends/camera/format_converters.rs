// SPDX-License-Identifier: GPL-3.0-only
//! Pixel format conversion for V4L2 capture buffers
//!
//! Cameras deliver packed YUV 4:2:2, RGB24 or MJPEG. Everything is converted to
//! tightly packed RGBA before it reaches the filter engine.

use image::ImageFormat;

/// Native formats the V4L2 source knows how to convert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeFormat {
    /// Motion JPEG, one JPEG image per buffer
    Mjpeg,
    /// YUYV 4:2:2 (Y0 U Y1 V)
    Yuyv,
    /// UYVY 4:2:2 (U Y0 V Y1)
    Uyvy,
    /// 24-bit RGB
    Rgb24,
}

impl NativeFormat {
    /// Formats in order of preference when negotiating with a device
    pub const PREFERRED: [NativeFormat; 4] = [
        NativeFormat::Mjpeg,
        NativeFormat::Yuyv,
        NativeFormat::Uyvy,
        NativeFormat::Rgb24,
    ];

    /// V4L2 FourCC code
    pub fn fourcc(&self) -> [u8; 4] {
        match self {
            NativeFormat::Mjpeg => *b"MJPG",
            NativeFormat::Yuyv => *b"YUYV",
            NativeFormat::Uyvy => *b"UYVY",
            NativeFormat::Rgb24 => *b"RGB3",
        }
    }

    /// Parse a V4L2 FourCC code
    pub fn from_fourcc(code: &[u8; 4]) -> Option<Self> {
        match code {
            b"MJPG" | b"JPEG" => Some(NativeFormat::Mjpeg),
            b"YUYV" => Some(NativeFormat::Yuyv),
            b"UYVY" => Some(NativeFormat::Uyvy),
            b"RGB3" => Some(NativeFormat::Rgb24),
            _ => None,
        }
    }

    /// Convert one capture buffer to RGBA
    ///
    /// Returns the decoded dimensions with the pixels; MJPEG buffers carry
    /// their own size, the packed formats use the negotiated one.
    pub fn to_rgba(&self, data: &[u8], width: u32, height: u32) -> Result<(u32, u32, Vec<u8>), String> {
        match self {
            NativeFormat::Mjpeg => {
                let image = image::load_from_memory_with_format(data, ImageFormat::Jpeg)
                    .map_err(|e| format!("MJPEG decode failed: {}", e))?
                    .to_rgba8();
                let (w, h) = image.dimensions();
                Ok((w, h, image.into_raw()))
            }
            NativeFormat::Yuyv => Ok((width, height, yuyv_to_rgba(data, width, height))),
            NativeFormat::Uyvy => Ok((width, height, uyvy_to_rgba(data, width, height))),
            NativeFormat::Rgb24 => Ok((width, height, rgb_to_rgba(data))),
        }
    }
}

/// BT.601 YUV to RGB for one pixel
#[inline]
fn yuv_to_rgb(y: f32, u: f32, v: f32) -> [u8; 3] {
    let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
    let g = (y - 0.344 * u - 0.714 * v).clamp(0.0, 255.0) as u8;
    let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;
    [r, g, b]
}

/// Convert packed 4:2:2 data where each 4-byte group holds two pixels
///
/// `order` gives the byte positions of (Y0, U, Y1, V) inside the group.
fn packed_422_to_rgba(data: &[u8], width: u32, height: u32, order: [usize; 4]) -> Vec<u8> {
    let pixel_count = (width * height) as usize;
    let mut rgba = Vec::with_capacity(pixel_count * 4);

    for chunk in data.chunks_exact(4) {
        let y0 = chunk[order[0]] as f32;
        let u = chunk[order[1]] as f32 - 128.0;
        let y1 = chunk[order[2]] as f32;
        let v = chunk[order[3]] as f32 - 128.0;

        for y in [y0, y1] {
            if rgba.len() >= pixel_count * 4 {
                break;
            }
            let [r, g, b] = yuv_to_rgb(y, u, v);
            rgba.extend_from_slice(&[r, g, b, 255]);
        }
    }

    // Short buffers (truncated transfers) are padded black
    rgba.resize(pixel_count * 4, 0);
    rgba
}

/// Convert YUYV (Y0 U Y1 V) to RGBA
pub fn yuyv_to_rgba(data: &[u8], width: u32, height: u32) -> Vec<u8> {
    packed_422_to_rgba(data, width, height, [0, 1, 2, 3])
}

/// Convert UYVY (U Y0 V Y1) to RGBA
pub fn uyvy_to_rgba(data: &[u8], width: u32, height: u32) -> Vec<u8> {
    packed_422_to_rgba(data, width, height, [1, 0, 3, 2])
}

/// Convert RGB to RGBA by adding alpha=255
pub fn rgb_to_rgba(rgb: &[u8]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(rgb.len() / 3 * 4);
    for chunk in rgb.chunks_exact(3) {
        rgba.extend_from_slice(&[chunk[0], chunk[1], chunk[2], 255]);
    }
    rgba
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yuyv_neutral_chroma_is_gray() {
        // Two pixels, Y=100 and Y=200, neutral chroma
        let data = [100u8, 128, 200, 128];
        let rgba = yuyv_to_rgba(&data, 2, 1);
        assert_eq!(rgba, vec![100, 100, 100, 255, 200, 200, 200, 255]);
    }

    #[test]
    fn test_uyvy_matches_yuyv_after_reorder() {
        let yuyv = [90u8, 60, 180, 200];
        let uyvy = [60u8, 90, 200, 180];
        assert_eq!(yuyv_to_rgba(&yuyv, 2, 1), uyvy_to_rgba(&uyvy, 2, 1));
    }

    #[test]
    fn test_short_buffer_is_padded() {
        let rgba = yuyv_to_rgba(&[16, 128, 16, 128], 4, 1);
        assert_eq!(rgba.len(), 16);
        assert_eq!(&rgba[8..], &[0; 8]);
    }

    #[test]
    fn test_rgb_to_rgba() {
        assert_eq!(rgb_to_rgba(&[1, 2, 3, 4, 5, 6]), vec![1, 2, 3, 255, 4, 5, 6, 255]);
    }

    #[test]
    fn test_fourcc_round_trip_for_preferred_formats() {
        for format in NativeFormat::PREFERRED {
            assert_eq!(NativeFormat::from_fourcc(&format.fourcc()), Some(format));
        }
    }
}
