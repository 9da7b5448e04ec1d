// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for frame sources

use crate::errors::{AcquisitionError, FilterError, FilterResult};
use image::RgbaImage;
use std::sync::Arc;
use std::time::Instant;

/// Result type for frame source operations
pub type BackendResult<T> = Result<T, AcquisitionError>;

/// Bytes per RGBA pixel
pub const BYTES_PER_PIXEL: usize = 4;

/// A single RGBA frame
///
/// Pixel data is tightly packed (`width * 4` bytes per row) and shared through
/// an `Arc`, so cloning a frame never copies pixels. Frames are immutable once
/// produced; the filter engine always writes a new one.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// RGBA pixels, row-major
    pub data: Arc<[u8]>,
    /// Timestamp when frame was produced (for latency diagnostics)
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Create a frame, rejecting zero sizes and mismatched buffers
    pub fn new(width: u32, height: u32, data: impl Into<Arc<[u8]>>) -> FilterResult<Self> {
        let frame = Self {
            width,
            height,
            data: data.into(),
            captured_at: Instant::now(),
        };
        frame.validate()?;
        Ok(frame)
    }

    /// Create a frame filled with a single colour
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixel_count = width as usize * height as usize;
        let data: Vec<u8> = std::iter::repeat_n(rgba, pixel_count).flatten().collect();
        Self {
            width,
            height,
            data: Arc::from(data),
            captured_at: Instant::now(),
        }
    }

    /// Wrap a decoded image
    pub fn from_rgba_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: Arc::from(image.into_raw()),
            captured_at: Instant::now(),
        }
    }

    /// Number of bytes a valid frame of these dimensions holds
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * BYTES_PER_PIXEL
    }

    /// Check that the frame has a non-zero size and a matching buffer
    pub fn validate(&self) -> FilterResult<()> {
        if self.width == 0 || self.height == 0 || self.data.len() != self.expected_len() {
            return Err(FilterError::InvalidFrame {
                width: self.width,
                height: self.height,
                len: self.data.len(),
            });
        }
        Ok(())
    }

    /// View the buffer as RGBA pixels
    pub fn pixels(&self) -> FilterResult<&[[u8; 4]]> {
        self.validate()?;
        Ok(bytemuck::cast_slice(&self.data[..]))
    }

    /// Read one pixel, `None` when out of bounds
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let px = self.data.get(idx..idx + BYTES_PER_PIXEL)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Nearest pixel to a point given as fractions of the frame's width and
    /// height
    ///
    /// Coordinates are clamped, so `1.0` reads the last column or row.
    pub fn sample(&self, u: f64, v: f64) -> Option<[u8; 4]> {
        let x = (u.clamp(0.0, 1.0) * self.width as f64) as u32;
        let y = (v.clamp(0.0, 1.0) * self.height as f64) as u32;
        self.pixel(x.min(self.width.saturating_sub(1)), y.min(self.height.saturating_sub(1)))
    }

    /// Copy the pixels into an `image` buffer
    pub fn to_rgba_image(&self) -> FilterResult<RgbaImage> {
        self.validate()?;
        RgbaImage::from_raw(self.width, self.height, self.data.to_vec()).ok_or(
            FilterError::InvalidFrame {
                width: self.width,
                height: self.height,
                len: self.data.len(),
            },
        )
    }
}

/// Frames compare by dimensions and pixels; the timestamp is ignored.
impl PartialEq for CameraFrame {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.data == other.data
    }
}

impl Eq for CameraFrame {}

/// Represents a camera device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    /// Human-readable name (V4L2 card name or file name)
    pub name: String,
    /// Stable identifier used to reopen the device (e.g. /dev/video0)
    pub path: String,
    /// Driver name when known
    pub driver: Option<String>,
}

impl std::fmt::Display for CameraDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.path)
    }
}

/// Which device a source should open
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeviceSelector {
    /// First device that opens
    #[default]
    Default,
    /// Position in `list_devices()`
    Index(usize),
    /// Device path
    Path(String),
}

impl DeviceSelector {
    /// Resolve the selector against an enumerated device list
    pub fn resolve<'a>(&self, devices: &'a [CameraDevice]) -> BackendResult<&'a CameraDevice> {
        if devices.is_empty() {
            return Err(AcquisitionError::NoCameraFound);
        }
        match self {
            DeviceSelector::Default => Ok(&devices[0]),
            DeviceSelector::Index(index) => devices.get(*index).ok_or_else(|| {
                AcquisitionError::DeviceNotFound(format!(
                    "camera index {} out of range (0-{})",
                    index,
                    devices.len() - 1
                ))
            }),
            DeviceSelector::Path(path) => devices
                .iter()
                .find(|d| &d.path == path)
                .ok_or_else(|| AcquisitionError::DeviceNotFound(path.clone())),
        }
    }
}

/// Proof of an active stream
///
/// Returned by `FrameSource::start` and consumed by `FrameSource::stop`, so a
/// stream can only be stopped once.
#[derive(Debug, PartialEq, Eq)]
pub struct StreamHandle {
    id: u64,
    device: CameraDevice,
}

impl StreamHandle {
    pub fn new(id: u64, device: CameraDevice) -> Self {
        Self { id, device }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// The device this stream was opened on
    pub fn device(&self) -> &CameraDevice {
        &self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devices() -> Vec<CameraDevice> {
        (0..2)
            .map(|i| CameraDevice {
                name: format!("Camera {}", i),
                path: format!("/dev/video{}", i),
                driver: None,
            })
            .collect()
    }

    #[test]
    fn test_new_rejects_mismatched_buffer() {
        assert!(CameraFrame::new(2, 2, vec![0u8; 15]).is_err());
        assert!(CameraFrame::new(0, 2, Vec::<u8>::new()).is_err());
        assert!(CameraFrame::new(2, 2, vec![0u8; 16]).is_ok());
    }

    #[test]
    fn test_solid_frame_pixels() {
        let frame = CameraFrame::solid(3, 2, [1, 2, 3, 4]);
        assert_eq!(frame.data.len(), 24);
        assert_eq!(frame.pixel(2, 1), Some([1, 2, 3, 4]));
        assert_eq!(frame.pixel(3, 0), None);
        assert!(frame.pixels().unwrap().iter().all(|p| *p == [1, 2, 3, 4]));
    }

    #[test]
    fn test_sample_uses_nearest_pixel() {
        let data = [[1, 0, 0, 255], [2, 0, 0, 255], [3, 0, 0, 255], [4, 0, 0, 255]].concat();
        let frame = CameraFrame::new(2, 2, data).unwrap();
        assert_eq!(frame.sample(0.0, 0.0), Some([1, 0, 0, 255]));
        assert_eq!(frame.sample(0.75, 0.25), Some([2, 0, 0, 255]));
        assert_eq!(frame.sample(1.0, 1.0), Some([4, 0, 0, 255]));
        assert_eq!(frame.sample(-3.0, 0.6), Some([3, 0, 0, 255]));
        assert_eq!(CameraFrame::solid(0, 0, [0; 4]).sample(0.5, 0.5), None);
    }

    #[test]
    fn test_selector_resolution() {
        let devices = devices();
        assert_eq!(
            DeviceSelector::Default.resolve(&devices).unwrap().path,
            "/dev/video0"
        );
        assert_eq!(
            DeviceSelector::Index(1).resolve(&devices).unwrap().path,
            "/dev/video1"
        );
        assert!(matches!(
            DeviceSelector::Index(5).resolve(&devices),
            Err(AcquisitionError::DeviceNotFound(_))
        ));
        assert_eq!(
            DeviceSelector::Default.resolve(&[]),
            Err(AcquisitionError::NoCameraFound)
        );
    }
}
