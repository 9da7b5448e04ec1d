// SPDX-License-Identifier: GPL-3.0-only

//! JPEG encoding and photo finalization

use super::processing::{DisplayableImage, convert_rgba_to_rgb};
use crate::constants::{capture, library};
use crate::errors::PhotoError;
use crate::storage::CapturedPhoto;
use chrono::{DateTime, Utc};
use image::RgbImage;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Encodes displayable stills and stamps them as library photos
#[derive(Debug)]
pub struct PhotoEncoder {
    quality: u8,
    /// Last id handed out; ids are millisecond timestamps bumped past this
    last_id: AtomicU64,
}

impl Default for PhotoEncoder {
    fn default() -> Self {
        Self::new(capture::JPEG_QUALITY)
    }
}

impl PhotoEncoder {
    /// Create an encoder with the given JPEG quality (clamped to 1-100)
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
            last_id: AtomicU64::new(0),
        }
    }

    /// Make sure future ids are greater than `id`
    ///
    /// Called with the largest id of a loaded library.
    pub fn observe_id(&self, id: u64) {
        self.last_id.fetch_max(id, Ordering::SeqCst);
    }

    /// Next unique id for a photo taken at `now`
    ///
    /// Saturates at `u64::MAX` when a loaded library already holds that id.
    fn next_id(&self, now: DateTime<Utc>) -> u64 {
        let millis = now.timestamp_millis().max(0) as u64;
        let previous = self
            .last_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(millis.max(last.saturating_add(1)))
            })
            .unwrap_or(millis);
        millis.max(previous.saturating_add(1))
    }

    /// Encode pixels as JPEG
    pub fn encode_jpeg(&self, image: &RgbImage) -> Result<Vec<u8>, PhotoError> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);

        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, self.quality);

        encoder
            .encode(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| PhotoError::EncodingFailed(format!("JPEG encoding failed: {}", e)))?;

        Ok(buffer)
    }

    /// Encode the displayed pixels and stamp id, timestamp, filename and filter
    pub fn finalize(&self, displayable: &DisplayableImage) -> Result<CapturedPhoto, PhotoError> {
        self.finalize_at(displayable, Utc::now())
    }

    pub(crate) fn finalize_at(
        &self,
        displayable: &DisplayableImage,
        now: DateTime<Utc>,
    ) -> Result<CapturedPhoto, PhotoError> {
        let rgb = convert_rgba_to_rgb(&displayable.frame)?;
        let data = self.encode_jpeg(&rgb)?;
        let id = self.next_id(now);

        debug!(id, size = data.len(), quality = self.quality, "Encoding complete");

        Ok(CapturedPhoto {
            id,
            data,
            filter: displayable.filter,
            timestamp: now,
            filename: format!("{}{}.jpg", library::FILENAME_PREFIX, id),
        })
    }
}

/// Write a photo's JPEG bytes to `target`
///
/// A directory target gets the photo's generated filename appended.
pub fn export_photo(photo: &CapturedPhoto, target: &Path) -> std::io::Result<PathBuf> {
    let path = if target.is_dir() {
        target.join(&photo.filename)
    } else {
        target.to_path_buf()
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, &photo.data)?;

    info!(path = %path.display(), id = photo.id, "Exported photo");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::CameraFrame;
    use crate::filters::FilterKind;
    use chrono::TimeZone;

    fn displayable() -> DisplayableImage {
        DisplayableImage {
            frame: CameraFrame::solid(8, 8, [200, 100, 50, 255]),
            filter: FilterKind::Invert,
        }
    }

    #[test]
    fn test_finalize_stamps_metadata() {
        let encoder = PhotoEncoder::default();
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let photo = encoder.finalize_at(&displayable(), now).unwrap();

        assert_eq!(photo.id, 1_700_000_000_123);
        assert_eq!(photo.filename, "photo_1700000000123.jpg");
        assert_eq!(photo.filter, FilterKind::Invert);
        assert_eq!(photo.timestamp, now);
        assert_eq!(&photo.data[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&photo.data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 8));
    }

    #[test]
    fn test_ids_increase_within_same_millisecond() {
        let encoder = PhotoEncoder::default();
        let now = Utc.timestamp_millis_opt(5_000).unwrap();
        let a = encoder.finalize_at(&displayable(), now).unwrap();
        let b = encoder.finalize_at(&displayable(), now).unwrap();
        assert_eq!(a.id, 5_000);
        assert_eq!(b.id, 5_001);
    }

    #[test]
    fn test_observed_ids_are_skipped() {
        let encoder = PhotoEncoder::default();
        encoder.observe_id(9_000);
        let now = Utc.timestamp_millis_opt(5_000).unwrap();
        assert_eq!(encoder.finalize_at(&displayable(), now).unwrap().id, 9_001);
    }

    #[test]
    fn test_largest_observed_id_saturates() {
        let encoder = PhotoEncoder::default();
        encoder.observe_id(u64::MAX);
        let now = Utc.timestamp_millis_opt(5_000).unwrap();
        assert_eq!(encoder.finalize_at(&displayable(), now).unwrap().id, u64::MAX);
        assert_eq!(encoder.finalize_at(&displayable(), now).unwrap().id, u64::MAX);
    }

    #[test]
    fn test_export_into_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let encoder = PhotoEncoder::default();
        let photo = encoder.finalize(&displayable()).unwrap();

        let path = export_photo(&photo, dir.path()).unwrap();
        assert_eq!(path, dir.path().join(&photo.filename));
        assert_eq!(std::fs::read(path).unwrap(), photo.data);
    }
}
