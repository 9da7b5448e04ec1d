// SPDX-License-Identifier: GPL-3.0-only

//! Photo capture pipeline
//!
//! ```text
//! Frame source → Capture → Filter + rescale → Encoding → PhotoLibrary
//!       ↓
//! Live render loop continues uninterrupted
//! ```
//!
//! # Pipeline Stages
//!
//! 1. **Capture**: pull one raw frame at native resolution
//! 2. **Preview**: filter the raw still, then fit it to the preview bounds
//! 3. **Finalize**: JPEG-encode the displayed pixels and stamp metadata
//!
//! Re-selecting a filter between capture and save re-renders from the raw
//! still, never from the previous preview.

pub mod capture;
pub mod encoding;
pub mod processing;

pub use capture::PhotoCapture;
pub use encoding::{PhotoEncoder, export_photo};
pub use processing::{DisplayableImage, fit_within, render_preview};

use crate::backends::camera::{CameraFrame, SharedSource};
use crate::constants::capture as capture_consts;
use crate::errors::PhotoError;
use crate::filters::FilterKind;
use crate::storage::CapturedPhoto;
use tracing::info;

/// A captured still awaiting save or retake
#[derive(Debug, Clone)]
pub struct CaptureSession {
    still: CameraFrame,
    preview: DisplayableImage,
}

impl CaptureSession {
    /// The unfiltered still at native resolution
    pub fn still(&self) -> &CameraFrame {
        &self.still
    }

    /// The current filtered, display-sized rendering
    pub fn preview(&self) -> &DisplayableImage {
        &self.preview
    }

    pub fn filter(&self) -> FilterKind {
        self.preview.filter
    }
}

/// Capture → preview → finalize workflow with fixed preview bounds
#[derive(Debug)]
pub struct PhotoPipeline {
    encoder: PhotoEncoder,
    max_width: u32,
    max_height: u32,
}

impl Default for PhotoPipeline {
    fn default() -> Self {
        Self::new(
            capture_consts::PREVIEW_MAX_WIDTH,
            capture_consts::PREVIEW_MAX_HEIGHT,
            capture_consts::JPEG_QUALITY,
        )
    }
}

impl PhotoPipeline {
    pub fn new(max_width: u32, max_height: u32, jpeg_quality: u8) -> Self {
        Self {
            encoder: PhotoEncoder::new(jpeg_quality),
            max_width,
            max_height,
        }
    }

    pub fn encoder(&self) -> &PhotoEncoder {
        &self.encoder
    }

    /// Capture a still and render it with `kind`
    pub fn capture(&self, source: &SharedSource, kind: FilterKind) -> Result<CaptureSession, PhotoError> {
        let still = PhotoCapture::capture(source)?;
        self.session_from_still(still, kind)
    }

    /// Start a session from an already captured still
    pub fn session_from_still(
        &self,
        still: CameraFrame,
        kind: FilterKind,
    ) -> Result<CaptureSession, PhotoError> {
        let preview = render_preview(&still, kind, self.max_width, self.max_height)?;
        Ok(CaptureSession { still, preview })
    }

    /// Re-render a session with another filter, starting from the raw still
    pub fn reapply(&self, session: &mut CaptureSession, kind: FilterKind) -> Result<(), PhotoError> {
        if session.preview.filter == kind {
            return Ok(());
        }
        session.preview = render_preview(&session.still, kind, self.max_width, self.max_height)?;
        info!(filter = %kind, "Re-rendered capture preview");
        Ok(())
    }

    /// Encode the session's current preview as a library photo
    pub fn finalize(&self, session: &CaptureSession) -> Result<CapturedPhoto, PhotoError> {
        self.encoder.finalize(&session.preview)
    }
}
