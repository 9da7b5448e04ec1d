// SPDX-License-Identifier: GPL-3.0-only

//! Preview rendering for captured stills
//!
//! The still is filtered at native resolution with the same filter engine the
//! live loop uses, then scaled down to fit the preview bounds.

use crate::backends::camera::CameraFrame;
use crate::errors::PhotoError;
use crate::filters::{self, FilterKind};
use image::RgbImage;
use image::imageops::{self, FilterType};
use tracing::debug;

/// A filtered, display-sized still ready for encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayableImage {
    pub frame: CameraFrame,
    /// Filter the pixels were rendered with
    pub filter: FilterKind,
}

/// Fit `width x height` inside the bounds, preserving aspect ratio
///
/// The width bound is applied first; if the height still exceeds its bound
/// both sides are scaled again by the height ratio. Results are floored, never
/// below 1, and never larger than the input.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let (mut w, mut h) = (width as f64, height as f64);
    let (max_w, max_h) = (max_width.max(1) as f64, max_height.max(1) as f64);

    if w > max_w {
        h = h * max_w / w;
        w = max_w;
    }
    if h > max_h {
        w = w * max_h / h;
        h = max_h;
    }

    let clamp = |v: f64, original: u32| (v.floor() as u32).clamp(1, original.max(1));
    (clamp(w, width), clamp(h, height))
}

/// Filter a still and scale it for display
///
/// Always starts from the unfiltered still, so switching filters never stacks
/// effects.
pub fn render_preview(
    still: &CameraFrame,
    kind: FilterKind,
    max_width: u32,
    max_height: u32,
) -> Result<DisplayableImage, PhotoError> {
    let filtered = filters::apply(still, kind)?;
    let (width, height) = fit_within(filtered.width, filtered.height, max_width, max_height);

    let frame = if (width, height) == (filtered.width, filtered.height) {
        filtered
    } else {
        let resized = imageops::resize(&filtered.to_rgba_image()?, width, height, FilterType::Triangle);
        CameraFrame::from_rgba_image(resized)
    };

    debug!(
        source_width = still.width,
        source_height = still.height,
        width = frame.width,
        height = frame.height,
        filter = %kind,
        "Rendered preview"
    );

    Ok(DisplayableImage {
        frame,
        filter: kind,
    })
}

/// Drop the alpha channel for JPEG encoding
pub fn convert_rgba_to_rgb(frame: &CameraFrame) -> Result<RgbImage, PhotoError> {
    let pixels = frame.pixels()?;
    let rgb_data: Vec<u8> = pixels.iter().flat_map(|p| [p[0], p[1], p[2]]).collect();

    RgbImage::from_raw(frame.width, frame.height, rgb_data).ok_or_else(|| {
        PhotoError::EncodingFailed("Failed to create RGB image from converted data".to_string())
    })
}
