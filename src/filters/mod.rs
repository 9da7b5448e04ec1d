// SPDX-License-Identifier: GPL-3.0-only

//! Filter engine
//!
//! `apply` is a pure function from a frame and a [`FilterKind`] to a new frame
//! of the same size. The live render loop and the capture pipeline both go
//! through it, so the preview and the saved photo always match.

pub mod cpu;

use crate::backends::camera::CameraFrame;
use crate::errors::{FilterError, FilterResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

/// Available filters
///
/// Filters are mutually exclusive; exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// Identity
    #[default]
    None,
    /// Luma-weighted monochrome
    Grayscale,
    /// Warm brown tone
    Sepia,
    /// Colour negative
    Invert,
    /// 5x5 box blur
    Blur,
    /// 1.3x gain
    Brightness,
}

impl FilterKind {
    /// All filters in picker order
    pub const ALL: [FilterKind; 6] = [
        FilterKind::None,
        FilterKind::Grayscale,
        FilterKind::Sepia,
        FilterKind::Invert,
        FilterKind::Blur,
        FilterKind::Brightness,
    ];

    /// Lowercase identifier, as stored in the photo library
    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::None => "none",
            FilterKind::Grayscale => "grayscale",
            FilterKind::Sepia => "sepia",
            FilterKind::Invert => "invert",
            FilterKind::Blur => "blur",
            FilterKind::Brightness => "brightness",
        }
    }

    /// Capitalized name for messages
    pub fn display_name(&self) -> &'static str {
        match self {
            FilterKind::None => "None",
            FilterKind::Grayscale => "Grayscale",
            FilterKind::Sepia => "Sepia",
            FilterKind::Invert => "Invert",
            FilterKind::Blur => "Blur",
            FilterKind::Brightness => "Brightness",
        }
    }

    /// Position in [`FilterKind::ALL`]
    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|k| k == self).unwrap_or(0)
    }

    /// Filter at a picker position
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.name() == lowered)
            .ok_or_else(|| FilterError::UnknownFilter(s.to_string()))
    }
}

/// The active filter, shared between the user layer, the render loop and the
/// capture pipeline
///
/// Cloning yields another handle to the same cell.
#[derive(Debug, Clone, Default)]
pub struct FilterSelection {
    current: Arc<RwLock<FilterKind>>,
}

impl FilterSelection {
    pub fn new(kind: FilterKind) -> Self {
        Self {
            current: Arc::new(RwLock::new(kind)),
        }
    }

    /// Currently selected filter
    pub fn get(&self) -> FilterKind {
        match self.current.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Select a filter, returning the previous one
    pub fn set(&self, kind: FilterKind) -> FilterKind {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, kind)
    }
}

/// Apply a filter, producing a new frame
pub fn apply(frame: &CameraFrame, kind: FilterKind) -> FilterResult<CameraFrame> {
    if kind == FilterKind::None {
        frame.validate()?;
        return Ok(frame.clone());
    }

    let mut out = Vec::new();
    apply_into(frame, kind, &mut out)?;
    CameraFrame::new(frame.width, frame.height, out)
}

/// Apply a filter into a reusable buffer
///
/// `out` is resized to the frame's byte length before writing.
pub fn apply_into(frame: &CameraFrame, kind: FilterKind, out: &mut Vec<u8>) -> FilterResult<()> {
    frame.validate()?;

    let src = &frame.data[..];
    out.resize(src.len(), 0);

    match kind {
        FilterKind::None => out.copy_from_slice(src),
        FilterKind::Grayscale => cpu::grayscale(src, out),
        FilterKind::Sepia => cpu::sepia(src, out),
        FilterKind::Invert => cpu::invert(src, out),
        FilterKind::Brightness => cpu::brightness(src, out),
        FilterKind::Blur => cpu::box_blur(src, out, frame.width as usize, frame.height as usize),
    }
    Ok(())
}

/// Apply a filter given by name
pub fn apply_named(frame: &CameraFrame, name: &str) -> FilterResult<CameraFrame> {
    apply(frame, name.parse()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc as StdArc;

    fn gradient(width: u32, height: u32) -> CameraFrame {
        let data: Vec<u8> = (0..width * height)
            .flat_map(|i| {
                let v = (i * 37 % 256) as u8;
                [v, 255 - v, v / 2, 200]
            })
            .collect();
        CameraFrame::new(width, height, data).unwrap()
    }

    #[test]
    fn test_none_is_identity() {
        let frame = gradient(7, 5);
        assert_eq!(apply(&frame, FilterKind::None).unwrap(), frame);
    }

    #[test]
    fn test_red_frame_grayscale() {
        let frame = CameraFrame::solid(4, 4, [255, 0, 0, 255]);
        let out = apply(&frame, FilterKind::Grayscale).unwrap();
        assert!(out.pixels().unwrap().iter().all(|p| *p == [76, 76, 76, 255]));
    }

    #[test]
    fn test_invert_is_involution() {
        let frame = gradient(9, 6);
        let twice = apply(&apply(&frame, FilterKind::Invert).unwrap(), FilterKind::Invert).unwrap();
        assert_eq!(twice, frame);
    }

    #[test]
    fn test_invalid_frame_rejected() {
        let frame = CameraFrame {
            width: 3,
            height: 3,
            data: StdArc::from(vec![0u8; 10]),
            captured_at: std::time::Instant::now(),
        };
        for kind in FilterKind::ALL {
            assert!(matches!(
                apply(&frame, kind),
                Err(FilterError::InvalidFrame { .. })
            ));
        }
    }

    #[test]
    fn test_apply_into_resizes_buffer() {
        let mut out = vec![1u8; 3];
        apply_into(&gradient(4, 4), FilterKind::Sepia, &mut out).unwrap();
        assert_eq!(out.len(), 64);
        apply_into(&gradient(2, 2), FilterKind::Sepia, &mut out).unwrap();
        assert_eq!(out.len(), 16);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Sepia".parse::<FilterKind>().unwrap(), FilterKind::Sepia);
        assert_eq!(
            "vintage".parse::<FilterKind>(),
            Err(FilterError::UnknownFilter("vintage".into()))
        );
        assert!(apply_named(&gradient(2, 2), "posterize").is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&FilterKind::Brightness).unwrap();
        assert_eq!(json, "\"brightness\"");
    }

    #[test]
    fn test_selection_is_shared() {
        let selection = FilterSelection::default();
        let reader = selection.clone();
        assert_eq!(selection.set(FilterKind::Blur), FilterKind::None);
        assert_eq!(reader.get(), FilterKind::Blur);
    }

    #[test]
    fn test_index_round_trip() {
        for kind in FilterKind::ALL {
            assert_eq!(FilterKind::from_index(kind.index()), Some(kind));
        }
        assert_eq!(FilterKind::from_index(6), None);
    }
}
