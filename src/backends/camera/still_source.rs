// SPDX-License-Identifier: GPL-3.0-only

//! Still image frame source
//!
//! Each loaded image behaves like a camera that keeps producing the same
//! frame. Used for `--input` on the command line and for deterministic tests.

use super::types::*;
use super::FrameSource;
use crate::constants::file_formats;
use crate::errors::AcquisitionError;
use std::path::Path;
use tracing::{debug, info};

/// One named still frame
#[derive(Debug, Clone)]
struct StillEntry {
    device: CameraDevice,
    frame: CameraFrame,
}

/// Frame source backed by still frames
#[derive(Debug, Default)]
pub struct StillImageSource {
    entries: Vec<StillEntry>,
    /// (stream id, entry index) of the active stream
    active: Option<(u64, usize)>,
    next_id: u64,
}

impl StillImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an in-memory frame as a device named `name`
    pub fn with_frame(mut self, name: impl Into<String>, frame: CameraFrame) -> Self {
        self.push_frame(name, frame);
        self
    }

    /// Add an in-memory frame as a device
    pub fn push_frame(&mut self, name: impl Into<String>, frame: CameraFrame) {
        let name = name.into();
        let device = CameraDevice {
            path: format!("still:{}", name),
            name,
            driver: Some("still".to_string()),
        };
        self.entries.push(StillEntry { device, frame });
    }

    /// Load an image file as a device
    ///
    /// The device path is the file path, so `DeviceSelector::Path` selects it.
    pub fn push_file(&mut self, path: &Path) -> BackendResult<()> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        if !file_formats::is_image_extension(ext) {
            return Err(AcquisitionError::DeviceNotFound(format!(
                "{} is not a supported image file",
                path.display()
            )));
        }

        let image = image::open(path)
            .map_err(|e| match e {
                image::ImageError::IoError(io) if io.kind() == std::io::ErrorKind::PermissionDenied => {
                    AcquisitionError::PermissionDenied(path.display().to_string())
                }
                image::ImageError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
                    AcquisitionError::DeviceNotFound(path.display().to_string())
                }
                other => AcquisitionError::StreamFailed(format!("{}: {}", path.display(), other)),
            })?
            .to_rgba8();

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        info!(path = %path.display(), width = image.width(), height = image.height(), "Loaded still image");

        self.entries.push(StillEntry {
            device: CameraDevice {
                name,
                path: path.display().to_string(),
                driver: Some("still".to_string()),
            },
            frame: CameraFrame::from_rgba_image(image),
        });
        Ok(())
    }

    /// Build a source from image files
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> BackendResult<Self> {
        let mut source = Self::new();
        for path in paths {
            source.push_file(path.as_ref())?;
        }
        Ok(source)
    }

    /// Replace the frame a device produces
    ///
    /// Returns false when `index` is out of range.
    pub fn set_frame(&mut self, index: usize, frame: CameraFrame) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.frame = frame;
                true
            }
            None => false,
        }
    }
}

impl FrameSource for StillImageSource {
    fn list_devices(&self) -> BackendResult<Vec<CameraDevice>> {
        Ok(self.entries.iter().map(|e| e.device.clone()).collect())
    }

    fn start(&mut self, selector: &DeviceSelector) -> BackendResult<StreamHandle> {
        self.active = None;

        let devices = self.list_devices()?;
        let device = selector.resolve(&devices)?.clone();
        let index = devices
            .iter()
            .position(|d| d.path == device.path)
            .ok_or_else(|| AcquisitionError::DeviceNotFound(device.path.clone()))?;

        self.next_id += 1;
        let id = self.next_id;
        self.active = Some((id, index));
        debug!(stream = id, device = %device, "Still stream started");
        Ok(StreamHandle::new(id, device))
    }

    fn stop(&mut self, handle: StreamHandle) {
        if matches!(self.active, Some((id, _)) if id == handle.id()) {
            debug!(stream = handle.id(), "Still stream stopped");
            self.active = None;
        }
    }

    fn current_frame(&self) -> Option<CameraFrame> {
        let (_, index) = self.active?;
        self.entries.get(index).map(|e| e.frame.clone())
    }

    fn is_streaming(&self) -> bool {
        self.active.is_some()
    }
}
