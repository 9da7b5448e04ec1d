// SPDX-License-Identifier: GPL-3.0-only

//! Frame source abstraction
//!
//! ```text
//! ┌─────────────────────┐      ┌─────────────────────┐
//! │     RenderLoop      │      │   Capture pipeline  │
//! └──────────┬──────────┘      └──────────┬──────────┘
//!            │  current_frame()           │  current_frame()
//!            ▼                            ▼
//! ┌───────────────────────────────────────────────────┐
//! │              FrameSource trait                    │
//! └──────────┬───────────────────────────┬────────────┘
//!            ▼                           ▼
//!      ┌──────────┐              ┌──────────────────┐
//!      │  V4L2    │              │ Still image files │
//!      └──────────┘              └──────────────────┘
//! ```
//!
//! The source exclusively owns the camera stream. The render loop and the
//! capture pipeline only ever pull the latest frame.

pub mod format_converters;
pub mod still_source;
pub mod types;
pub mod v4l2;

pub use still_source::StillImageSource;
pub use types::*;
pub use v4l2::V4l2Source;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

/// Frame source trait
///
/// All sources provide:
/// - Device enumeration
/// - Exclusive stream lifecycle (start/stop)
/// - Non-blocking access to the most recent frame
pub trait FrameSource: Send {
    /// Enumerate available devices
    fn list_devices(&self) -> BackendResult<Vec<CameraDevice>>;

    /// Open a device and start streaming
    ///
    /// A source streams from at most one device. Starting while a stream is
    /// active fully stops the old stream before the new device is opened.
    fn start(&mut self, selector: &DeviceSelector) -> BackendResult<StreamHandle>;

    /// Stop a stream and release the device
    ///
    /// Handles from an earlier stream are ignored.
    fn stop(&mut self, handle: StreamHandle);

    /// Latest frame, or `None` when nothing is available yet
    fn current_frame(&self) -> Option<CameraFrame>;

    /// Whether a stream is currently active
    fn is_streaming(&self) -> bool;
}

/// A frame source shared between the render loop, the capture pipeline and
/// the booth controller
pub type SharedSource = Arc<Mutex<dyn FrameSource>>;

/// Wrap a source for sharing
pub fn share<S: FrameSource + 'static>(source: S) -> SharedSource {
    Arc::new(Mutex::new(source))
}

/// Lock a shared source
///
/// A panic while holding the lock leaves the source itself intact (every
/// method either completes or does nothing), so a poisoned lock is recovered.
pub fn lock_source(source: &SharedSource) -> MutexGuard<'_, dyn FrameSource + 'static> {
    source.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Pick the frame source for a run
///
/// With image paths the booth streams from those files, one device per file.
/// Otherwise V4L2 cameras are used at the requested resolution.
pub fn open_source(inputs: &[PathBuf], ideal_width: u32, ideal_height: u32) -> BackendResult<SharedSource> {
    if inputs.is_empty() {
        Ok(share(V4l2Source::new(ideal_width, ideal_height)))
    } else {
        Ok(share(StillImageSource::from_paths(inputs)?))
    }
}
