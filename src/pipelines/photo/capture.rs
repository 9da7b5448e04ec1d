// SPDX-License-Identifier: GPL-3.0-only

//! Still capture from a frame source
//!
//! The still is pulled straight from the source, independent of the render
//! loop, and kept at native resolution and unfiltered.

use crate::backends::camera::{CameraFrame, SharedSource, lock_source};
use crate::errors::PhotoError;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Photo capture handler
pub struct PhotoCapture;

impl PhotoCapture {
    /// Take the source's current frame as a raw still
    pub fn capture(source: &SharedSource) -> Result<CameraFrame, PhotoError> {
        let frame = lock_source(source)
            .current_frame()
            .ok_or(PhotoError::NoFrameAvailable)?;
        frame.validate()?;

        info!(width = frame.width, height = frame.height, "Captured still frame");
        Ok(frame)
    }

    /// Capture, waiting up to `timeout` for a freshly started stream's first frame
    pub fn capture_with_timeout(
        source: &SharedSource,
        timeout: Duration,
    ) -> Result<CameraFrame, PhotoError> {
        let deadline = Instant::now() + timeout;
        loop {
            match Self::capture(source) {
                Err(PhotoError::NoFrameAvailable) if Instant::now() < deadline => {
                    debug!("Waiting for first frame");
                    std::thread::sleep(Duration::from_millis(20));
                }
                result => return result,
            }
        }
    }
}
