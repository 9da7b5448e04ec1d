// SPDX-License-Identifier: GPL-3.0-only

//! Display surfaces the render loop presents into

use crate::backends::camera::{BYTES_PER_PIXEL, CameraFrame};
use std::sync::{Arc, Mutex};

/// Receives rendered frames
pub trait DisplaySurface: Send {
    /// Show one frame of tightly packed RGBA pixels
    fn present(&mut self, width: u32, height: u32, rgba: &[u8]);
}

/// Flip an RGBA buffer horizontally in place
pub fn mirror_horizontal(rgba: &mut [u8], width: u32) {
    let row_len = width as usize * BYTES_PER_PIXEL;
    if row_len == 0 {
        return;
    }
    for row in rgba.chunks_exact_mut(row_len) {
        let (mut left, mut right) = (0, width as usize - 1);
        while left < right {
            for c in 0..BYTES_PER_PIXEL {
                row.swap(left * BYTES_PER_PIXEL + c, right * BYTES_PER_PIXEL + c);
            }
            left += 1;
            right -= 1;
        }
    }
}

#[derive(Debug, Default)]
struct SurfaceState {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    presented: u64,
}

/// Surface that keeps the last presented frame for another thread to read
///
/// Cloning yields another handle to the same surface. The pixel buffer is
/// reused across frames.
#[derive(Debug, Clone, Default)]
pub struct SharedSurface {
    state: Arc<Mutex<SurfaceState>>,
}

impl SharedSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the last presented frame
    pub fn latest(&self) -> Option<CameraFrame> {
        let state = self.state.lock().ok()?;
        if state.presented == 0 {
            return None;
        }
        CameraFrame::new(state.width, state.height, state.pixels.clone()).ok()
    }

    /// Number of frames presented so far
    pub fn presented_count(&self) -> u64 {
        self.state.lock().map(|s| s.presented).unwrap_or(0)
    }

    /// Forget the last frame (e.g. when the stream stops)
    pub fn clear(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.presented = 0;
            state.pixels.clear();
        }
    }
}

impl DisplaySurface for SharedSurface {
    fn present(&mut self, width: u32, height: u32, rgba: &[u8]) {
        if let Ok(mut state) = self.state.lock() {
            state.width = width;
            state.height = height;
            state.pixels.clear();
            state.pixels.extend_from_slice(rgba);
            state.presented += 1;
        }
    }
}
