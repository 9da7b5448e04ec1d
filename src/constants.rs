// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Directory name used under the platform config and data directories
pub const APP_DIR_NAME: &str = "photo-booth";

/// Photo countdown presets
///
/// The countdown runs before a still is taken; the flash cue fires one
/// second before capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownSetting {
    /// Capture immediately
    Off,
    /// 3 second countdown
    Three,
    /// 5 second countdown (default)
    #[default]
    Five,
    /// 10 second countdown
    Ten,
}

impl CountdownSetting {
    /// Get all countdown variants for UI iteration
    pub const ALL: [CountdownSetting; 4] = [
        CountdownSetting::Off,
        CountdownSetting::Three,
        CountdownSetting::Five,
        CountdownSetting::Ten,
    ];

    /// Countdown length in seconds
    pub fn seconds(&self) -> u32 {
        match self {
            CountdownSetting::Off => 0,
            CountdownSetting::Three => 3,
            CountdownSetting::Five => 5,
            CountdownSetting::Ten => 10,
        }
    }

    /// Get display name for the setting
    pub fn display_name(&self) -> &'static str {
        match self {
            CountdownSetting::Off => "Off",
            CountdownSetting::Three => "3s",
            CountdownSetting::Five => "5s",
            CountdownSetting::Ten => "10s",
        }
    }

    /// Cycle to the next setting: Off -> 3s -> 5s -> 10s -> Off
    pub fn next(self) -> Self {
        match self {
            CountdownSetting::Off => CountdownSetting::Three,
            CountdownSetting::Three => CountdownSetting::Five,
            CountdownSetting::Five => CountdownSetting::Ten,
            CountdownSetting::Ten => CountdownSetting::Off,
        }
    }
}

/// Photo library limits
pub mod library {
    /// Maximum number of photos kept; older entries are evicted
    pub const CAPACITY: usize = 50;

    /// Persisted library file name
    pub const FILE_NAME: &str = "photos.json";

    /// Prefix for generated photo file names
    pub const FILENAME_PREFIX: &str = "photo_";
}

/// Capture and preview settings
pub mod capture {
    /// Preview bounding box (the still is scaled down to fit)
    pub const PREVIEW_MAX_WIDTH: u32 = 600;
    pub const PREVIEW_MAX_HEIGHT: u32 = 400;

    /// JPEG quality for saved photos (0-100)
    pub const JPEG_QUALITY: u8 = 80;

    /// Ideal resolution requested from the camera
    pub const IDEAL_WIDTH: u32 = 1280;
    pub const IDEAL_HEIGHT: u32 = 720;

    /// Seconds remaining at which the flash cue fires
    pub const FLASH_AT_SECONDS: u32 = 1;
}

/// Filter engine coefficients
pub mod filters {
    /// ITU-R BT.601 luma weights (R, G, B)
    pub const LUMA_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];

    /// Sepia tone matrix, one row per output channel
    pub const SEPIA_MATRIX: [[f64; 3]; 3] = [
        [0.393, 0.769, 0.189],
        [0.349, 0.686, 0.168],
        [0.272, 0.534, 0.131],
    ];

    /// Multiplicative gain of the brightness filter
    pub const BRIGHTNESS_GAIN: f64 = 1.3;

    /// Box blur radius (window is 2 * radius + 1 on each side)
    pub const BLUR_RADIUS: usize = 2;
}

/// Render loop and stream timing
pub mod timing {
    use super::Duration;

    /// Display refresh interval (~60Hz)
    pub const REFRESH_INTERVAL: Duration = Duration::from_millis(16);

    /// Countdown step
    pub const COUNTDOWN_STEP: Duration = Duration::from_secs(1);

    /// Time to let auto-exposure settle before a CLI capture
    pub const CAMERA_WARMUP: Duration = Duration::from_millis(500);

    /// Maximum wait for the first frame from a freshly started stream
    pub const FIRST_FRAME_TIMEOUT: Duration = Duration::from_secs(5);

    /// Log frame statistics every N frames
    pub const FRAME_LOG_INTERVAL: u64 = 60;

    /// Number of mmap buffers requested from V4L2
    pub const STREAM_BUFFER_COUNT: u32 = 4;
}

/// User-facing notification texts
pub mod messages {
    pub const PHOTO_CAPTURED: &str = "Photo captured successfully!";
    pub const CAPTURE_FAILED: &str = "Failed to capture photo.";
    pub const PHOTO_SAVED: &str = "Photo saved successfully!";
    pub const SAVE_FAILED: &str = "Failed to save photo. Storage might be full.";
    pub const PHOTO_DELETED: &str = "Photo deleted successfully!";
    pub const DELETE_FAILED: &str = "Failed to delete photo.";
    pub const MIRROR_ON: &str = "Mirror mode activated!";
    pub const MIRROR_OFF: &str = "Normal mode activated!";
    pub const ACCESS_DENIED: &str = "Camera access denied. Please allow camera permissions.";
    pub const NO_CAMERA: &str = "No camera found.";
    pub const CAMERA_FAILED: &str = "Failed to start camera.";
    pub const SWITCH_FAILED: &str = "Failed to switch camera.";
    pub const NO_OTHER_CAMERA: &str = "No additional cameras found.";

    /// Shown while a filter is being applied
    pub fn applying_filter(name: &str) -> String {
        format!("Applying {} filter...", name)
    }

    /// Shown once a filter is active
    pub fn filter_applied(display_name: &str) -> String {
        format!("{} filter applied", display_name)
    }
}

/// Supported file formats for still image sources
pub mod file_formats {
    /// Supported image file extensions
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

    /// Check if a file extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }
}
