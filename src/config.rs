// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Stored as JSON under the platform config directory. Missing fields take
//! their defaults, so older files keep loading after new settings are added.

use crate::constants::{APP_DIR_NAME, capture, library};
use crate::errors::{AppError, AppResult};
use crate::filters::FilterKind;
use crate::storage::{JsonFileStore, MemoryStore, PhotoStore};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Config file name inside the app config directory
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Mirror camera preview horizontally (selfie mode)
    pub mirror_preview: bool,
    /// Last used camera device path
    pub last_camera_path: Option<String>,
    /// Filter selected at startup
    pub default_filter: FilterKind,
    /// Captured preview bounding box
    pub preview_max_width: u32,
    pub preview_max_height: u32,
    /// JPEG quality for saved photos (1-100)
    pub jpeg_quality: u8,
    /// Countdown before capture, in seconds (0 captures immediately)
    pub countdown_seconds: u32,
    /// Maximum number of photos kept in the library
    pub library_capacity: usize,
    /// Library file; `None` uses the platform data directory
    pub library_path: Option<PathBuf>,
    /// Resolution requested from cameras
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mirror_preview: true, // Default to mirrored (selfie mode)
            last_camera_path: None,
            default_filter: FilterKind::None,
            preview_max_width: capture::PREVIEW_MAX_WIDTH,
            preview_max_height: capture::PREVIEW_MAX_HEIGHT,
            jpeg_quality: capture::JPEG_QUALITY,
            countdown_seconds: crate::constants::CountdownSetting::default().seconds(),
            library_capacity: library::CAPACITY,
            library_path: None,
            ideal_width: capture::IDEAL_WIDTH,
            ideal_height: capture::IDEAL_HEIGHT,
        }
    }
}

impl Config {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Library file location, falling back to the platform data directory
    pub fn resolved_library_path(&self) -> Option<PathBuf> {
        self.library_path
            .clone()
            .or_else(JsonFileStore::default_path)
    }

    /// Open the photo store for this configuration
    ///
    /// Without any usable data directory the library lives in memory only.
    pub fn library_store(&self) -> Box<dyn PhotoStore> {
        match self.resolved_library_path() {
            Some(path) => Box::new(JsonFileStore::new(path).with_capacity(self.library_capacity)),
            None => {
                warn!("No data directory available, photos will not be kept");
                Box::new(MemoryStore::new().with_capacity(self.library_capacity))
            }
        }
    }

    /// Load from `path`
    ///
    /// A missing file yields defaults. An unreadable or malformed file is
    /// logged and also yields defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Self::default();
        }

        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|contents| serde_json::from_str::<Config>(&contents).map_err(|e| e.to_string()));

        match parsed {
            Ok(config) => config.sanitized(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Load from the default location
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                warn!("No config directory available, using defaults");
                Self::default()
            }
        }
    }

    /// Save to `path` atomically (write .tmp then rename)
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Config(format!("Failed to create {}: {}", parent.display(), e)))?;
        }

        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json)
            .and_then(|_| std::fs::rename(&tmp_path, path))
            .map_err(|e| AppError::Config(format!("Failed to write {}: {}", path.display(), e)))?;

        debug!(path = %path.display(), "Saved config");
        Ok(())
    }

    /// Save to the default location
    pub fn save(&self) -> AppResult<()> {
        let path = Self::default_path()
            .ok_or_else(|| AppError::Config("No config directory available".to_string()))?;
        self.save_to(&path)
    }

    /// Clamp values a hand-edited file may have put out of range
    fn sanitized(mut self) -> Self {
        self.jpeg_quality = self.jpeg_quality.clamp(1, 100);
        self.library_capacity = self.library_capacity.max(1);
        self.preview_max_width = self.preview_max_width.max(1);
        self.preview_max_height = self.preview_max_height.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_fields_take_defaults() {
        let config: Config = serde_json::from_str(r#"{"mirror_preview": false}"#).unwrap();
        assert!(!config.mirror_preview);
        assert_eq!(config.jpeg_quality, 80);
        assert_eq!(config.library_capacity, 50);
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"jpeg_quality": 0, "library_capacity": 0}"#).unwrap();
        let config = Config::load_from(&path);
        assert_eq!(config.jpeg_quality, 1);
        assert_eq!(config.library_capacity, 1);
    }

    #[test]
    fn library_store_uses_configured_path() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            library_path: Some(dir.path().join("photos.json")),
            library_capacity: 3,
            ..Config::default()
        };
        let library = config.library_store().load_all();
        assert!(library.is_empty());
        assert_eq!(library.capacity(), 3);
    }
}
