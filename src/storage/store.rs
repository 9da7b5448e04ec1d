// SPDX-License-Identifier: GPL-3.0-only

//! Persistence backends for the photo library

use super::{CapturedPhoto, PhotoLibrary};
use crate::constants::library;
use crate::errors::{StorageError, StorageResult};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Durable storage for the photo library
pub trait PhotoStore: Send {
    /// Load the stored library
    ///
    /// Never fails: an unreadable store yields an empty library and logs why.
    fn load_all(&self) -> PhotoLibrary;

    /// Replace the stored library
    ///
    /// On error the previous stored contents are left intact.
    fn save_all(&mut self, library: &PhotoLibrary) -> StorageResult<()>;
}

/// Parse a serialized record list
///
/// Records that do not parse (e.g. a filter name this build does not know) are
/// skipped individually instead of discarding the whole library.
fn parse_records(contents: &str, capacity: usize) -> StorageResult<PhotoLibrary> {
    let values: Vec<serde_json::Value> = serde_json::from_str(contents)?;
    let total = values.len();

    let mut photos: Vec<CapturedPhoto> = values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<CapturedPhoto>(value) {
            Ok(photo) => Some(photo),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable photo record");
                None
            }
        })
        .collect();

    // Newest first, whatever order the file had
    photos.sort_by(|a, b| b.id.cmp(&a.id));
    debug!(loaded = photos.len(), total, "Parsed photo records");
    Ok(PhotoLibrary::from_photos(photos, capacity))
}

fn serialize_records(library: &PhotoLibrary) -> StorageResult<String> {
    Ok(serde_json::to_string(library.photos())?)
}

fn check_quota(len: usize, quota: Option<usize>) -> StorageResult<()> {
    match quota {
        Some(limit) if len > limit => Err(StorageError::QuotaExceeded {
            required: len,
            limit,
        }),
        _ => Ok(()),
    }
}

/// Library stored as a JSON array in one file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    capacity: usize,
    /// Maximum serialized size in bytes
    quota: Option<usize>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            capacity: library::CAPACITY,
            quota: None,
        }
    }

    /// Default location under the platform data directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join(crate::constants::APP_DIR_NAME).join(library::FILE_NAME))
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota = Some(quota_bytes);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> StorageResult<PhotoLibrary> {
        if !self.path.exists() {
            return Ok(PhotoLibrary::new(self.capacity));
        }
        let contents = std::fs::read_to_string(&self.path)?;
        parse_records(&contents, self.capacity)
    }
}

impl PhotoStore for JsonFileStore {
    fn load_all(&self) -> PhotoLibrary {
        match self.read() {
            Ok(library) => {
                info!(path = %self.path.display(), photos = library.len(), "Loaded photo library");
                library
            }
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "Failed to load photo library");
                PhotoLibrary::new(self.capacity)
            }
        }
    }

    fn save_all(&mut self, library: &PhotoLibrary) -> StorageResult<()> {
        let json = serialize_records(library)?;
        check_quota(json.len(), self.quota)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Write then rename so a failed write never truncates the library
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json)?;
        if let Err(e) = std::fs::rename(&tmp_path, &self.path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        debug!(path = %self.path.display(), bytes = json.len(), photos = library.len(), "Saved photo library");
        Ok(())
    }
}

/// In-memory store holding the serialized library
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    contents: Option<String>,
    capacity: Option<usize>,
    quota: Option<usize>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store refusing payloads larger than `quota_bytes`
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota: Some(quota_bytes),
            ..Self::default()
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Seed with raw JSON, as if written by an earlier session
    pub fn with_contents(mut self, json: impl Into<String>) -> Self {
        self.contents = Some(json.into());
        self
    }

    /// Change the quota, e.g. after the user frees space
    pub fn set_quota(&mut self, quota_bytes: Option<usize>) {
        self.quota = quota_bytes;
    }

    /// Serialized library, if anything was saved
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl PhotoStore for MemoryStore {
    fn load_all(&self) -> PhotoLibrary {
        let capacity = self.capacity.unwrap_or(library::CAPACITY);
        let Some(contents) = &self.contents else {
            return PhotoLibrary::new(capacity);
        };
        parse_records(contents, capacity).unwrap_or_else(|e| {
            error!(error = %e, "Failed to load in-memory photo library");
            PhotoLibrary::new(capacity)
        })
    }

    fn save_all(&mut self, library: &PhotoLibrary) -> StorageResult<()> {
        let json = serialize_records(library)?;
        check_quota(json.len(), self.quota)?;
        self.contents = Some(json);
        self.saves += 1;
        Ok(())
    }
}
