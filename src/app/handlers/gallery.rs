// SPDX-License-Identifier: GPL-3.0-only

//! Gallery handlers

use crate::app::PhotoBooth;
use crate::constants::messages;
use crate::errors::{AppError, AppResult};
use crate::pipelines::photo::export_photo;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

impl PhotoBooth {
    /// Delete a saved photo
    ///
    /// Returns false when no photo has that id. A failed write leaves the
    /// library unchanged.
    pub fn delete_photo(&mut self, id: u64) -> AppResult<bool> {
        let before = self.library.clone();
        if self.library.remove(id).is_none() {
            warn!(id, "No photo with that id");
            return Ok(false);
        }

        if let Err(e) = self.store.save_all(&self.library) {
            error!(id, error = %e, "Failed to persist deletion");
            self.library = before;
            self.notifier.error(messages::DELETE_FAILED);
            return Err(e.into());
        }

        info!(id, photos = self.library.len(), "Photo deleted");
        self.notifier.success(messages::PHOTO_DELETED);
        Ok(true)
    }

    /// Write a saved photo's JPEG to `target` (file or directory)
    pub fn export_photo(&self, id: u64, target: &Path) -> AppResult<PathBuf> {
        let photo = self
            .library
            .get(id)
            .ok_or_else(|| AppError::Other(format!("No photo with id {}", id)))?;
        export_photo(photo, target)
            .map_err(|e| AppError::Storage(e.into()))
    }
}
