// SPDX-License-Identifier: GPL-3.0-only

//! Capture operation handlers
//!
//! Handles filter selection, the capture countdown, taking, retaking and
//! saving photos.

use crate::app::{Countdown, CountdownEvent, PhotoBooth};
use crate::constants::{CountdownSetting, messages};
use crate::errors::{AppError, AppResult, PhotoError};
use crate::filters::FilterKind;
use tracing::{debug, error, info};

impl PhotoBooth {
    // =========================================================================
    // Filter Handlers
    // =========================================================================

    /// Make `kind` the active filter for the live feed and any pending capture
    pub fn select_filter(&mut self, kind: FilterKind) -> AppResult<()> {
        self.notifier.info(&messages::applying_filter(kind.name()));
        let previous = self.selection.set(kind);
        info!(from = %previous, to = %kind, "Filter selected");

        if let Some(session) = self.session.as_mut()
            && let Err(e) = self.pipeline.reapply(session, kind)
        {
            error!(error = %e, "Failed to re-render capture");
            self.notifier.error(&e.to_string());
            return Err(e.into());
        }

        self.notifier.success(&messages::filter_applied(kind.display_name()));
        Ok(())
    }

    /// Select a filter by name; unknown names are rejected
    pub fn select_filter_by_name(&mut self, name: &str) -> AppResult<()> {
        let kind: FilterKind = name.parse().map_err(|e| {
            error!(name, "Unknown filter requested");
            AppError::from(e)
        })?;
        self.select_filter(kind)
    }

    // =========================================================================
    // Countdown Handlers
    // =========================================================================

    /// Begin the capture countdown
    ///
    /// Ignored (returns false) while a countdown runs or no stream is open. A
    /// zero-second countdown captures right away and returns whether the
    /// capture succeeded.
    pub fn start_countdown(&mut self) -> bool {
        if self.countdown.is_some() || self.stream.is_none() {
            debug!(
                countdown_active = self.countdown.is_some(),
                streaming = self.stream.is_some(),
                "Ignoring capture request"
            );
            return false;
        }

        let seconds = self.config.countdown_seconds;
        info!(seconds, "Starting capture countdown");
        if seconds == 0 {
            return self.take_photo().is_ok();
        }
        self.countdown = Some(Countdown::new(seconds));
        true
    }

    /// Move to the next countdown preset
    pub fn cycle_countdown(&mut self) -> CountdownSetting {
        let next = CountdownSetting::ALL
            .into_iter()
            .find(|s| s.seconds() == self.config.countdown_seconds)
            .unwrap_or_default()
            .next();
        self.config.countdown_seconds = next.seconds();
        info!(countdown = next.display_name(), "Countdown changed");
        next
    }

    /// Advance the countdown by one second
    ///
    /// Returns `None` when no countdown is running.
    pub fn countdown_tick(&mut self) -> Option<CountdownEvent> {
        let countdown = self.countdown.as_mut()?;
        match countdown.step() {
            Some(event) => {
                info!(remaining = countdown.remaining(), "Photo timer tick");
                Some(event)
            }
            None => {
                info!("Countdown complete - capturing");
                self.countdown = None;
                Some(match self.take_photo() {
                    Ok(()) => CountdownEvent::Captured,
                    Err(_) => CountdownEvent::CaptureFailed,
                })
            }
        }
    }

    /// Abort a running countdown; returns whether one was running
    pub fn cancel_countdown(&mut self) -> bool {
        let was_running = self.countdown.take().is_some();
        if was_running {
            info!("Photo timer countdown aborted");
        }
        was_running
    }

    // =========================================================================
    // Capture Handlers
    // =========================================================================

    /// Capture a still with the active filter
    ///
    /// The live loop keeps running; the still is pulled separately.
    pub fn take_photo(&mut self) -> AppResult<()> {
        if self.stream.is_none() {
            return Err(PhotoError::NoFrameAvailable.into());
        }

        match self.pipeline.capture(&self.source, self.selection.get()) {
            Ok(session) => {
                info!(
                    width = session.still().width,
                    height = session.still().height,
                    filter = %session.filter(),
                    "Photo captured"
                );
                self.session = Some(session);
                self.notifier.success(messages::PHOTO_CAPTURED);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Photo capture failed");
                self.notifier.error(messages::CAPTURE_FAILED);
                Err(e.into())
            }
        }
    }

    /// Discard the pending capture
    pub fn retake(&mut self) {
        if self.session.take().is_some() {
            info!("Capture discarded");
        }
    }

    /// Encode the pending capture and persist it to the library
    ///
    /// On a storage failure the library is restored to its previous contents
    /// and the capture stays pending so the save can be retried. Returns the
    /// new photo id.
    pub fn save_photo(&mut self) -> AppResult<u64> {
        let Some(session) = self.session.as_mut() else {
            return Err(PhotoError::NoCapture.into());
        };

        // The selection may have changed through another handle
        let kind = self.selection.get();
        self.pipeline.reapply(session, kind)?;

        let photo = self.pipeline.finalize(session)?;
        let id = photo.id;
        let evicted = self.library.insert(photo);

        if let Err(e) = self.store.save_all(&self.library) {
            error!(id, error = %e, "Failed to persist photo library");
            self.library.rollback_insert(id, evicted);
            self.notifier.error(messages::SAVE_FAILED);
            return Err(e.into());
        }

        info!(id, filter = %kind, photos = self.library.len(), evicted = evicted.len(), "Photo saved");
        self.session = None;
        self.notifier.success(messages::PHOTO_SAVED);
        Ok(id)
    }
}
