// SPDX-License-Identifier: GPL-3.0-only

//! Camera control handlers
//!
//! Handles stream start, camera switching, mirror mode, host visibility
//! changes and shutdown.

use crate::app::PhotoBooth;
use crate::backends::camera::{DeviceSelector, lock_source};
use crate::constants::messages;
use crate::errors::{AcquisitionError, AppResult};
use tracing::{debug, error, info, warn};

impl PhotoBooth {
    // =========================================================================
    // Camera Control Handlers
    // =========================================================================

    /// Open a camera and start the live loop
    ///
    /// Any active stream is released first.
    pub fn start_camera(&mut self, selector: &DeviceSelector) -> AppResult<()> {
        self.render.stop();
        self.release_stream();

        let started = lock_source(&self.source).start(selector);
        match started {
            Ok(handle) => {
                info!(device = %handle.device(), "Camera started");
                self.config.last_camera_path = Some(handle.device().path.clone());
                self.stream = Some(handle);
                if !self.suspended {
                    self.render.start();
                }
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to start camera");
                self.notifier.error(acquisition_message(&e, messages::CAMERA_FAILED));
                Err(e.into())
            }
        }
    }

    /// Open the camera a run should start with
    ///
    /// An explicit selector wins. Otherwise the last used camera is reopened
    /// when it is still present, falling back to the first device.
    pub fn start_preferred_camera(&mut self, explicit: Option<DeviceSelector>) -> AppResult<()> {
        let selector = match explicit {
            Some(selector) => selector,
            None => self.remembered_camera().unwrap_or_default(),
        };
        self.start_camera(&selector)
    }

    fn remembered_camera(&self) -> Option<DeviceSelector> {
        let path = self.config.last_camera_path.as_ref()?;
        let devices = lock_source(&self.source).list_devices().ok()?;
        if devices.iter().any(|d| &d.path == path) {
            debug!(path, "Reopening last used camera");
            Some(DeviceSelector::Path(path.clone()))
        } else {
            debug!(path, "Last used camera is gone");
            None
        }
    }

    /// Switch to the next camera
    ///
    /// The current stream is fully stopped before the next device is opened.
    /// With fewer than two cameras the previous one is reopened.
    pub fn switch_camera(&mut self) -> AppResult<()> {
        let Some(current) = self.stream.as_ref().map(|s| s.device().clone()) else {
            return Ok(());
        };
        info!(current = %current, "Switching camera");

        self.render.stop();
        self.release_stream();

        let devices = lock_source(&self.source).list_devices();
        let devices = match devices {
            Ok(devices) => devices,
            Err(e) => {
                error!(error = %e, "Camera enumeration failed during switch");
                self.notifier.error(messages::SWITCH_FAILED);
                self.reopen(&current.path);
                return Err(e.into());
            }
        };

        if devices.len() < 2 {
            info!("Only one camera available, cannot switch");
            self.notifier.error(messages::NO_OTHER_CAMERA);
            self.reopen(&current.path);
            return Err(AcquisitionError::DeviceNotFound(messages::NO_OTHER_CAMERA.to_string()).into());
        }

        let next = devices
            .iter()
            .find(|d| d.path != current.path)
            .unwrap_or(&devices[0])
            .clone();

        let started = lock_source(&self.source).start(&DeviceSelector::Path(next.path.clone()));
        match started {
            Ok(handle) => {
                info!(device = %handle.device(), "Switched camera");
                self.config.last_camera_path = Some(handle.device().path.clone());
                self.stream = Some(handle);
                if !self.suspended {
                    self.render.start();
                }
                Ok(())
            }
            Err(e) => {
                error!(device = %next, error = %e, "Failed to switch camera");
                self.notifier.error(acquisition_message(&e, messages::SWITCH_FAILED));
                self.reopen(&current.path);
                Err(e.into())
            }
        }
    }

    /// Try to get the previous camera back after a failed switch
    fn reopen(&mut self, path: &str) {
        let started = lock_source(&self.source).start(&DeviceSelector::Path(path.to_string()));
        match started {
            Ok(handle) => {
                self.stream = Some(handle);
                if !self.suspended {
                    self.render.start();
                }
            }
            Err(e) => warn!(path, error = %e, "Could not reopen previous camera"),
        }
    }

    /// Flip mirror mode for the live feed; returns the new state
    pub fn toggle_mirror(&mut self) -> bool {
        let mirrored = !self.render.is_mirrored();
        self.render.set_mirrored(mirrored);
        self.config.mirror_preview = mirrored;
        info!(mirror_preview = mirrored, "Mirror preview toggled");

        self.notifier.success(if mirrored {
            messages::MIRROR_ON
        } else {
            messages::MIRROR_OFF
        });
        mirrored
    }

    /// The host view became hidden: pause rendering, keep the stream
    pub fn suspend(&mut self) {
        if self.suspended {
            return;
        }
        info!("Suspending live view");
        self.suspended = true;
        self.render.stop();
    }

    /// The host view became visible again
    pub fn resume(&mut self) {
        if !self.suspended {
            return;
        }
        info!("Resuming live view");
        self.suspended = false;
        if self.stream.is_some() {
            self.render.start();
        }
    }

    /// Stop the loop and release the camera
    pub fn shutdown(&mut self) {
        self.countdown = None;
        self.render.stop();
        if self.stream.is_some() {
            info!("Shutting down camera");
        }
        self.release_stream();
    }

    pub(crate) fn release_stream(&mut self) {
        if let Some(handle) = self.stream.take() {
            lock_source(&self.source).stop(handle);
            self.surface.clear();
        }
    }
}

/// Notification text for an acquisition failure
fn acquisition_message(err: &AcquisitionError, fallback: &'static str) -> &'static str {
    match err {
        AcquisitionError::PermissionDenied(_) => messages::ACCESS_DENIED,
        AcquisitionError::NoCameraFound => messages::NO_CAMERA,
        _ => fallback,
    }
}
