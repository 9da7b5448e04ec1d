// SPDX-License-Identifier: GPL-3.0-only

//! Live camera capture through V4L2
//!
//! The device is opened and its format negotiated on the caller's thread so
//! that open failures surface from `start`. Buffers are then dequeued on a
//! dedicated capture thread which converts each one to RGBA and publishes it
//! to a single latest-frame slot. Older frames are simply overwritten.

use super::format_converters::NativeFormat;
use super::types::*;
use super::FrameSource;
use crate::constants::timing;
use crate::errors::AcquisitionError;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use v4l::buffer::Type;
use v4l::capability::Flags;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::FourCC;

/// Latest decoded frame, shared with the capture thread
type FrameSlot = Arc<Mutex<Option<CameraFrame>>>;

/// Map an OS error from opening or configuring a device
fn map_open_error(path: &str, err: io::Error) -> AcquisitionError {
    match err.kind() {
        io::ErrorKind::PermissionDenied => {
            AcquisitionError::PermissionDenied(format!("{}: {}", path, err))
        }
        io::ErrorKind::NotFound => AcquisitionError::DeviceNotFound(path.to_string()),
        _ => AcquisitionError::StreamFailed(format!("{}: {}", path, err)),
    }
}

/// A running capture thread
struct ActiveStream {
    id: u64,
    running: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl ActiveStream {
    fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            match handle.join() {
                Ok(_) => info!(stream = self.id, "Capture thread stopped"),
                Err(_) => warn!(stream = self.id, "Capture thread panicked"),
            }
        }
    }
}

/// V4L2 camera source
pub struct V4l2Source {
    ideal_width: u32,
    ideal_height: u32,
    latest: FrameSlot,
    active: Option<ActiveStream>,
    next_id: u64,
}

impl V4l2Source {
    /// Create a source that requests the given resolution from devices
    pub fn new(ideal_width: u32, ideal_height: u32) -> Self {
        Self {
            ideal_width,
            ideal_height,
            latest: Arc::new(Mutex::new(None)),
            active: None,
            next_id: 1,
        }
    }

    fn stop_active(&mut self) {
        if let Some(mut active) = self.active.take() {
            info!(stream = active.id, "Stopping V4L2 stream");
            active.shutdown();
        }
        if let Ok(mut slot) = self.latest.lock() {
            *slot = None;
        }
    }

    /// Negotiate the first preferred format the device accepts
    fn negotiate_format(&self, dev: &mut Device) -> BackendResult<(NativeFormat, u32, u32)> {
        for native in NativeFormat::PREFERRED {
            let fourcc = FourCC::new(&native.fourcc());
            let requested = v4l::Format::new(self.ideal_width, self.ideal_height, fourcc);
            match dev.set_format(&requested) {
                Ok(actual) if actual.fourcc == fourcc => {
                    info!(
                        width = actual.width,
                        height = actual.height,
                        fourcc = ?actual.fourcc,
                        "Set V4L2 format"
                    );
                    return Ok((native, actual.width, actual.height));
                }
                Ok(actual) => {
                    debug!(requested = ?fourcc, got = ?actual.fourcc, "Format not accepted");
                }
                Err(e) => {
                    debug!(requested = ?fourcc, error = %e, "Could not set format");
                }
            }
        }

        // Fall back to whatever the device is already producing
        let current = dev
            .format()
            .map_err(|e| AcquisitionError::StreamFailed(format!("Failed to query format: {}", e)))?;
        match NativeFormat::from_fourcc(&current.fourcc.repr) {
            Some(native) => {
                warn!(fourcc = ?current.fourcc, "Using current device format");
                Ok((native, current.width, current.height))
            }
            None => Err(AcquisitionError::StreamFailed(format!(
                "no supported pixel format (device offers {})",
                current.fourcc
            ))),
        }
    }
}

impl Default for V4l2Source {
    fn default() -> Self {
        Self::new(
            crate::constants::capture::IDEAL_WIDTH,
            crate::constants::capture::IDEAL_HEIGHT,
        )
    }
}

impl FrameSource for V4l2Source {
    fn list_devices(&self) -> BackendResult<Vec<CameraDevice>> {
        // enum_devices() reports an unreadable /dev as an empty list
        std::fs::read_dir("/dev")
            .map_err(|e| AcquisitionError::EnumerationFailed(format!("/dev: {}", e)))?;

        let mut devices = Vec::new();
        for node in v4l::context::enum_devices() {
            let path = node.path().to_string_lossy().to_string();
            let dev = match Device::with_path(&path) {
                Ok(dev) => dev,
                Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                    // Still listed so that start() can report the denial
                    devices.push(CameraDevice {
                        name: node.name().unwrap_or_else(|| path.clone()),
                        path,
                        driver: None,
                    });
                    continue;
                }
                Err(e) => {
                    debug!(path = %path, error = %e, "Skipping unopenable node");
                    continue;
                }
            };

            let caps = match dev.query_caps() {
                Ok(caps) => caps,
                Err(e) => {
                    debug!(path = %path, error = %e, "Failed to query capabilities");
                    continue;
                }
            };

            // Metadata and output nodes share the /dev/video namespace
            if !caps.capabilities.contains(Flags::VIDEO_CAPTURE) {
                continue;
            }

            debug!(path = %path, card = %caps.card, driver = %caps.driver, "Found capture device");
            devices.push(CameraDevice {
                name: caps.card,
                path,
                driver: Some(caps.driver),
            });
        }

        devices.sort_by(|a, b| a.path.cmp(&b.path));
        info!(count = devices.len(), "Enumerated V4L2 devices");
        Ok(devices)
    }

    fn start(&mut self, selector: &DeviceSelector) -> BackendResult<StreamHandle> {
        // Exclusive ownership: the old stream is released before anything new is opened
        self.stop_active();

        let devices = self.list_devices()?;
        let device = selector.resolve(&devices)?.clone();

        info!(device = %device, "Opening V4L2 device");
        let mut dev = Device::with_path(&device.path).map_err(|e| map_open_error(&device.path, e))?;
        let (native, width, height) = self.negotiate_format(&mut dev)?;

        let id = self.next_id;
        self.next_id += 1;

        let running = Arc::new(AtomicBool::new(true));
        let running_clone = Arc::clone(&running);
        let slot = Arc::clone(&self.latest);
        let (ready_tx, ready_rx) = mpsc::channel();
        let device_path = device.path.clone();

        let thread_handle = std::thread::Builder::new()
            .name(format!("v4l2-capture-{}", id))
            .spawn(move || {
                capture_loop(
                    dev,
                    &device_path,
                    native,
                    width,
                    height,
                    slot,
                    running_clone,
                    ready_tx,
                )
            })
            .map_err(|e| AcquisitionError::StreamFailed(format!("Failed to spawn capture thread: {}", e)))?;

        let mut active = ActiveStream {
            id,
            running,
            thread_handle: Some(thread_handle),
        };

        match ready_rx.recv_timeout(timing::FIRST_FRAME_TIMEOUT) {
            Ok(Ok(())) => {}
            Ok(Err(msg)) => {
                active.shutdown();
                return Err(AcquisitionError::StreamFailed(msg));
            }
            Err(_) => {
                active.shutdown();
                return Err(AcquisitionError::StreamFailed(
                    "capture thread did not start".to_string(),
                ));
            }
        }

        info!(stream = id, device = %device, ?native, width, height, "V4L2 stream started");
        self.active = Some(active);
        Ok(StreamHandle::new(id, device))
    }

    fn stop(&mut self, handle: StreamHandle) {
        match &self.active {
            Some(active) if active.id == handle.id() => self.stop_active(),
            _ => debug!(stream = handle.id(), "Ignoring stop for inactive stream"),
        }
    }

    fn current_frame(&self) -> Option<CameraFrame> {
        self.latest.lock().ok().and_then(|slot| slot.clone())
    }

    fn is_streaming(&self) -> bool {
        self.active.is_some()
    }
}

impl Drop for V4l2Source {
    fn drop(&mut self) {
        self.stop_active();
    }
}

/// Capture thread body
///
/// Reports readiness (or the stream setup error) once through `ready`, then
/// dequeues buffers until `running` is cleared.
#[allow(clippy::too_many_arguments)]
fn capture_loop(
    dev: Device,
    device_path: &str,
    native: NativeFormat,
    width: u32,
    height: u32,
    slot: FrameSlot,
    running: Arc<AtomicBool>,
    ready: mpsc::Sender<Result<(), String>>,
) {
    static FRAME_COUNTER: AtomicU64 = AtomicU64::new(0);

    let mut stream =
        match MmapStream::with_buffers(&dev, Type::VideoCapture, timing::STREAM_BUFFER_COUNT) {
            Ok(stream) => stream,
            Err(e) => {
                error!(device_path, error = %e, "Failed to create buffer stream");
                let _ = ready.send(Err(format!("Failed to create buffer stream: {}", e)));
                return;
            }
        };
    let _ = ready.send(Ok(()));

    while running.load(Ordering::SeqCst) {
        let frame_start = Instant::now();

        match stream.next() {
            Ok((buf, meta)) => {
                let frame_num = FRAME_COUNTER.fetch_add(1, Ordering::Relaxed);
                let used = (meta.bytesused as usize).min(buf.len());
                let payload = if used > 0 { &buf[..used] } else { buf };

                let frame = native
                    .to_rgba(payload, width, height)
                    .and_then(|(w, h, rgba)| CameraFrame::new(w, h, rgba).map_err(|e| e.to_string()));

                match frame {
                    Ok(frame) => {
                        if let Ok(mut latest) = slot.lock() {
                            *latest = Some(frame);
                        }
                        if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                            debug!(
                                frame = frame_num,
                                sequence = meta.sequence,
                                size = used,
                                elapsed_us = frame_start.elapsed().as_micros(),
                                "Frame captured"
                            );
                        }
                    }
                    Err(e) => {
                        if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                            warn!(frame = frame_num, error = %e, "Dropping undecodable frame");
                        }
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to capture frame");
                std::thread::sleep(Duration::from_millis(10));
            }
        }
    }

    info!(device_path, "V4L2 capture loop ended");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_error_mapping() {
        let err = map_open_error(
            "/dev/video0",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, AcquisitionError::PermissionDenied(_)));

        let err = map_open_error("/dev/video9", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(err, AcquisitionError::DeviceNotFound("/dev/video9".into()));
    }

    #[test]
    fn test_new_source_is_idle() {
        let source = V4l2Source::new(640, 480);
        assert!(!source.is_streaming());
        assert!(source.current_frame().is_none());
    }
}
