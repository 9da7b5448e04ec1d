// SPDX-License-Identifier: GPL-3.0-only

//! Live render loop
//!
//! Each tick pulls the latest frame from the source, runs the filter engine
//! with the currently selected filter, optionally mirrors the result and
//! presents it. The loop moves between `Stopped` and `Running`; every start
//! opens a new generation, and ticks belonging to an older generation end
//! without rendering. That makes `stop` effective from the very next tick.

pub mod scheduler;
pub mod surface;

pub use scheduler::{LoopAction, ManualScheduler, Scheduler, ThreadScheduler, TickFn};
pub use surface::{DisplaySurface, SharedSurface, mirror_horizontal};

use crate::backends::camera::{SharedSource, lock_source};
use crate::constants::timing;
use crate::errors::FilterError;
use crate::filters::{self, FilterSelection};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, trace};

/// Render loop lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A filtered frame was presented
    Rendered,
    /// No frame, or the frame was unusable; the next tick tries again
    Skipped,
    /// The loop is stopped or restarted; this tick's schedule is over
    Stopped,
}

/// State shared between the loop handle and its scheduled ticks
struct LoopShared {
    source: SharedSource,
    selection: FilterSelection,
    surface: Mutex<Box<dyn DisplaySurface>>,
    mirrored: AtomicBool,
    running: AtomicBool,
    generation: AtomicU64,
    /// Filter output, resized to each frame
    buffer: Mutex<Vec<u8>>,
    rendered: AtomicU64,
    skipped: AtomicU64,
}

impl LoopShared {
    fn is_current(&self, generation: u64) -> bool {
        self.running.load(Ordering::SeqCst) && self.generation.load(Ordering::SeqCst) == generation
    }

    fn tick(&self, generation: u64) -> TickOutcome {
        if !self.is_current(generation) {
            return TickOutcome::Stopped;
        }

        // Source lock is released before filtering
        let Some(frame) = lock_source(&self.source).current_frame() else {
            trace!("No frame available");
            self.skipped.fetch_add(1, Ordering::Relaxed);
            return TickOutcome::Skipped;
        };

        let kind = self.selection.get();
        // Every tick rewrites the whole buffer, so a poisoned one is still usable
        let mut buffer = self.buffer.lock().unwrap_or_else(|e| e.into_inner());

        match filters::apply_into(&frame, kind, &mut buffer) {
            Ok(()) => {}
            Err(FilterError::InvalidFrame { width, height, len }) => {
                debug!(width, height, len, "Skipping invalid frame");
                self.skipped.fetch_add(1, Ordering::Relaxed);
                return TickOutcome::Skipped;
            }
            Err(e) => {
                debug!(error = %e, "Skipping frame");
                self.skipped.fetch_add(1, Ordering::Relaxed);
                return TickOutcome::Skipped;
            }
        }

        if self.mirrored.load(Ordering::Relaxed) {
            mirror_horizontal(&mut buffer, frame.width);
        }

        // Stop may have landed while filtering; never present after it
        if !self.is_current(generation) {
            return TickOutcome::Stopped;
        }

        self.surface
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .present(frame.width, frame.height, &buffer);

        let rendered = self.rendered.fetch_add(1, Ordering::Relaxed) + 1;
        if rendered % timing::FRAME_LOG_INTERVAL == 0 {
            debug!(
                frames = rendered,
                width = frame.width,
                height = frame.height,
                filter = %kind,
                latency_us = frame.captured_at.elapsed().as_micros(),
                "Render loop progress"
            );
        }
        TickOutcome::Rendered
    }
}

/// Render loop driving the filter engine against a frame source
pub struct RenderLoop {
    shared: Arc<LoopShared>,
    scheduler: Box<dyn Scheduler>,
}

impl RenderLoop {
    pub fn new(
        source: SharedSource,
        selection: FilterSelection,
        surface: impl DisplaySurface + 'static,
        scheduler: impl Scheduler + 'static,
    ) -> Self {
        Self {
            shared: Arc::new(LoopShared {
                source,
                selection,
                surface: Mutex::new(Box::new(surface)),
                mirrored: AtomicBool::new(false),
                running: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                buffer: Mutex::new(Vec::new()),
                rendered: AtomicU64::new(0),
                skipped: AtomicU64::new(0),
            }),
            scheduler: Box::new(scheduler),
        }
    }

    pub fn state(&self) -> LoopState {
        if self.shared.running.load(Ordering::SeqCst) {
            LoopState::Running
        } else {
            LoopState::Stopped
        }
    }

    /// Start ticking; no-op while already running
    pub fn start(&mut self) {
        if self.state() == LoopState::Running {
            return;
        }

        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.running.store(true, Ordering::SeqCst);
        info!(generation, "Render loop started");

        let shared = Arc::clone(&self.shared);
        self.scheduler.schedule(Box::new(move || match shared.tick(generation) {
            TickOutcome::Stopped => LoopAction::Stop,
            TickOutcome::Rendered | TickOutcome::Skipped => LoopAction::Continue,
        }));
    }

    /// Stop ticking; no-op while stopped
    pub fn stop(&mut self) {
        if self.state() == LoopState::Stopped {
            return;
        }

        self.shared.running.store(false, Ordering::SeqCst);
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        self.scheduler.cancel();
        info!(
            rendered = self.shared.rendered.load(Ordering::Relaxed),
            skipped = self.shared.skipped.load(Ordering::Relaxed),
            "Render loop stopped"
        );
    }

    /// Run one tick on the caller's thread
    pub fn tick(&self) -> TickOutcome {
        self.shared.tick(self.shared.generation.load(Ordering::SeqCst))
    }

    /// Horizontally flip presented frames
    pub fn set_mirrored(&self, mirrored: bool) {
        self.shared.mirrored.store(mirrored, Ordering::Relaxed);
    }

    pub fn is_mirrored(&self) -> bool {
        self.shared.mirrored.load(Ordering::Relaxed)
    }

    /// Frames presented since creation
    pub fn frames_rendered(&self) -> u64 {
        self.shared.rendered.load(Ordering::Relaxed)
    }

    /// Ticks that found no usable frame
    pub fn frames_skipped(&self) -> u64 {
        self.shared.skipped.load(Ordering::Relaxed)
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::{
        CameraFrame, DeviceSelector, FrameSource, SharedSource, StillImageSource,
    };
    use crate::filters::FilterKind;

    fn setup(frame: CameraFrame) -> (RenderLoop, ManualScheduler, SharedSurface, SharedSource) {
        let mut still = StillImageSource::new().with_frame("test", frame);
        still.start(&DeviceSelector::Default).unwrap();
        let source: SharedSource = Arc::new(Mutex::new(still));
        let scheduler = ManualScheduler::new();
        let surface = SharedSurface::new();
        let render = RenderLoop::new(
            Arc::clone(&source),
            FilterSelection::new(FilterKind::Invert),
            surface.clone(),
            scheduler.clone(),
        );
        (render, scheduler, surface, source)
    }

    #[test]
    fn test_ticks_only_while_running() {
        let (mut render, scheduler, surface, _source) =
            setup(CameraFrame::solid(2, 2, [10, 20, 30, 255]));

        assert!(!scheduler.step());
        render.start();
        assert_eq!(render.state(), LoopState::Running);
        scheduler.run(3);
        assert_eq!(surface.presented_count(), 3);
        assert_eq!(
            surface.latest().unwrap().pixel(0, 0),
            Some([245, 235, 225, 255])
        );

        render.stop();
        assert!(!scheduler.step());
        assert_eq!(render.tick(), TickOutcome::Stopped);
        assert_eq!(surface.presented_count(), 3);
    }

    #[test]
    fn test_missing_frame_is_skipped() {
        let (mut render, _scheduler, surface, source) =
            setup(CameraFrame::solid(2, 2, [0, 0, 0, 255]));
        render.start();

        let handle = {
            let mut guard = lock_source(&source);
            guard.start(&DeviceSelector::Default).unwrap()
        };
        lock_source(&source).stop(handle);

        assert_eq!(render.tick(), TickOutcome::Skipped);
        assert_eq!(render.frames_skipped(), 1);
        assert_eq!(surface.presented_count(), 0);
    }

    #[test]
    fn test_mirror_applies_after_filter() {
        let mut data = vec![0u8; 8];
        data[..4].copy_from_slice(&[0, 0, 0, 255]);
        data[4..].copy_from_slice(&[255, 255, 255, 255]);
        let (mut render, scheduler, surface, _source) = setup(CameraFrame::new(2, 1, data).unwrap());

        render.set_mirrored(true);
        render.start();
        scheduler.step();

        // Inverted: [white, black], then mirrored: [black, white]
        let out = surface.latest().unwrap();
        assert_eq!(out.pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(out.pixel(1, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_recovers_from_panicked_tick() {
        let (mut render, scheduler, surface, _source) =
            setup(CameraFrame::solid(2, 2, [10, 20, 30, 255]));
        render.start();

        let shared = Arc::clone(&render.shared);
        let panicked = std::thread::spawn(move || {
            let _buffer = shared.buffer.lock().unwrap();
            panic!("filter panicked mid-frame");
        })
        .join();
        assert!(panicked.is_err());
        assert!(render.shared.buffer.is_poisoned());

        assert!(scheduler.step());
        assert_eq!(render.frames_rendered(), 1);
        assert_eq!(
            surface.latest().unwrap().pixel(1, 1),
            Some([245, 235, 225, 255])
        );
    }

    #[test]
    fn test_restart_after_stop() {
        let (mut render, scheduler, surface, _source) =
            setup(CameraFrame::solid(3, 3, [1, 1, 1, 255]));
        render.start();
        scheduler.step();
        render.stop();
        render.start();
        scheduler.step();
        assert_eq!(surface.presented_count(), 2);
        assert_eq!(render.frames_rendered(), 2);
    }
}
