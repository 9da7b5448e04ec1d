// SPDX-License-Identifier: GPL-3.0-only
//! Tick scheduling for the render loop
//!
//! A [`Scheduler`] repeatedly invokes one tick callback until the callback
//! returns [`LoopAction::Stop`] or the schedule is cancelled. Ticks are never
//! re-entrant: each implementation runs at most one tick at a time.
//!
//! - [`ThreadScheduler`] paces ticks on a background thread
//! - [`ManualScheduler`] runs a tick only when [`ManualScheduler::step`] is
//!   called, which keeps tests and single-threaded front ends deterministic

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Action returned by a tick callback to control the schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    /// Keep ticking
    Continue,
    /// End the schedule
    Stop,
}

/// One scheduled tick callback
pub type TickFn = Box<dyn FnMut() -> LoopAction + Send>;

/// Drives a tick callback at some cadence
pub trait Scheduler: Send {
    /// Start invoking `tick`, replacing any previous schedule
    fn schedule(&mut self, tick: TickFn);

    /// Stop invoking the current callback
    ///
    /// After this returns no further tick of the cancelled callback starts.
    fn cancel(&mut self);

    /// Whether a callback is currently scheduled
    fn is_active(&self) -> bool;
}

#[derive(Default)]
struct ManualSlot {
    tick: Option<TickFn>,
    /// Bumped on every schedule/cancel so an in-flight step can tell whether
    /// its callback was replaced while running
    generation: u64,
}

/// Scheduler that only ticks when told to
///
/// Cloning yields another handle to the same schedule, so a test can keep one
/// handle while the render loop owns the other.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    slot: Arc<Mutex<ManualSlot>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the scheduled callback once
    ///
    /// Returns false when nothing was scheduled.
    pub fn step(&self) -> bool {
        let (mut tick, generation) = {
            let Ok(mut slot) = self.slot.lock() else {
                return false;
            };
            match slot.tick.take() {
                Some(tick) => (tick, slot.generation),
                None => return false,
            }
        };

        // The lock is released while the callback runs so it may reschedule
        let action = tick();

        if let Ok(mut slot) = self.slot.lock()
            && action == LoopAction::Continue
            && slot.generation == generation
            && slot.tick.is_none()
        {
            slot.tick = Some(tick);
        }
        true
    }

    /// Run up to `count` ticks, stopping early once nothing is scheduled
    pub fn run(&self, count: usize) -> usize {
        (0..count).take_while(|_| self.step()).count()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, tick: TickFn) {
        if let Ok(mut slot) = self.slot.lock() {
            slot.generation += 1;
            slot.tick = Some(tick);
        }
    }

    fn cancel(&mut self) {
        if let Ok(mut slot) = self.slot.lock() {
            slot.generation += 1;
            slot.tick = None;
        }
    }

    fn is_active(&self) -> bool {
        self.slot.lock().map(|s| s.tick.is_some()).unwrap_or(false)
    }
}

/// Scheduler that ticks on a background thread at a fixed interval
///
/// A tick that overruns the interval delays the next one instead of queueing
/// more, so a slow filter lowers the frame rate.
pub struct ThreadScheduler {
    name: String,
    interval: Duration,
    thread_handle: Option<JoinHandle<()>>,
    stop_signal: Arc<AtomicBool>,
}

impl ThreadScheduler {
    pub fn new(name: &str, interval: Duration) -> Self {
        Self {
            name: name.to_string(),
            interval,
            thread_handle: None,
            stop_signal: Arc::new(AtomicBool::new(false)),
        }
    }

    fn join(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            // A tick cancelling its own schedule cannot wait for itself
            if handle.thread().id() == thread::current().id() {
                return;
            }
            debug!(name = %self.name, "Waiting for tick thread to finish");
            if let Err(e) = handle.join() {
                warn!(name = %self.name, "Tick thread panicked: {:?}", e);
            }
        }
    }
}

impl Scheduler for ThreadScheduler {
    fn schedule(&mut self, mut tick: TickFn) {
        self.cancel();

        let stop_signal = Arc::new(AtomicBool::new(false));
        let stop_signal_clone = Arc::clone(&stop_signal);
        let name_clone = self.name.clone();
        let interval = self.interval;

        info!(name = %self.name, interval_ms = interval.as_millis(), "Starting tick thread");

        let spawned = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || {
                loop {
                    if stop_signal_clone.load(Ordering::SeqCst) {
                        debug!(name = %name_clone, "Stop signal received");
                        break;
                    }

                    let started = Instant::now();
                    if tick() == LoopAction::Stop {
                        debug!(name = %name_clone, "Tick requested stop");
                        break;
                    }

                    if let Some(remaining) = interval.checked_sub(started.elapsed()) {
                        thread::sleep(remaining);
                    }
                }
                info!(name = %name_clone, "Tick thread exiting");
            });

        match spawned {
            Ok(handle) => {
                self.stop_signal = stop_signal;
                self.thread_handle = Some(handle);
            }
            Err(e) => warn!(name = %self.name, error = %e, "Failed to spawn tick thread"),
        }
    }

    fn cancel(&mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);
        self.join();
    }

    fn is_active(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for ThreadScheduler {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            debug!(name = %self.name, "ThreadScheduler dropped, stopping ticks");
            self.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    fn counting(counter: &Arc<AtomicU32>, stop_after: u32) -> TickFn {
        let counter = Arc::clone(counter);
        Box::new(move || {
            let count = counter.fetch_add(1, Ordering::SeqCst) + 1;
            if count >= stop_after {
                LoopAction::Stop
            } else {
                LoopAction::Continue
            }
        })
    }

    #[test]
    fn test_manual_steps_until_stop() {
        let counter = Arc::new(AtomicU32::new(0));
        let mut scheduler = ManualScheduler::new();
        scheduler.schedule(counting(&counter, 3));

        assert_eq!(scheduler.run(10), 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert!(!scheduler.is_active());
        assert!(!scheduler.step());
    }

    #[test]
    fn test_manual_cancel() {
        let counter = Arc::new(AtomicU32::new(0));
        let mut scheduler = ManualScheduler::new();
        let handle = scheduler.clone();
        scheduler.schedule(counting(&counter, 100));

        handle.step();
        scheduler.cancel();
        assert!(!handle.step());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_manual_reschedule_replaces_callback() {
        let first = Arc::new(AtomicU32::new(0));
        let second = Arc::new(AtomicU32::new(0));
        let mut scheduler = ManualScheduler::new();

        scheduler.schedule(counting(&first, 100));
        scheduler.step();
        scheduler.schedule(counting(&second, 100));
        scheduler.run(2);

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_thread_scheduler_stops_itself() {
        let counter = Arc::new(AtomicU32::new(0));
        let mut scheduler = ThreadScheduler::new("test-ticks", Duration::from_millis(1));
        scheduler.schedule(counting(&counter, 5));

        let deadline = Instant::now() + Duration::from_secs(5);
        while scheduler.is_active() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_thread_scheduler_cancel() {
        let counter = Arc::new(AtomicU32::new(0));
        let mut scheduler = ThreadScheduler::new("test-cancel", Duration::from_millis(2));
        scheduler.schedule(counting(&counter, u32::MAX));
        thread::sleep(Duration::from_millis(20));

        scheduler.cancel();
        let after_cancel = counter.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(counter.load(Ordering::SeqCst), after_cancel);
        assert!(!scheduler.is_active());
    }
}
