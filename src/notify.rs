// SPDX-License-Identifier: GPL-3.0-only

//! User-facing notifications
//!
//! Notifications are fire-and-forget: the booth emits them and never waits on
//! or inspects the outcome.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing::{error, info};

/// How a notification should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

/// One emitted notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

/// Sink for user-facing notifications
pub trait Notifier: Send {
    fn notify(&self, message: &str, severity: Severity);

    fn success(&self, message: &str) {
        self.notify(message, Severity::Success);
    }

    fn error(&self, message: &str) {
        self.notify(message, Severity::Error);
    }

    fn info(&self, message: &str) {
        self.notify(message, Severity::Info);
    }
}

/// Writes notifications to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Error => error!(target: "photo_booth::notify", "{}", message),
            Severity::Success | Severity::Info => {
                info!(target: "photo_booth::notify", ?severity, "{}", message)
            }
        }
    }
}

/// Keeps the most recent notifications for display
///
/// Cloning yields another handle to the same log. Every notification is also
/// forwarded to the tracing log.
#[derive(Debug, Clone)]
pub struct NotificationLog {
    entries: Arc<Mutex<VecDeque<Notification>>>,
    limit: usize,
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self::new(32)
    }
}

impl NotificationLog {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::new())),
            limit: limit.max(1),
        }
    }

    /// All retained notifications, oldest first
    pub fn entries(&self) -> Vec<Notification> {
        self.entries
            .lock()
            .map(|e| e.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn latest(&self) -> Option<Notification> {
        self.entries.lock().ok()?.back().cloned()
    }

    /// Messages only, oldest first
    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|n| n.message).collect()
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, message: &str, severity: Severity) {
        TracingNotifier.notify(message, severity);
        if let Ok(mut entries) = self.entries.lock() {
            if entries.len() == self.limit {
                entries.pop_front();
            }
            entries.push_back(Notification {
                message: message.to_string(),
                severity,
            });
        }
    }
}
