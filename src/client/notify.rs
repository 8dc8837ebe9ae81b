//! Notification sink contract for user-facing toasts.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::{error, info, warn};

// == Severity ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl Severity {
    /// How long a toast of this severity stays on screen.
    pub fn default_duration_ms(&self) -> u64 {
        match self {
            Severity::Success => 3_000,
            Severity::Info => 3_000,
            Severity::Warning => 4_000,
            Severity::Error => 5_000,
        }
    }
}

// == Notification ==
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub duration_ms: u64,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
            duration_ms: severity.default_duration_ms(),
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, Severity::Success)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, Severity::Error)
    }
}

// == Notification Sink ==
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log. Used by the headless binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, n: Notification) {
        match n.severity {
            Severity::Error => error!(title = %n.title, "{}", n.message),
            Severity::Warning => warn!(title = %n.title, "{}", n.message),
            Severity::Success | Severity::Info => info!(title = %n.title, "{}", n.message),
        }
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    received: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.notifications()
            .iter()
            .filter(|n| n.severity == severity)
            .count()
    }
}

impl NotificationSink for MemoryNotifier {
    fn notify(&self, notification: Notification) {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_default_duration() {
        let n = Notification::error("Server Error", "boom");
        assert_eq!(n.duration_ms, 5_000);
        assert_eq!(Notification::success("Saved", "ok").duration_ms, 3_000);
    }

    #[test]
    fn test_memory_notifier_records_in_order() {
        let sink = MemoryNotifier::new();
        sink.notify(Notification::success("Post created", "done"));
        sink.notify(Notification::error("Not Found", "gone"));

        let all = sink.notifications();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title, "Post created");
        assert_eq!(sink.count(Severity::Error), 1);
    }
}
