//! Maintenance reminders.
//!
//! # Responsibility
//! - Decide which tasks deserve a reminder or an overdue alert.
//! - Hand those decisions to a `Notifier` sink.
//! - Re-scan tasks periodically on a background thread.
//!
//! # Invariants
//! - Reminders are keyed by the task's `notification_id`; scheduling the same
//!   tag again replaces the earlier reminder.
//! - Tasks with notifications disabled never produce reminders or alerts.
//! - Notifier implementations log metadata only, never task titles.

use chrono::{DateTime, Utc};
use log::info;
use std::collections::BTreeMap;
use std::sync::Mutex;

pub mod planner;
pub mod scheduler;

pub use planner::{overdue_alerts, plan_reminder, setup_from_tasks, tick, ReminderSettings};
pub use scheduler::{DbTaskSource, NotificationScheduler, TaskSource};

/// Toast title used for scheduled task reminders.
pub const REMINDER_TITLE: &str = "Volt Maintenance Reminder";
/// Toast title used for overdue alerts.
pub const OVERDUE_TITLE: &str = "Overdue Maintenance Task";

/// A reminder due to fire at `fire_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    /// Cancellation tag; equals the task's `notification_id`.
    pub tag: String,
    pub title: String,
    pub body: String,
    pub fire_at: DateTime<Utc>,
}

/// Sink for user-facing notifications.
pub trait Notifier: Send + Sync {
    /// Shows a message immediately.
    fn show(&self, title: &str, message: &str);
    /// Queues `reminder`, replacing any reminder with the same tag.
    fn schedule(&self, reminder: Reminder);
    fn cancel(&self, tag: &str);
    fn clear_all(&self);
}

/// Notifier that only writes structured log events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(&self, _title: &str, message: &str) {
        info!(
            "event=notify_show module=notify status=ok message_len={}",
            message.len()
        );
    }

    fn schedule(&self, reminder: Reminder) {
        info!(
            "event=notify_schedule module=notify status=ok fire_at_ms={}",
            reminder.fire_at.timestamp_millis()
        );
    }

    fn cancel(&self, _tag: &str) {
        info!("event=notify_cancel module=notify status=ok");
    }

    fn clear_all(&self) {
        info!("event=notify_clear module=notify status=ok");
    }
}

/// In-memory notifier that remembers everything it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    shown: Mutex<Vec<(String, String)>>,
    scheduled: Mutex<BTreeMap<String, Reminder>>,
    clears: Mutex<usize>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(title, message)` pairs passed to `show`, oldest first.
    pub fn shown(&self) -> Vec<(String, String)> {
        self.shown.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    /// Pending reminders ordered by tag.
    pub fn scheduled(&self) -> Vec<Reminder> {
        self.scheduled
            .lock()
            .map(|guard| guard.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn clear_count(&self) -> usize {
        self.clears.lock().map(|guard| *guard).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn show(&self, title: &str, message: &str) {
        if let Ok(mut shown) = self.shown.lock() {
            shown.push((title.to_string(), message.to_string()));
        }
    }

    fn schedule(&self, reminder: Reminder) {
        if let Ok(mut scheduled) = self.scheduled.lock() {
            scheduled.insert(reminder.tag.clone(), reminder);
        }
    }

    fn cancel(&self, tag: &str) {
        if let Ok(mut scheduled) = self.scheduled.lock() {
            scheduled.remove(tag);
        }
    }

    fn clear_all(&self) {
        if let Ok(mut scheduled) = self.scheduled.lock() {
            scheduled.clear();
        }
        if let Ok(mut clears) = self.clears.lock() {
            *clears += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Notifier, RecordingNotifier, Reminder};
    use chrono::Utc;

    fn reminder(tag: &str, body: &str) -> Reminder {
        Reminder {
            tag: tag.to_string(),
            title: "t".to_string(),
            body: body.to_string(),
            fire_at: Utc::now(),
        }
    }

    #[test]
    fn scheduling_same_tag_replaces_previous_reminder() {
        let notifier = RecordingNotifier::new();
        notifier.schedule(reminder("a", "first"));
        notifier.schedule(reminder("a", "second"));
        notifier.schedule(reminder("b", "other"));

        let scheduled = notifier.scheduled();
        assert_eq!(scheduled.len(), 2);
        assert_eq!(scheduled[0].body, "second");

        notifier.cancel("a");
        assert_eq!(notifier.scheduled().len(), 1);

        notifier.clear_all();
        assert!(notifier.scheduled().is_empty());
        assert_eq!(notifier.clear_count(), 1);
    }
}
