//! Terminal notifier.

use chrono::Local;
use log::info;
use voltbetta_core::notify::{Notifier, Reminder};

/// Prints alerts and reminder plans to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn show(&self, title: &str, message: &str) {
        println!("[{title}] {message}");
    }

    fn schedule(&self, reminder: Reminder) {
        println!(
            "reminder at {}: {}",
            reminder.fire_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            reminder.body.lines().next().unwrap_or_default()
        );
        info!("event=notify_schedule module=cli status=ok");
    }

    fn cancel(&self, _tag: &str) {
        info!("event=notify_cancel module=cli status=ok");
    }

    fn clear_all(&self) {
        info!("event=notify_clear module=cli status=ok");
    }
}
