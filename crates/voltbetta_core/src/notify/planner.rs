//! Pure reminder planning over a task snapshot.
//!
//! Every function takes `now` explicitly and only talks to the `Notifier`
//! it is given.

use super::{Notifier, Reminder, OVERDUE_TITLE, REMINDER_TITLE};
use crate::model::maintenance::{MaintenanceStatus, MaintenanceTask};
use chrono::{DateTime, Duration, Utc};
use log::info;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Timing knobs for reminders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderSettings {
    /// How long before `scheduled_at` a reminder fires.
    pub lead: Duration,
    /// How far ahead a periodic tick looks for due tasks.
    pub window: Duration,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            lead: Duration::hours(1),
            window: Duration::hours(24),
        }
    }
}

/// Reminder for `task`, or `None` when it is disabled or would fire in the past.
pub fn plan_reminder(
    task: &MaintenanceTask,
    now: DateTime<Utc>,
    settings: &ReminderSettings,
) -> Option<Reminder> {
    if !task.notifications_enabled {
        return None;
    }
    let fire_at = task.scheduled_at - settings.lead;
    if fire_at < now {
        return None;
    }

    let mut body = task.title.clone();
    if !task.description.trim().is_empty() {
        body.push('\n');
        body.push_str(&task.description);
    }
    body.push_str(&format!(
        "\nScheduled for: {}",
        task.scheduled_at.format(DISPLAY_FORMAT)
    ));

    Some(Reminder {
        tag: task.notification_id.clone(),
        title: REMINDER_TITLE.to_string(),
        body,
        fire_at,
    })
}

/// Clears every pending reminder and re-schedules upcoming tasks.
///
/// Returns the number of reminders scheduled.
pub fn setup_from_tasks(
    notifier: &dyn Notifier,
    tasks: &[MaintenanceTask],
    now: DateTime<Utc>,
    settings: &ReminderSettings,
) -> usize {
    notifier.clear_all();

    let mut scheduled = 0;
    for task in tasks {
        if task.status_at(now) != MaintenanceStatus::Upcoming {
            continue;
        }
        if let Some(reminder) = plan_reminder(task, now, settings) {
            notifier.schedule(reminder);
            scheduled += 1;
        }
    }

    info!(
        "event=reminder_setup module=notify status=ok tasks={} scheduled={}",
        tasks.len(),
        scheduled
    );
    scheduled
}

/// Periodic pass: schedules tasks due within `(lead, window]` of `now`.
///
/// Returns the number of reminders (re)scheduled.
pub fn tick(
    notifier: &dyn Notifier,
    tasks: &[MaintenanceTask],
    now: DateTime<Utc>,
    settings: &ReminderSettings,
) -> usize {
    let mut scheduled = 0;
    for task in tasks.iter().filter(|task| task.notifications_enabled) {
        let until_due = task.scheduled_at - now;
        if until_due > settings.lead && until_due <= settings.window {
            if let Some(reminder) = plan_reminder(task, now, settings) {
                notifier.schedule(reminder);
                scheduled += 1;
            }
        }
    }

    info!(
        "event=reminder_tick module=notify status=ok tasks={} scheduled={}",
        tasks.len(),
        scheduled
    );
    scheduled
}

/// Shows one alert per overdue task with notifications on.
///
/// Returns the number of alerts shown.
pub fn overdue_alerts(
    notifier: &dyn Notifier,
    tasks: &[MaintenanceTask],
    now: DateTime<Utc>,
) -> usize {
    let mut shown = 0;
    for task in tasks {
        if !task.notifications_enabled || task.status_at(now) != MaintenanceStatus::Overdue {
            continue;
        }
        notifier.show(
            OVERDUE_TITLE,
            &format!(
                "{} was scheduled for {} and is now overdue.",
                task.title,
                task.scheduled_at.format(DISPLAY_FORMAT)
            ),
        );
        shown += 1;
    }
    shown
}

#[cfg(test)]
mod tests {
    use super::{overdue_alerts, plan_reminder, setup_from_tasks, tick, ReminderSettings};
    use crate::model::maintenance::{MaintenanceCategory, MaintenanceTask};
    use crate::notify::{RecordingNotifier, OVERDUE_TITLE};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
    }

    fn task_due_in(title: &str, due_in: Duration) -> MaintenanceTask {
        let mut task = MaintenanceTask::new(title, MaintenanceCategory::WaterChange, now());
        task.scheduled_at = now() + due_in;
        task
    }

    #[test]
    fn reminder_fires_one_hour_before_schedule() {
        let task = task_due_in("Water change", Duration::hours(5));
        let reminder = plan_reminder(&task, now(), &ReminderSettings::default()).unwrap();
        assert_eq!(reminder.fire_at, now() + Duration::hours(4));
        assert_eq!(reminder.tag, task.notification_id);
        assert!(reminder.body.starts_with("Water change"));
        assert!(reminder.body.contains("Scheduled for: 2025-06-01 14:00"));
    }

    #[test]
    fn reminder_in_the_past_or_disabled_is_skipped() {
        let settings = ReminderSettings::default();
        let soon = task_due_in("Soon", Duration::minutes(30));
        assert!(plan_reminder(&soon, now(), &settings).is_none());

        let mut muted = task_due_in("Muted", Duration::hours(5));
        muted.notifications_enabled = false;
        assert!(plan_reminder(&muted, now(), &settings).is_none());
    }

    #[test]
    fn setup_clears_then_schedules_only_upcoming() {
        let notifier = RecordingNotifier::new();
        let tasks = vec![
            task_due_in("Upcoming", Duration::days(2)),
            task_due_in("Overdue", -Duration::days(1)),
        ];

        let count = setup_from_tasks(&notifier, &tasks, now(), &ReminderSettings::default());
        assert_eq!(count, 1);
        assert_eq!(notifier.clear_count(), 1);
        assert_eq!(notifier.scheduled().len(), 1);
    }

    #[test]
    fn tick_window_excludes_lead_and_beyond_a_day() {
        let notifier = RecordingNotifier::new();
        let tasks = vec![
            task_due_in("Exactly one hour", Duration::hours(1)),
            task_due_in("Two hours", Duration::hours(2)),
            task_due_in("Exactly a day", Duration::hours(24)),
            task_due_in("Two days", Duration::hours(48)),
        ];

        let count = tick(&notifier, &tasks, now(), &ReminderSettings::default());
        assert_eq!(count, 2);
        let bodies: Vec<String> = notifier
            .scheduled()
            .into_iter()
            .map(|reminder| reminder.body)
            .collect();
        assert!(bodies.iter().any(|body| body.starts_with("Two hours")));
        assert!(bodies.iter().any(|body| body.starts_with("Exactly a day")));
    }

    #[test]
    fn overdue_alerts_show_one_message_per_enabled_overdue_task() {
        let notifier = RecordingNotifier::new();
        let mut muted = task_due_in("Muted", -Duration::days(3));
        muted.notifications_enabled = false;
        let tasks = vec![
            task_due_in("Replace filter media", -Duration::days(1)),
            task_due_in("Fine", Duration::days(1)),
            muted,
        ];

        assert_eq!(overdue_alerts(&notifier, &tasks, now()), 1);
        let shown = notifier.shown();
        assert_eq!(shown[0].0, OVERDUE_TITLE);
        assert_eq!(
            shown[0].1,
            "Replace filter media was scheduled for 2025-05-31 09:00 and is now overdue."
        );
    }
}
