use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;
use voltbetta_core::db::open_db;
use voltbetta_core::notify::planner::{overdue_alerts, setup_from_tasks, ReminderSettings};
use voltbetta_core::notify::scheduler::{DbTaskSource, TaskSource};
use voltbetta_core::notify::{Notifier, OVERDUE_TITLE, REMINDER_TITLE};
use voltbetta_core::repo::maintenance_repo::{MaintenanceRepository, SqliteMaintenanceRepository};
use voltbetta_core::{
    MaintenanceCategory, MaintenanceTask, NotificationScheduler, RecordingNotifier,
};

fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

fn task(title: &str, scheduled_at: DateTime<Utc>) -> MaintenanceTask {
    let mut task = MaintenanceTask::new(title, MaintenanceCategory::Feeding, scheduled_at);
    task.scheduled_at = scheduled_at;
    task
}

#[test]
fn startup_pass_alerts_overdue_and_schedules_upcoming() {
    let now = at(2025, 4, 18, 12);
    let notifier = RecordingNotifier::new();
    let mut muted = task("Muted", now + Duration::hours(5));
    muted.notifications_enabled = false;
    let tasks = vec![
        task("Test Water Parameters", at(2025, 4, 18, 9)),
        task("Water Change (25%)", at(2025, 4, 19, 9)),
        task("Trim Plants", now + Duration::minutes(30)),
        muted,
    ];

    let alerts = overdue_alerts(&notifier, &tasks, now);
    let scheduled = setup_from_tasks(&notifier, &tasks, now, &ReminderSettings::default());

    assert_eq!(alerts, 1);
    let shown = notifier.shown();
    assert_eq!(shown[0].0, OVERDUE_TITLE);
    assert_eq!(
        shown[0].1,
        "Test Water Parameters was scheduled for 2025-04-18 09:00 and is now overdue."
    );

    assert_eq!(scheduled, 1);
    assert_eq!(notifier.clear_count(), 1);
    let reminders = notifier.scheduled();
    assert_eq!(reminders[0].title, REMINDER_TITLE);
    assert_eq!(reminders[0].tag, tasks[1].notification_id);
    assert_eq!(reminders[0].fire_at, at(2025, 4, 19, 8));
}

#[test]
fn db_task_source_reads_tasks_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("voltbetta.db");
    {
        let conn = open_db(&path).unwrap();
        let repo = SqliteMaintenanceRepository::new(&conn);
        repo.create_task(&task("Feed", at(2025, 4, 18, 9)))
            .unwrap();
    }

    let mut source = DbTaskSource::new(&path);
    let tasks = source.load_tasks().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Feed");
}

#[test]
fn scheduler_schedules_tasks_due_within_window() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("voltbetta.db");
    let due_soon = task("Water Change", Utc::now() + Duration::hours(6));
    {
        let conn = open_db(&path).unwrap();
        let repo = SqliteMaintenanceRepository::new(&conn);
        repo.create_task(&due_soon).unwrap();
        repo.create_task(&task("Next week", Utc::now() + Duration::days(7)))
            .unwrap();
    }

    let notifier = Arc::new(RecordingNotifier::new());
    let scheduler = NotificationScheduler::start(
        DbTaskSource::new(&path),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
        std::time::Duration::from_millis(20),
        ReminderSettings::default(),
    );

    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
    while notifier.scheduled().is_empty() && std::time::Instant::now() < deadline {
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
    scheduler.stop();

    let reminders = notifier.scheduled();
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].tag, due_soon.notification_id);
}
