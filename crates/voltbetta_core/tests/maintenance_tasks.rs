use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;
use voltbetta_core::db::open_db_in_memory;
use voltbetta_core::repo::maintenance_repo::{MaintenanceRepository, SqliteMaintenanceRepository};
use voltbetta_core::service::maintenance_service::MaintenanceService;
use voltbetta_core::notify::ReminderSettings;
use voltbetta_core::service::ServiceError;
use voltbetta_core::{
    MaintenanceCategory, MaintenanceStatus, MaintenanceTask, RecordingNotifier, ValidationError,
};

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

fn task_due(title: &str, scheduled_at: DateTime<Utc>) -> MaintenanceTask {
    let mut task = MaintenanceTask::new(title, MaintenanceCategory::WaterChange, at(2025, 1, 1));
    task.scheduled_at = scheduled_at;
    task
}

#[test]
fn never_completed_task_past_due_is_overdue() {
    let task = task_due("Water Change", at(2025, 1, 10));
    assert_eq!(task.status_at(at(2025, 1, 15)), MaintenanceStatus::Overdue);
}

#[test]
fn recurring_task_past_its_interval_is_overdue() {
    let mut task = task_due("Water Change", at(2025, 1, 10)).recurring_every(7);
    task.last_completed_at = Some(at(2025, 1, 3));
    assert_eq!(task.status_at(at(2025, 1, 20)), MaintenanceStatus::Overdue);
}

#[test]
fn tasks_persist_and_list_by_schedule() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMaintenanceRepository::new(&conn);

    let mut later = task_due("Replace Filter Media", at(2025, 5, 10)).recurring_every(30);
    later.category = MaintenanceCategory::FilterCleaning;
    later.last_completed_at = Some(at(2025, 4, 10));
    repo.create_task(&later).unwrap();
    repo.create_task(&task_due("Feed", at(2025, 4, 18)))
        .unwrap();

    let tasks = repo.list_tasks().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].title, "Feed");
    assert_eq!(tasks[1].title, "Replace Filter Media");
    assert_eq!(tasks[1].category, MaintenanceCategory::FilterCleaning);
    assert!(tasks[1].is_recurring);
    assert_eq!(tasks[1].recurrence_days, 30);
    assert_eq!(tasks[1].last_completed_at, Some(at(2025, 4, 10)));
    assert_eq!(tasks[1].notification_id, later.notification_id);
}

#[test]
fn zero_recurrence_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = MaintenanceService::new(SqliteMaintenanceRepository::new(&conn));

    let task = task_due("Broken", at(2025, 1, 10)).recurring_every(0);
    assert!(matches!(
        service.create_task(&task),
        Err(ServiceError::Validation(_))
    ));
}

#[test]
fn completing_recurring_task_moves_schedule_forward() {
    let conn = open_db_in_memory().unwrap();
    let service = MaintenanceService::new(SqliteMaintenanceRepository::new(&conn));

    let created = service
        .create_task(&task_due("Water Change (25%)", at(2025, 1, 10)).recurring_every(7))
        .unwrap();
    let id = created.id.unwrap();

    let now = at(2025, 1, 12);
    let completed = service.complete_task(id, now).unwrap();
    assert_eq!(completed.last_completed_at, Some(now));
    assert_eq!(completed.scheduled_at, now + Duration::days(7));

    let stored = service.get_task(id).unwrap();
    assert_eq!(stored, completed);
    assert_eq!(stored.status_at(now), MaintenanceStatus::Upcoming);
}

#[test]
fn completing_one_off_task_keeps_schedule() {
    let conn = open_db_in_memory().unwrap();
    let service = MaintenanceService::new(SqliteMaintenanceRepository::new(&conn));

    let created = service
        .create_task(&task_due("Buy heater", at(2025, 1, 10)))
        .unwrap();
    let completed = service
        .complete_task(created.id.unwrap(), at(2025, 1, 8))
        .unwrap();

    assert_eq!(completed.scheduled_at, at(2025, 1, 10));
    assert_eq!(completed.last_completed_at, Some(at(2025, 1, 8)));
    assert_eq!(completed.next_scheduled_at(), at(2025, 1, 10));
    assert_eq!(
        completed.status_at(at(2025, 1, 11)),
        MaintenanceStatus::Completed
    );
}

#[test]
fn due_tasks_returns_only_overdue() {
    let conn = open_db_in_memory().unwrap();
    let service = MaintenanceService::new(SqliteMaintenanceRepository::new(&conn));

    service
        .create_task(&task_due("Overdue", at(2025, 1, 10)))
        .unwrap();
    service
        .create_task(&task_due("Upcoming", at(2025, 2, 10)))
        .unwrap();

    let due = service.due_tasks(at(2025, 1, 15)).unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].title, "Overdue");
}

#[test]
fn completing_missing_task_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = MaintenanceService::new(SqliteMaintenanceRepository::new(&conn));

    assert!(matches!(
        service.complete_task(77, at(2025, 1, 1)),
        Err(ServiceError::NotFound { id: 77, .. })
    ));
}

#[test]
fn oversized_recurrence_is_rejected_before_completion() {
    let conn = open_db_in_memory().unwrap();
    let service = MaintenanceService::new(SqliteMaintenanceRepository::new(&conn));

    let task = task_due("Century Scrub", at(2025, 1, 10)).recurring_every(u32::MAX);
    assert!(matches!(
        service.create_task(&task),
        Err(ServiceError::Validation(ValidationError::RecurrenceTooLong(_)))
    ));
    assert!(service.list_tasks().unwrap().is_empty());
}

#[test]
fn reminders_follow_task_lifecycle() {
    let conn = open_db_in_memory().unwrap();
    let notifier = Arc::new(RecordingNotifier::new());
    let service = MaintenanceService::new(SqliteMaintenanceRepository::new(&conn))
        .with_reminders(notifier.clone(), ReminderSettings::default());

    let water = service
        .create_task(&task_due("Water Change", at(2099, 3, 1)).recurring_every(7))
        .unwrap();
    let filter = service
        .create_task(&task_due("Rinse Sponge", at(2099, 3, 2)))
        .unwrap();
    let tags: Vec<String> = notifier.scheduled().into_iter().map(|r| r.tag).collect();
    assert_eq!(tags.len(), 2);
    assert!(tags.contains(&water.notification_id));
    assert!(tags.contains(&filter.notification_id));

    let mut muted = filter.clone();
    muted.notifications_enabled = false;
    service.update_task(&muted).unwrap();
    let pending = notifier.scheduled();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].tag, water.notification_id);

    service.delete_task(water.id.unwrap()).unwrap();
    assert!(notifier.scheduled().is_empty());
}

#[test]
fn completing_moves_recurring_reminder_and_drops_one_off() {
    let conn = open_db_in_memory().unwrap();
    let notifier = Arc::new(RecordingNotifier::new());
    let service = MaintenanceService::new(SqliteMaintenanceRepository::new(&conn))
        .with_reminders(notifier.clone(), ReminderSettings::default());

    let weekly = service
        .create_task(&task_due("Water Change", at(2099, 3, 1)).recurring_every(7))
        .unwrap();
    let once = service
        .create_task(&task_due("Trim Anubias", at(2099, 3, 2)))
        .unwrap();
    assert_eq!(notifier.scheduled().len(), 2);

    let done_at = at(2099, 3, 5);
    service.complete_task(weekly.id.unwrap(), done_at).unwrap();
    service.complete_task(once.id.unwrap(), done_at).unwrap();

    let pending = notifier.scheduled();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].tag, weekly.notification_id);
    assert_eq!(
        pending[0].fire_at,
        done_at + Duration::days(7) - Duration::hours(1)
    );
}
