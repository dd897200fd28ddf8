//! Maintenance task use-case service.
//!
//! # Responsibility
//! - CRUD over tasks plus the completion workflow.
//! - Answer "what is due" questions for reminders and the CLI.
//! - Keep each task's pending reminder in step with its record when a
//!   notifier is attached.
//!
//! # Invariants
//! - Completion is applied through `MaintenanceTask::mark_completed_at`
//!   and persisted before it is returned.
//! - Reminder calls happen only after the write they follow has succeeded.

use super::{found, read_back, ServiceResult};
use crate::model::maintenance::{MaintenanceStatus, MaintenanceTask};
use crate::model::RecordId;
use crate::notify::{plan_reminder, Notifier, ReminderSettings};
use crate::repo::maintenance_repo::MaintenanceRepository;
use chrono::{DateTime, Utc};
use log::info;
use std::sync::Arc;

const ENTITY: &str = "maintenance task";

struct TaskReminders {
    notifier: Arc<dyn Notifier>,
    settings: ReminderSettings,
}

impl TaskReminders {
    /// Replaces the task's reminder, or drops it when none should fire.
    fn sync(&self, task: &MaintenanceTask, now: DateTime<Utc>) {
        match plan_reminder(task, now, &self.settings) {
            Some(reminder) => self.notifier.schedule(reminder),
            None => self.notifier.cancel(&task.notification_id),
        }
    }
}

pub struct MaintenanceService<R: MaintenanceRepository> {
    repo: R,
    reminders: Option<TaskReminders>,
}

impl<R: MaintenanceRepository> MaintenanceService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            reminders: None,
        }
    }

    /// Schedules, moves and cancels task reminders through `notifier` as
    /// tasks are created, edited, completed and deleted.
    pub fn with_reminders(
        mut self,
        notifier: Arc<dyn Notifier>,
        settings: ReminderSettings,
    ) -> Self {
        self.reminders = Some(TaskReminders { notifier, settings });
        self
    }

    pub fn create_task(&self, task: &MaintenanceTask) -> ServiceResult<MaintenanceTask> {
        let id = self.repo.create_task(task)?;
        let created = read_back(self.repo.get_task(id)?, "created task not found in read-back")?;
        if let Some(reminders) = &self.reminders {
            reminders.sync(&created, Utc::now());
        }
        Ok(created)
    }

    pub fn update_task(&self, task: &MaintenanceTask) -> ServiceResult<()> {
        self.repo.update_task(task)?;
        if let Some(reminders) = &self.reminders {
            reminders.sync(task, Utc::now());
        }
        Ok(())
    }

    pub fn delete_task(&self, id: RecordId) -> ServiceResult<()> {
        let tag = match &self.reminders {
            Some(_) => self.repo.get_task(id)?.map(|task| task.notification_id),
            None => None,
        };
        self.repo.delete_task(id)?;
        if let (Some(reminders), Some(tag)) = (&self.reminders, tag) {
            reminders.notifier.cancel(&tag);
        }
        Ok(())
    }

    pub fn get_task(&self, id: RecordId) -> ServiceResult<MaintenanceTask> {
        found(self.repo.get_task(id)?, ENTITY, id)
    }

    pub fn list_tasks(&self) -> ServiceResult<Vec<MaintenanceTask>> {
        Ok(self.repo.list_tasks()?)
    }

    /// Marks task `id` done at `now` and returns the persisted result.
    ///
    /// Recurring tasks move `scheduled_at` to `now + recurrence_days`;
    /// one-off tasks keep their schedule.
    pub fn complete_task(&self, id: RecordId, now: DateTime<Utc>) -> ServiceResult<MaintenanceTask> {
        let mut task = self.get_task(id)?;
        task.mark_completed_at(now);
        self.repo.update_task(&task)?;
        if let Some(reminders) = &self.reminders {
            if task.is_recurring {
                reminders.sync(&task, now);
            } else {
                reminders.notifier.cancel(&task.notification_id);
            }
        }

        info!(
            "event=task_complete module=service status=ok recurring={}",
            task.is_recurring
        );
        Ok(task)
    }

    /// Tasks classified `Overdue` at `now`, in list order.
    pub fn due_tasks(&self, now: DateTime<Utc>) -> ServiceResult<Vec<MaintenanceTask>> {
        let tasks = self.repo.list_tasks()?;
        Ok(tasks
            .into_iter()
            .filter(|task| task.status_at(now) == MaintenanceStatus::Overdue)
            .collect())
    }
}
