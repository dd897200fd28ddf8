//! Maintenance task model and its status/recurrence rule.
//!
//! # Responsibility
//! - Classify a task as upcoming, overdue or completed against a given "now".
//! - Compute the next due timestamp and apply completion side effects.
//!
//! # Invariants
//! - A recurring task carries `recurrence_days > 0`.
//! - Completing a non-recurring task never moves `scheduled_at`.
//! - Status evaluation is pure: it reads the record and `now`, nothing else.

use super::{require_text, text_enum, RecordId, ValidationError};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Interval applied to a fresh task and to recurring tasks created without one.
pub const DEFAULT_RECURRENCE_DAYS: u32 = 7;

/// Longest accepted interval, roughly a century.
pub const MAX_RECURRENCE_DAYS: u32 = 36_500;

/// Kind of care action a task represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceCategory {
    WaterChange,
    Feeding,
    Enrichment,
    FilterCleaning,
    PlantMaintenance,
    Other,
}

text_enum!(MaintenanceCategory {
    WaterChange => "water_change",
    Feeding => "feeding",
    Enrichment => "enrichment",
    FilterCleaning => "filter_cleaning",
    PlantMaintenance => "plant_maintenance",
    Other => "other",
});

/// Derived classification of a task at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Upcoming,
    Overdue,
    Completed,
}

text_enum!(MaintenanceStatus {
    Upcoming => "upcoming",
    Overdue => "overdue",
    Completed => "completed",
});

/// Scheduled, optionally recurring care action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceTask {
    pub id: Option<RecordId>,
    pub title: String,
    pub description: String,
    pub category: MaintenanceCategory,
    pub scheduled_at: DateTime<Utc>,
    pub is_recurring: bool,
    /// Days between occurrences, measured from the last completion.
    pub recurrence_days: u32,
    pub last_completed_at: Option<DateTime<Utc>>,
    pub notifications_enabled: bool,
    /// Tag used to find and cancel this task's reminders.
    pub notification_id: String,
}

impl MaintenanceTask {
    /// Creates a one-off task due one day after `now`, with reminders on.
    pub fn new(
        title: impl Into<String>,
        category: MaintenanceCategory,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: String::new(),
            category,
            scheduled_at: now + Duration::days(1),
            is_recurring: false,
            recurrence_days: DEFAULT_RECURRENCE_DAYS,
            last_completed_at: None,
            notifications_enabled: true,
            notification_id: new_notification_id(),
        }
    }

    /// Turns the task into a recurring one with the given interval.
    pub fn recurring_every(mut self, days: u32) -> Self {
        self.is_recurring = true;
        self.recurrence_days = days;
        self
    }

    /// Checks record invariants before persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        require_text("notification_id", &self.notification_id)?;
        if self.is_recurring && self.recurrence_days == 0 {
            return Err(ValidationError::NonPositiveRecurrence);
        }
        if self.is_recurring && self.recurrence_days > MAX_RECURRENCE_DAYS {
            return Err(ValidationError::RecurrenceTooLong(self.recurrence_days));
        }
        Ok(())
    }

    fn interval(&self) -> Duration {
        Duration::days(i64::from(self.recurrence_days))
    }

    /// `from + interval`, pinned to the latest representable instant when the
    /// sum leaves chrono's range.
    fn after_interval(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        from.checked_add_signed(self.interval())
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Classifies the task against `now`.
    ///
    /// A completed task whose schedule has passed and that matches neither the
    /// recurring-overdue nor the one-off-completed case is classified by its
    /// original `scheduled_at`, not by the recomputed next due time.
    pub fn status_at(&self, now: DateTime<Utc>) -> MaintenanceStatus {
        if let Some(last_completed) = self.last_completed_at {
            if self.scheduled_at > now {
                return MaintenanceStatus::Upcoming;
            } else if self.is_recurring && self.after_interval(last_completed) < now {
                return MaintenanceStatus::Overdue;
            } else if !self.is_recurring && last_completed < self.scheduled_at {
                return MaintenanceStatus::Completed;
            }
        }

        if self.scheduled_at < now {
            MaintenanceStatus::Overdue
        } else {
            MaintenanceStatus::Upcoming
        }
    }

    /// Classifies the task against the wall clock.
    pub fn status(&self) -> MaintenanceStatus {
        self.status_at(Utc::now())
    }

    /// Returns when the task should next be considered due.
    pub fn next_scheduled_at(&self) -> DateTime<Utc> {
        match (self.is_recurring, self.last_completed_at) {
            (true, Some(last_completed)) => self.after_interval(last_completed),
            _ => self.scheduled_at,
        }
    }

    /// Records a completion at `now`, advancing recurring tasks by one interval.
    pub fn mark_completed_at(&mut self, now: DateTime<Utc>) {
        self.last_completed_at = Some(now);
        if self.is_recurring {
            self.scheduled_at = self.after_interval(now);
        }
    }

    /// Records a completion at the wall clock time.
    pub fn mark_completed(&mut self) {
        self.mark_completed_at(Utc::now());
    }
}

/// Fresh reminder tag: 32 lowercase hex digits, no dashes.
pub fn new_notification_id() -> String {
    Uuid::new_v4().simple().to_string()
}
