//! Request bodies and list query parameters.
//!
//! Create bodies build a fresh record; the same body on `PUT` replaces the
//! editable fields of the stored record and leaves store-owned fields
//! (`id`, reminder tag, embedded histories) untouched.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::PathBuf;
use voltbetta_core::model::DEFAULT_CATEGORY;
use voltbetta_core::{
    IssueSeverity, LightLevel, MaintenanceCategory, MaintenanceTask, Note, Plant, PlantLocation,
    RecordId, SymptomSeverity, TankLog, TreatmentPlan, WaterParameters,
};

/// Optional list filters; each endpoint reads the keys it understands.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub show_completed: Option<bool>,
    /// Photos only: also list photos attached to treatment plans.
    pub include_treatment: Option<bool>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub logged_at: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub water: Option<WaterParameters>,
}

impl LogInput {
    pub fn into_log(self, now: DateTime<Utc>) -> TankLog {
        let mut log = TankLog::new(
            self.title.as_str(),
            self.description.as_str(),
            self.logged_at.unwrap_or(now),
        );
        self.apply(&mut log);
        log
    }

    pub fn apply(self, log: &mut TankLog) {
        log.title = self.title;
        log.description = self.description;
        if let Some(logged_at) = self.logged_at {
            log.logged_at = logged_at;
        }
        if let Some(category) = self.category {
            log.category = category;
        }
        log.water = self.water;
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: MaintenanceCategory,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub is_recurring: bool,
    pub recurrence_days: Option<u32>,
    pub notifications_enabled: Option<bool>,
}

impl TaskInput {
    pub fn into_task(self, now: DateTime<Utc>) -> MaintenanceTask {
        let mut task = MaintenanceTask::new(self.title.as_str(), self.category, now);
        self.apply(&mut task);
        task
    }

    pub fn apply(self, task: &mut MaintenanceTask) {
        task.title = self.title;
        task.description = self.description;
        task.category = self.category;
        task.scheduled_at = self.scheduled_at;
        task.is_recurring = self.is_recurring;
        if let Some(days) = self.recurrence_days {
            task.recurrence_days = days;
        }
        if let Some(enabled) = self.notifications_enabled {
            task.notifications_enabled = enabled;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlantInput {
    pub name: String,
    pub scientific_name: Option<String>,
    pub added_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub care_notes: String,
    pub location: Option<PlantLocation>,
    pub light: Option<LightLevel>,
}

impl PlantInput {
    pub fn into_plant(self, now: DateTime<Utc>) -> Plant {
        let mut plant = Plant::new(self.name.as_str(), self.added_at.unwrap_or(now));
        self.apply(&mut plant);
        plant
    }

    pub fn apply(self, plant: &mut Plant) {
        plant.name = self.name;
        plant.scientific_name = self.scientific_name.filter(|name| !name.trim().is_empty());
        if let Some(added_at) = self.added_at {
            plant.added_at = added_at;
        }
        plant.care_notes = self.care_notes;
        if let Some(location) = self.location {
            plant.location = location;
        }
        if let Some(light) = self.light {
            plant.light = light;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreatmentInput {
    pub illness_name: String,
    #[serde(default)]
    pub description: String,
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub medication_notes: String,
}

impl TreatmentInput {
    pub fn into_plan(self, now: DateTime<Utc>) -> TreatmentPlan {
        let mut plan = TreatmentPlan::new(self.illness_name.as_str(), self.started_at.unwrap_or(now));
        self.apply(&mut plan);
        plan
    }

    pub fn apply(self, plan: &mut TreatmentPlan) {
        plan.illness_name = self.illness_name;
        plan.description = self.description;
        if let Some(started_at) = self.started_at {
            plan.started_at = started_at;
        }
        plan.medication_notes = self.medication_notes;
    }
}

/// New photo taken from a file already on the server's disk.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoInput {
    pub source_path: PathBuf,
    #[serde(default)]
    pub caption: String,
    pub category: Option<String>,
    pub treatment_plan_id: Option<RecordId>,
}

impl PhotoInput {
    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoUpdate {
    #[serde(default)]
    pub caption: String,
    pub category: Option<String>,
    pub treatment_plan_id: Option<RecordId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NoteInput {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: String,
}

impl NoteInput {
    pub fn into_note(self, now: DateTime<Utc>) -> Note {
        Note::new(self.title, self.content, self.tags, now)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueInput {
    pub description: String,
    pub severity: IssueSeverity,
}

/// Free-text notes attached to a resolve/complete/discontinue action.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotesInput {
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreatmentLogInput {
    pub actions: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SymptomInput {
    pub name: String,
    pub severity: SymptomSeverity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SymptomUpdate {
    pub severity: SymptomSeverity,
    #[serde(default)]
    pub notes: String,
}
