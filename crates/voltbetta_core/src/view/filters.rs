//! Per-record search, filter and sort rules.
//!
//! Search text is matched case-insensitively as a substring; blank search text
//! and unset filters match everything. Exact filters (category, tag) compare
//! the stored text as-is.

use super::ViewFilter;
use crate::model::maintenance::{MaintenanceCategory, MaintenanceStatus, MaintenanceTask};
use crate::model::note::Note;
use crate::model::photo::FishPhoto;
use crate::model::plant::{Plant, PlantLocation};
use crate::model::tank_log::TankLog;
use crate::model::treatment::{TreatmentPlan, TreatmentStatus};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Lowercased needle, or `None` when the search box is blank.
fn needle(search: &str) -> Option<String> {
    let trimmed = search.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

fn any_contains<'a>(needle: &str, fields: impl IntoIterator<Item = &'a str>) -> bool {
    fields
        .into_iter()
        .any(|field| field.to_lowercase().contains(needle))
}

fn search_hits<'a>(search: &str, fields: impl IntoIterator<Item = &'a str>) -> bool {
    match needle(search) {
        Some(needle) => any_contains(&needle, fields),
        None => true,
    }
}

fn exact_text(filter: &Option<String>, value: &str) -> bool {
    match filter.as_deref().map(str::trim) {
        Some(wanted) if !wanted.is_empty() => value == wanted,
        _ => true,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TankLogFilter {
    pub search: String,
    pub category: Option<String>,
}

impl ViewFilter<TankLog> for TankLogFilter {
    fn matches(&self, log: &TankLog) -> bool {
        search_hits(
            &self.search,
            [
                log.title.as_str(),
                log.description.as_str(),
                log.category.as_str(),
            ],
        ) && exact_text(&self.category, &log.category)
    }

    fn order(&self, a: &TankLog, b: &TankLog) -> Ordering {
        b.logged_at.cmp(&a.logged_at)
    }
}

/// Task list filter; status is evaluated against `now`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFilter {
    pub search: String,
    pub category: Option<MaintenanceCategory>,
    pub show_completed: bool,
    pub now: DateTime<Utc>,
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: None,
            show_completed: false,
            now: Utc::now(),
        }
    }
}

impl ViewFilter<MaintenanceTask> for TaskFilter {
    fn matches(&self, task: &MaintenanceTask) -> bool {
        search_hits(
            &self.search,
            [task.title.as_str(), task.description.as_str()],
        ) && self.category.map_or(true, |category| task.category == category)
            && (self.show_completed || task.status_at(self.now) != MaintenanceStatus::Completed)
    }

    /// Overdue first, then by next due time.
    fn order(&self, a: &MaintenanceTask, b: &MaintenanceTask) -> Ordering {
        let rank = |task: &MaintenanceTask| match task.status_at(self.now) {
            MaintenanceStatus::Overdue => 0,
            _ => 1,
        };
        rank(a)
            .cmp(&rank(b))
            .then_with(|| a.next_scheduled_at().cmp(&b.next_scheduled_at()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlantFilter {
    pub search: String,
    pub location: Option<PlantLocation>,
}

impl ViewFilter<Plant> for PlantFilter {
    fn matches(&self, plant: &Plant) -> bool {
        search_hits(
            &self.search,
            [
                plant.name.as_str(),
                plant.scientific_name.as_deref().unwrap_or_default(),
                plant.care_notes.as_str(),
            ],
        ) && self.location.map_or(true, |location| plant.location == location)
    }

    fn order(&self, a: &Plant, b: &Plant) -> Ordering {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreatmentFilter {
    pub search: String,
    pub status: Option<TreatmentStatus>,
}

impl ViewFilter<TreatmentPlan> for TreatmentFilter {
    fn matches(&self, plan: &TreatmentPlan) -> bool {
        search_hits(
            &self.search,
            [
                plan.illness_name.as_str(),
                plan.description.as_str(),
                plan.medication_notes.as_str(),
            ],
        ) && self.status.map_or(true, |status| plan.status == status)
    }

    fn order(&self, a: &TreatmentPlan, b: &TreatmentPlan) -> Ordering {
        b.started_at.cmp(&a.started_at)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoFilter {
    pub search: String,
    pub category: Option<String>,
    /// Treatment photos belong to their plan and stay out of the gallery
    /// unless this is set.
    pub include_treatment: bool,
}

impl ViewFilter<FishPhoto> for PhotoFilter {
    fn matches(&self, photo: &FishPhoto) -> bool {
        (self.include_treatment || !photo.is_treatment_photo)
            && search_hits(
                &self.search,
                [photo.caption.as_str(), photo.category.as_str()],
            )
            && exact_text(&self.category, &photo.category)
    }

    fn order(&self, a: &FishPhoto, b: &FishPhoto) -> Ordering {
        b.taken_at.cmp(&a.taken_at)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    pub search: String,
    pub tag: Option<String>,
}

impl ViewFilter<Note> for NoteFilter {
    fn matches(&self, note: &Note) -> bool {
        let tag_ok = match self.tag.as_deref().map(str::trim) {
            Some(tag) if !tag.is_empty() => note.has_tag(tag),
            _ => true,
        };
        tag_ok
            && search_hits(
                &self.search,
                [note.title.as_str(), note.content.as_str(), note.tags.as_str()],
            )
    }

    fn order(&self, a: &Note, b: &Note) -> Ordering {
        b.modified_at.cmp(&a.modified_at)
    }
}

/// Sorted, de-duplicated non-blank categories used by tank logs.
pub fn distinct_log_categories(logs: &[TankLog]) -> Vec<String> {
    distinct(logs.iter().map(|log| log.category.as_str()))
}

/// Sorted, de-duplicated non-blank categories used by photos.
pub fn distinct_photo_categories(photos: &[FishPhoto]) -> Vec<String> {
    distinct(photos.iter().map(|photo| photo.category.as_str()))
}

/// Sorted, de-duplicated tags across all notes.
pub fn distinct_note_tags(notes: &[Note]) -> Vec<String> {
    distinct(notes.iter().flat_map(|note| note.tag_list()))
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{distinct_note_tags, NoteFilter, PhotoFilter, PlantFilter, TaskFilter};
    use crate::model::maintenance::{MaintenanceCategory, MaintenanceTask};
    use crate::model::note::Note;
    use crate::model::photo::FishPhoto;
    use crate::model::plant::{Plant, PlantLocation};
    use crate::view::{filter_sorted, ViewFilter};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn task_filter_hides_completed_and_puts_overdue_first() {
        let now = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();

        let mut soon = MaintenanceTask::new("Trim plants", MaintenanceCategory::PlantMaintenance, now);
        soon.scheduled_at = now + Duration::days(1);

        let mut late = MaintenanceTask::new("Water change", MaintenanceCategory::WaterChange, now);
        late.scheduled_at = now + Duration::days(3);

        let mut overdue = MaintenanceTask::new("Replace filter", MaintenanceCategory::FilterCleaning, now);
        overdue.scheduled_at = now - Duration::days(2);

        let mut done = MaintenanceTask::new("Test water", MaintenanceCategory::Other, now);
        done.scheduled_at = now - Duration::days(1);
        done.last_completed_at = Some(now - Duration::days(3));

        let tasks = vec![late, done, soon, overdue];
        let filter = TaskFilter {
            now,
            ..TaskFilter::default()
        };
        let titles: Vec<&str> = filter_sorted(&tasks, &filter)
            .iter()
            .map(|task| task.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Replace filter", "Trim plants", "Water change"]);

        let with_completed = TaskFilter {
            show_completed: true,
            now,
            ..TaskFilter::default()
        };
        assert_eq!(filter_sorted(&tasks, &with_completed).len(), 4);
    }

    #[test]
    fn plant_search_covers_scientific_name_and_location_filter() {
        let now = Utc::now();
        let mut anubias = Plant::new("Anubias", now);
        anubias.scientific_name = Some("Anubias barteri".to_string());
        let mut frogbit = Plant::new("Frogbit", now);
        frogbit.location = PlantLocation::InQuarantine;

        let filter = PlantFilter {
            search: "BARTERI".to_string(),
            location: None,
        };
        assert!(filter.matches(&anubias));
        assert!(!filter.matches(&frogbit));

        let quarantined = PlantFilter {
            search: String::new(),
            location: Some(PlantLocation::InQuarantine),
        };
        assert!(quarantined.matches(&frogbit));
        assert!(!quarantined.matches(&anubias));
    }

    #[test]
    fn gallery_hides_treatment_photos_by_default() {
        let now = Utc.with_ymd_and_hms(2025, 4, 12, 14, 5, 9).unwrap();
        let portrait = FishPhoto::new("Flaring", "/img", "a.png", now);
        let mut fin = FishPhoto::new("Fin rot day 2", "/img", "b.png", now + Duration::hours(1));
        fin.is_treatment_photo = true;
        fin.treatment_plan_id = Some(4);
        let photos = vec![portrait, fin];

        let gallery = PhotoFilter::default();
        let shown = filter_sorted(&photos, &gallery);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].caption, "Flaring");

        let everything = PhotoFilter {
            include_treatment: true,
            ..PhotoFilter::default()
        };
        let shown = filter_sorted(&photos, &everything);
        assert_eq!(shown.len(), 2);
        assert_eq!(shown[0].caption, "Fin rot day 2");
    }

    #[test]
    fn note_tag_filter_is_exact_membership() {
        let now = Utc::now();
        let notes = vec![
            Note::new("Diet", "pellets", "food, routine", now),
            Note::new("Fins", "looking good", "health", now),
        ];
        let filter = NoteFilter {
            search: String::new(),
            tag: Some("food".to_string()),
        };
        assert_eq!(filter_sorted(&notes, &filter).len(), 1);

        let partial = NoteFilter {
            search: String::new(),
            tag: Some("foo".to_string()),
        };
        assert!(filter_sorted(&notes, &partial).is_empty());

        assert_eq!(distinct_note_tags(&notes), vec!["food", "health", "routine"]);
    }
}
