//! Treatment plans for an illness episode.
//!
//! # Responsibility
//! - Track the daily treatment log, symptom severities and progress photos.
//! - Apply lifecycle transitions (complete, discontinue).
//!
//! # Invariants
//! - `logs`, `symptoms` and each symptom `history` keep insertion order.
//! - Every symptom has at least one history entry (its initial observation).
//! - `photo_ids` holds no duplicates.
//! - `ended_at` is set exactly when status leaves `Active`.

use super::{check_index, require_text, text_enum, RecordId, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const INITIAL_OBSERVATION: &str = "Initial observation";
const COMPLETED_ACTION: &str = "Treatment completed";
const DISCONTINUED_ACTION: &str = "Treatment discontinued";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentStatus {
    #[default]
    Active,
    Completed,
    Discontinued,
}

text_enum!(TreatmentStatus {
    Active => "active",
    Completed => "completed",
    Discontinued => "discontinued",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymptomSeverity {
    None,
    Mild,
    Moderate,
    Severe,
}

text_enum!(SymptomSeverity {
    None => "none",
    Mild => "mild",
    Moderate => "moderate",
    Severe => "severe",
});

/// One dated entry of the treatment diary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentLog {
    pub date: DateTime<Utc>,
    pub actions: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomHistory {
    pub date: DateTime<Utc>,
    pub severity: SymptomSeverity,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symptom {
    pub name: String,
    /// Latest recorded severity; mirrors the last history entry.
    pub severity: SymptomSeverity,
    pub history: Vec<SymptomHistory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentPlan {
    pub id: Option<RecordId>,
    pub illness_name: String,
    pub description: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub status: TreatmentStatus,
    pub medication_notes: String,
    pub logs: Vec<TreatmentLog>,
    pub symptoms: Vec<Symptom>,
    pub photo_ids: Vec<RecordId>,
}

impl TreatmentPlan {
    pub fn new(illness_name: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            illness_name: illness_name.into(),
            description: String::new(),
            started_at,
            ended_at: None,
            status: TreatmentStatus::Active,
            medication_notes: String::new(),
            logs: Vec::new(),
            symptoms: Vec::new(),
            photo_ids: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == TreatmentStatus::Active
    }

    /// Appends a diary entry.
    pub fn add_log(
        &mut self,
        date: DateTime<Utc>,
        actions: impl Into<String>,
        notes: impl Into<String>,
    ) -> &TreatmentLog {
        self.logs.push(TreatmentLog {
            date,
            actions: actions.into(),
            notes: notes.into(),
        });
        &self.logs[self.logs.len() - 1]
    }

    /// Starts tracking a symptom; its history opens with the initial severity.
    pub fn add_symptom(
        &mut self,
        name: impl Into<String>,
        severity: SymptomSeverity,
        now: DateTime<Utc>,
    ) -> usize {
        self.symptoms.push(Symptom {
            name: name.into(),
            severity,
            history: vec![SymptomHistory {
                date: now,
                severity,
                notes: INITIAL_OBSERVATION.to_string(),
            }],
        });
        self.symptoms.len() - 1
    }

    /// Records a new severity for the symptom at `index`.
    pub fn update_symptom_severity(
        &mut self,
        index: usize,
        severity: SymptomSeverity,
        notes: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        check_index("symptom", index, self.symptoms.len())?;
        let symptom = &mut self.symptoms[index];
        symptom.severity = severity;
        symptom.history.push(SymptomHistory {
            date: now,
            severity,
            notes: notes.into(),
        });
        Ok(())
    }

    /// Closes the plan as completed with a final diary entry.
    pub fn complete(&mut self, outcome: impl Into<String>, now: DateTime<Utc>) {
        self.close(TreatmentStatus::Completed, COMPLETED_ACTION, outcome.into(), now);
    }

    /// Closes the plan as discontinued with a final diary entry.
    pub fn discontinue(&mut self, reason: impl Into<String>, now: DateTime<Utc>) {
        self.close(
            TreatmentStatus::Discontinued,
            DISCONTINUED_ACTION,
            reason.into(),
            now,
        );
    }

    fn close(
        &mut self,
        status: TreatmentStatus,
        action: &str,
        notes: String,
        now: DateTime<Utc>,
    ) {
        self.status = status;
        self.ended_at = Some(now);
        self.add_log(now, action, notes);
    }

    /// Links a photo; returns `false` when it was already linked.
    pub fn attach_photo(&mut self, photo_id: RecordId) -> bool {
        if self.photo_ids.contains(&photo_id) {
            return false;
        }
        self.photo_ids.push(photo_id);
        true
    }

    /// Unlinks a photo; returns `false` when it was not linked.
    pub fn detach_photo(&mut self, photo_id: RecordId) -> bool {
        let before = self.photo_ids.len();
        self.photo_ids.retain(|id| *id != photo_id);
        self.photo_ids.len() != before
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("illness_name", &self.illness_name)?;
        if let Some(ended_at) = self.ended_at {
            if ended_at < self.started_at {
                return Err(ValidationError::EndBeforeStart("ended_at"));
            }
        }
        for symptom in &self.symptoms {
            require_text("symptom.name", &symptom.name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{SymptomSeverity, TreatmentPlan, TreatmentStatus};
    use chrono::{Duration, Utc};

    #[test]
    fn add_symptom_seeds_history_and_updates_append() {
        let now = Utc::now();
        let mut plan = TreatmentPlan::new("fin rot", now);
        let index = plan.add_symptom("frayed fins", SymptomSeverity::Moderate, now);

        plan.update_symptom_severity(
            index,
            SymptomSeverity::Mild,
            "edges regrowing",
            now + Duration::days(3),
        )
        .unwrap();

        let symptom = &plan.symptoms[index];
        assert_eq!(symptom.severity, SymptomSeverity::Mild);
        assert_eq!(symptom.history.len(), 2);
        assert_eq!(symptom.history[0].notes, "Initial observation");
        assert_eq!(symptom.history[0].severity, SymptomSeverity::Moderate);
        assert_eq!(symptom.history[1].notes, "edges regrowing");
    }

    #[test]
    fn update_symptom_rejects_unknown_index() {
        let mut plan = TreatmentPlan::new("ich", Utc::now());
        assert!(plan
            .update_symptom_severity(0, SymptomSeverity::Mild, "", Utc::now())
            .is_err());
    }

    #[test]
    fn complete_sets_end_and_appends_final_log() {
        let start = Utc::now();
        let mut plan = TreatmentPlan::new("fin rot", start);
        plan.add_log(start, "salt bath", "1 tsp/gal");

        let end = start + Duration::days(10);
        plan.complete("fins fully regrown", end);

        assert_eq!(plan.status, TreatmentStatus::Completed);
        assert_eq!(plan.ended_at, Some(end));
        assert_eq!(plan.logs.len(), 2);
        assert_eq!(plan.logs[1].actions, "Treatment completed");
        assert_eq!(plan.logs[1].notes, "fins fully regrown");
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn photo_links_have_no_duplicates() {
        let mut plan = TreatmentPlan::new("velvet", Utc::now());
        assert!(plan.attach_photo(4));
        assert!(!plan.attach_photo(4));
        assert!(plan.attach_photo(9));
        assert_eq!(plan.photo_ids, vec![4, 9]);
        assert!(plan.detach_photo(4));
        assert!(!plan.detach_photo(4));
        assert_eq!(plan.photo_ids, vec![9]);
    }
}
