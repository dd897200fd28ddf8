//! Plants kept in or around the tank, with an issue history.
//!
//! # Invariants
//! - `issues` keeps insertion order; indexes handed out by `add_issue` stay
//!   valid because issues are never removed.

use super::{check_index, require_text, text_enum, RecordId, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlantLocation {
    #[default]
    InTank,
    InQuarantine,
    InPreparation,
    Removed,
}

text_enum!(PlantLocation {
    InTank => "in_tank",
    InQuarantine => "in_quarantine",
    InPreparation => "in_preparation",
    Removed => "removed",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightLevel {
    Low,
    #[default]
    Medium,
    High,
}

text_enum!(LightLevel {
    Low => "low",
    Medium => "medium",
    High => "high",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Minor,
    Moderate,
    Severe,
}

text_enum!(IssueSeverity {
    Minor => "minor",
    Moderate => "moderate",
    Severe => "severe",
});

/// One problem observed on a plant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantIssue {
    pub description: String,
    pub severity: IssueSeverity,
    pub identified_at: DateTime<Utc>,
    pub is_resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resolution_notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plant {
    pub id: Option<RecordId>,
    pub name: String,
    pub scientific_name: Option<String>,
    pub added_at: DateTime<Utc>,
    pub care_notes: String,
    pub location: PlantLocation,
    pub light: LightLevel,
    pub issues: Vec<PlantIssue>,
}

impl Plant {
    pub fn new(name: impl Into<String>, added_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            name: name.into(),
            scientific_name: None,
            added_at,
            care_notes: String::new(),
            location: PlantLocation::default(),
            light: LightLevel::default(),
            issues: Vec::new(),
        }
    }

    /// Appends an unresolved issue and returns its index.
    pub fn add_issue(
        &mut self,
        description: impl Into<String>,
        severity: IssueSeverity,
        identified_at: DateTime<Utc>,
    ) -> usize {
        self.issues.push(PlantIssue {
            description: description.into(),
            severity,
            identified_at,
            is_resolved: false,
            resolved_at: None,
            resolution_notes: String::new(),
        });
        self.issues.len() - 1
    }

    /// Marks the issue at `index` as resolved.
    pub fn resolve_issue(
        &mut self,
        index: usize,
        resolved_at: DateTime<Utc>,
        notes: impl Into<String>,
    ) -> Result<(), ValidationError> {
        check_index("issue", index, self.issues.len())?;
        let issue = &mut self.issues[index];
        issue.is_resolved = true;
        issue.resolved_at = Some(resolved_at);
        issue.resolution_notes = notes.into();
        Ok(())
    }

    pub fn open_issues(&self) -> impl Iterator<Item = &PlantIssue> {
        self.issues.iter().filter(|issue| !issue.is_resolved)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        for issue in &self.issues {
            require_text("issue.description", &issue.description)?;
            if let Some(resolved_at) = issue.resolved_at {
                if resolved_at < issue.identified_at {
                    return Err(ValidationError::EndBeforeStart("issue.resolved_at"));
                }
            }
        }
        Ok(())
    }
}
