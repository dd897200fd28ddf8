//! The single fish profile every record belongs to.

use super::{require_text, RecordId, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Row id of the seeded profile.
pub const DEFAULT_FISH_ID: RecordId = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FishProfile {
    pub id: Option<RecordId>,
    pub name: String,
    pub species: String,
    pub variant: Option<String>,
    pub color: Option<String>,
    pub age: Option<String>,
    pub tank: Option<String>,
    pub acquired_on: Option<NaiveDate>,
    /// Either an emoji or a path into the image store.
    pub profile_picture: String,
    pub is_picture_emoji: bool,
}

impl FishProfile {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("species", &self.species)?;
        require_text("profile_picture", &self.profile_picture)
    }
}
