//! Photo records pointing at files in the image store.

use super::{require_text, RecordId, ValidationError, DEFAULT_CATEGORY};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FishPhoto {
    pub id: Option<RecordId>,
    pub caption: String,
    pub taken_at: DateTime<Utc>,
    /// Directory holding the stored copy.
    pub directory: String,
    pub file_name: String,
    pub category: String,
    pub is_treatment_photo: bool,
    /// Owning treatment plan, by convention only.
    pub treatment_plan_id: Option<RecordId>,
}

impl FishPhoto {
    pub fn new(
        caption: impl Into<String>,
        directory: impl Into<String>,
        file_name: impl Into<String>,
        taken_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            caption: caption.into(),
            taken_at,
            directory: directory.into(),
            file_name: file_name.into(),
            category: DEFAULT_CATEGORY.to_string(),
            is_treatment_photo: false,
            treatment_plan_id: None,
        }
    }

    pub fn full_path(&self) -> PathBuf {
        PathBuf::from(&self.directory).join(&self.file_name)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("directory", &self.directory)?;
        require_text("file_name", &self.file_name)
    }
}
