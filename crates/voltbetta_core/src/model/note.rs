//! Free-form notes with comma-separated tags.

use super::{require_text, RecordId, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: Option<RecordId>,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    /// Comma-separated tag list as typed by the user.
    pub tags: String,
}

impl Note {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        tags: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            content: content.into(),
            created_at: now,
            modified_at: now,
            tags: tags.into(),
        }
    }

    /// Replaces the editable fields and bumps `modified_at`.
    pub fn update(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
        tags: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        self.title = title.into();
        self.content = content.into();
        self.tags = tags.into();
        self.modified_at = now;
    }

    /// Trimmed, non-empty tags in written order.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .collect()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag_list().contains(&tag.trim())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        if self.modified_at < self.created_at {
            return Err(ValidationError::EndBeforeStart("modified_at"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Note;
    use chrono::{Duration, Utc};

    #[test]
    fn tag_list_trims_and_skips_empty_entries() {
        let note = Note::new("t", "c", " plants, water ,, fin rot ", Utc::now());
        assert_eq!(note.tag_list(), vec!["plants", "water", "fin rot"]);
        assert!(note.has_tag("water"));
        assert!(!note.has_tag("wat"));
    }

    #[test]
    fn update_bumps_modified_only() {
        let created = Utc::now();
        let mut note = Note::new("t", "c", "", created);
        let later = created + Duration::minutes(5);
        note.update("t2", "c2", "a", later);
        assert_eq!(note.created_at, created);
        assert_eq!(note.modified_at, later);
        assert_eq!(note.title, "t2");
    }
}
