//! Note use-case service.
//!
//! # Invariants
//! - `update_note` replaces title, content and tags as a whole and always
//!   bumps `modified_at`.

use super::{found, read_back, ServiceResult};
use crate::model::note::Note;
use crate::model::RecordId;
use crate::repo::note_repo::NoteRepository;
use chrono::{DateTime, Utc};

const ENTITY: &str = "note";

pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_note(&self, note: &Note) -> ServiceResult<Note> {
        let id = self.repo.create_note(note)?;
        read_back(self.repo.get_note(id)?, "created note not found in read-back")
    }

    /// Replaces the editable fields of note `id`.
    pub fn update_note(
        &self,
        id: RecordId,
        title: &str,
        content: &str,
        tags: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<Note> {
        let mut note = self.get_note(id)?;
        note.update(title, content, tags, now);
        self.repo.update_note(&note)?;
        Ok(note)
    }

    pub fn delete_note(&self, id: RecordId) -> ServiceResult<()> {
        Ok(self.repo.delete_note(id)?)
    }

    pub fn get_note(&self, id: RecordId) -> ServiceResult<Note> {
        found(self.repo.get_note(id)?, ENTITY, id)
    }

    pub fn list_notes(&self) -> ServiceResult<Vec<Note>> {
        Ok(self.repo.list_notes()?)
    }
}
