//! Note repository contract and SQLite implementation.
//!
//! # Invariants
//! - Lists are ordered by `modified_at DESC, id DESC`.
//! - Tags are stored exactly as typed; splitting happens in the model.

use super::{expect_changed, from_epoch_ms, require_id, to_epoch_ms, RepoResult};
use crate::model::note::Note;
use crate::model::RecordId;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ENTITY: &str = "note";

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    created_at,
    modified_at,
    tags
FROM notes";

pub trait NoteRepository {
    fn create_note(&self, note: &Note) -> RepoResult<RecordId>;
    fn update_note(&self, note: &Note) -> RepoResult<()>;
    fn delete_note(&self, id: RecordId) -> RepoResult<()>;
    fn get_note(&self, id: RecordId) -> RepoResult<Option<Note>>;
    fn list_notes(&self) -> RepoResult<Vec<Note>>;
}

pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create_note(&self, note: &Note) -> RepoResult<RecordId> {
        note.validate()?;

        self.conn.execute(
            "INSERT INTO notes (title, content, created_at, modified_at, tags)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                note.title.as_str(),
                note.content.as_str(),
                to_epoch_ms(note.created_at),
                to_epoch_ms(note.modified_at),
                note.tags.as_str(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_note(&self, note: &Note) -> RepoResult<()> {
        note.validate()?;
        let id = require_id(note.id, ENTITY)?;

        let changed = self.conn.execute(
            "UPDATE notes
             SET
                title = ?1,
                content = ?2,
                created_at = ?3,
                modified_at = ?4,
                tags = ?5
             WHERE id = ?6;",
            params![
                note.title.as_str(),
                note.content.as_str(),
                to_epoch_ms(note.created_at),
                to_epoch_ms(note.modified_at),
                note.tags.as_str(),
                id,
            ],
        )?;

        expect_changed(changed, ENTITY, id)
    }

    fn delete_note(&self, id: RecordId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM notes WHERE id = ?1;", [id])?;
        expect_changed(changed, ENTITY, id)
    }

    fn get_note(&self, id: RecordId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let raw = stmt.query_row([id], RawNote::from_row).optional()?;
        raw.map(RawNote::into_model).transpose()
    }

    fn list_notes(&self) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL} ORDER BY modified_at DESC, id DESC;"
        ))?;
        let rows = stmt.query_map([], RawNote::from_row)?;

        let mut notes = Vec::new();
        for raw in rows {
            notes.push(raw?.into_model()?);
        }
        Ok(notes)
    }
}

struct RawNote {
    id: RecordId,
    title: String,
    content: String,
    created_at: i64,
    modified_at: i64,
    tags: String,
}

impl RawNote {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            content: row.get("content")?,
            created_at: row.get("created_at")?,
            modified_at: row.get("modified_at")?,
            tags: row.get("tags")?,
        })
    }

    fn into_model(self) -> RepoResult<Note> {
        let note = Note {
            id: Some(self.id),
            title: self.title,
            content: self.content,
            created_at: from_epoch_ms(self.created_at, "notes.created_at")?,
            modified_at: from_epoch_ms(self.modified_at, "notes.modified_at")?,
            tags: self.tags,
        };
        note.validate()?;
        Ok(note)
    }
}
