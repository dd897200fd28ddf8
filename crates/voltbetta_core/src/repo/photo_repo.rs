//! Photo repository contract and SQLite implementation.
//!
//! # Invariants
//! - Lists are ordered by `taken_at DESC, id DESC`.
//! - `treatment_plan_id` is not a foreign key; links are kept by convention.

use super::{
    bool_to_int, expect_changed, from_epoch_ms, int_to_bool, require_id, to_epoch_ms, RepoResult,
};
use crate::model::photo::FishPhoto;
use crate::model::RecordId;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ENTITY: &str = "photo";

const PHOTO_SELECT_SQL: &str = "SELECT
    id,
    caption,
    taken_at,
    directory,
    file_name,
    category,
    is_treatment_photo,
    treatment_plan_id
FROM fish_photos";

pub trait PhotoRepository {
    fn create_photo(&self, photo: &FishPhoto) -> RepoResult<RecordId>;
    fn update_photo(&self, photo: &FishPhoto) -> RepoResult<()>;
    fn delete_photo(&self, id: RecordId) -> RepoResult<()>;
    fn get_photo(&self, id: RecordId) -> RepoResult<Option<FishPhoto>>;
    fn list_photos(&self) -> RepoResult<Vec<FishPhoto>>;
    fn list_for_treatment(&self, plan_id: RecordId) -> RepoResult<Vec<FishPhoto>>;
}

pub struct SqlitePhotoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePhotoRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query(&self, sql: &str, params: impl rusqlite::Params) -> RepoResult<Vec<FishPhoto>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, RawPhoto::from_row)?;

        let mut photos = Vec::new();
        for raw in rows {
            photos.push(raw?.into_model()?);
        }
        Ok(photos)
    }
}

impl PhotoRepository for SqlitePhotoRepository<'_> {
    fn create_photo(&self, photo: &FishPhoto) -> RepoResult<RecordId> {
        photo.validate()?;

        self.conn.execute(
            "INSERT INTO fish_photos (
                caption,
                taken_at,
                directory,
                file_name,
                category,
                is_treatment_photo,
                treatment_plan_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                photo.caption.as_str(),
                to_epoch_ms(photo.taken_at),
                photo.directory.as_str(),
                photo.file_name.as_str(),
                photo.category.as_str(),
                bool_to_int(photo.is_treatment_photo),
                photo.treatment_plan_id,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_photo(&self, photo: &FishPhoto) -> RepoResult<()> {
        photo.validate()?;
        let id = require_id(photo.id, ENTITY)?;

        let changed = self.conn.execute(
            "UPDATE fish_photos
             SET
                caption = ?1,
                taken_at = ?2,
                directory = ?3,
                file_name = ?4,
                category = ?5,
                is_treatment_photo = ?6,
                treatment_plan_id = ?7
             WHERE id = ?8;",
            params![
                photo.caption.as_str(),
                to_epoch_ms(photo.taken_at),
                photo.directory.as_str(),
                photo.file_name.as_str(),
                photo.category.as_str(),
                bool_to_int(photo.is_treatment_photo),
                photo.treatment_plan_id,
                id,
            ],
        )?;

        expect_changed(changed, ENTITY, id)
    }

    fn delete_photo(&self, id: RecordId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM fish_photos WHERE id = ?1;", [id])?;
        expect_changed(changed, ENTITY, id)
    }

    fn get_photo(&self, id: RecordId) -> RepoResult<Option<FishPhoto>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PHOTO_SELECT_SQL} WHERE id = ?1;"))?;
        let raw = stmt.query_row([id], RawPhoto::from_row).optional()?;
        raw.map(RawPhoto::into_model).transpose()
    }

    fn list_photos(&self) -> RepoResult<Vec<FishPhoto>> {
        self.query(
            &format!("{PHOTO_SELECT_SQL} ORDER BY taken_at DESC, id DESC;"),
            [],
        )
    }

    fn list_for_treatment(&self, plan_id: RecordId) -> RepoResult<Vec<FishPhoto>> {
        self.query(
            &format!(
                "{PHOTO_SELECT_SQL}
                 WHERE treatment_plan_id = ?1
                 ORDER BY taken_at DESC, id DESC;"
            ),
            [plan_id],
        )
    }
}

struct RawPhoto {
    id: RecordId,
    caption: String,
    taken_at: i64,
    directory: String,
    file_name: String,
    category: String,
    is_treatment_photo: i64,
    treatment_plan_id: Option<RecordId>,
}

impl RawPhoto {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            caption: row.get("caption")?,
            taken_at: row.get("taken_at")?,
            directory: row.get("directory")?,
            file_name: row.get("file_name")?,
            category: row.get("category")?,
            is_treatment_photo: row.get("is_treatment_photo")?,
            treatment_plan_id: row.get("treatment_plan_id")?,
        })
    }

    fn into_model(self) -> RepoResult<FishPhoto> {
        let photo = FishPhoto {
            id: Some(self.id),
            caption: self.caption,
            taken_at: from_epoch_ms(self.taken_at, "fish_photos.taken_at")?,
            directory: self.directory,
            file_name: self.file_name,
            category: self.category,
            is_treatment_photo: int_to_bool(
                self.is_treatment_photo,
                "fish_photos.is_treatment_photo",
            )?,
            treatment_plan_id: self.treatment_plan_id,
        };
        photo.validate()?;
        Ok(photo)
    }
}
