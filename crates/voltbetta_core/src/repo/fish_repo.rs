//! Fish profile repository.
//!
//! The profile row is created by migration; callers read and update it but
//! never create or delete it.

use super::{bool_to_int, expect_changed, int_to_bool, require_id, RepoError, RepoResult};
use crate::model::fish::FishProfile;
use crate::model::RecordId;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ENTITY: &str = "fish profile";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub trait FishRepository {
    fn get_profile(&self, id: RecordId) -> RepoResult<Option<FishProfile>>;
    fn list_profiles(&self) -> RepoResult<Vec<FishProfile>>;
    fn update_profile(&self, profile: &FishProfile) -> RepoResult<()>;
}

pub struct SqliteFishRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFishRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

const FISH_SELECT_SQL: &str = "SELECT
    id,
    name,
    species,
    variant,
    color,
    age,
    tank,
    acquired_on,
    profile_picture,
    is_picture_emoji
FROM fish_profile";

impl FishRepository for SqliteFishRepository<'_> {
    fn get_profile(&self, id: RecordId) -> RepoResult<Option<FishProfile>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{FISH_SELECT_SQL} WHERE id = ?1;"))?;
        let raw = stmt.query_row([id], RawFish::from_row).optional()?;
        raw.map(RawFish::into_model).transpose()
    }

    fn list_profiles(&self) -> RepoResult<Vec<FishProfile>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{FISH_SELECT_SQL} ORDER BY id ASC;"))?;
        let rows = stmt.query_map([], RawFish::from_row)?;

        let mut profiles = Vec::new();
        for raw in rows {
            profiles.push(raw?.into_model()?);
        }
        Ok(profiles)
    }

    fn update_profile(&self, profile: &FishProfile) -> RepoResult<()> {
        profile.validate()?;
        let id = require_id(profile.id, ENTITY)?;

        let changed = self.conn.execute(
            "UPDATE fish_profile
             SET
                name = ?1,
                species = ?2,
                variant = ?3,
                color = ?4,
                age = ?5,
                tank = ?6,
                acquired_on = ?7,
                profile_picture = ?8,
                is_picture_emoji = ?9
             WHERE id = ?10;",
            params![
                profile.name.as_str(),
                profile.species.as_str(),
                profile.variant.as_deref(),
                profile.color.as_deref(),
                profile.age.as_deref(),
                profile.tank.as_deref(),
                profile
                    .acquired_on
                    .map(|date| date.format(DATE_FORMAT).to_string()),
                profile.profile_picture.as_str(),
                bool_to_int(profile.is_picture_emoji),
                id,
            ],
        )?;

        expect_changed(changed, ENTITY, id)
    }
}

struct RawFish {
    id: RecordId,
    name: String,
    species: String,
    variant: Option<String>,
    color: Option<String>,
    age: Option<String>,
    tank: Option<String>,
    acquired_on: Option<String>,
    profile_picture: String,
    is_picture_emoji: i64,
}

impl RawFish {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            species: row.get("species")?,
            variant: row.get("variant")?,
            color: row.get("color")?,
            age: row.get("age")?,
            tank: row.get("tank")?,
            acquired_on: row.get("acquired_on")?,
            profile_picture: row.get("profile_picture")?,
            is_picture_emoji: row.get("is_picture_emoji")?,
        })
    }

    fn into_model(self) -> RepoResult<FishProfile> {
        let acquired_on = match self.acquired_on.as_deref() {
            Some(text) => Some(NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| {
                RepoError::InvalidData(format!("invalid date `{text}` in fish_profile.acquired_on"))
            })?),
            None => None,
        };

        let profile = FishProfile {
            id: Some(self.id),
            name: self.name,
            species: self.species,
            variant: self.variant,
            color: self.color,
            age: self.age,
            tank: self.tank,
            acquired_on,
            profile_picture: self.profile_picture,
            is_picture_emoji: int_to_bool(self.is_picture_emoji, "fish_profile.is_picture_emoji")?,
        };
        profile.validate()?;
        Ok(profile)
    }
}
