//! Plant repository contract and SQLite implementation.
//!
//! # Invariants
//! - Lists are ordered by `name` (case-insensitive), then `id`.
//! - `issues` is a JSON array column; order is preserved verbatim.

use super::{
    expect_changed, from_epoch_ms, from_json_text, parse_enum, require_id, to_epoch_ms,
    to_json_text, RepoResult,
};
use crate::model::plant::{LightLevel, Plant, PlantLocation};
use crate::model::RecordId;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ENTITY: &str = "plant";

const PLANT_SELECT_SQL: &str = "SELECT
    id,
    name,
    scientific_name,
    added_at,
    care_notes,
    location,
    light,
    issues
FROM plants";

pub trait PlantRepository {
    fn create_plant(&self, plant: &Plant) -> RepoResult<RecordId>;
    fn update_plant(&self, plant: &Plant) -> RepoResult<()>;
    fn delete_plant(&self, id: RecordId) -> RepoResult<()>;
    fn get_plant(&self, id: RecordId) -> RepoResult<Option<Plant>>;
    fn list_plants(&self) -> RepoResult<Vec<Plant>>;
}

pub struct SqlitePlantRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePlantRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PlantRepository for SqlitePlantRepository<'_> {
    fn create_plant(&self, plant: &Plant) -> RepoResult<RecordId> {
        plant.validate()?;

        self.conn.execute(
            "INSERT INTO plants (
                name,
                scientific_name,
                added_at,
                care_notes,
                location,
                light,
                issues
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                plant.name.as_str(),
                plant.scientific_name.as_deref(),
                to_epoch_ms(plant.added_at),
                plant.care_notes.as_str(),
                plant.location.as_str(),
                plant.light.as_str(),
                to_json_text(&plant.issues, "plants.issues")?,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_plant(&self, plant: &Plant) -> RepoResult<()> {
        plant.validate()?;
        let id = require_id(plant.id, ENTITY)?;

        let changed = self.conn.execute(
            "UPDATE plants
             SET
                name = ?1,
                scientific_name = ?2,
                added_at = ?3,
                care_notes = ?4,
                location = ?5,
                light = ?6,
                issues = ?7
             WHERE id = ?8;",
            params![
                plant.name.as_str(),
                plant.scientific_name.as_deref(),
                to_epoch_ms(plant.added_at),
                plant.care_notes.as_str(),
                plant.location.as_str(),
                plant.light.as_str(),
                to_json_text(&plant.issues, "plants.issues")?,
                id,
            ],
        )?;

        expect_changed(changed, ENTITY, id)
    }

    fn delete_plant(&self, id: RecordId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM plants WHERE id = ?1;", [id])?;
        expect_changed(changed, ENTITY, id)
    }

    fn get_plant(&self, id: RecordId) -> RepoResult<Option<Plant>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PLANT_SELECT_SQL} WHERE id = ?1;"))?;
        let raw = stmt.query_row([id], RawPlant::from_row).optional()?;
        raw.map(RawPlant::into_model).transpose()
    }

    fn list_plants(&self) -> RepoResult<Vec<Plant>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PLANT_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, id ASC;"
        ))?;
        let rows = stmt.query_map([], RawPlant::from_row)?;

        let mut plants = Vec::new();
        for raw in rows {
            plants.push(raw?.into_model()?);
        }
        Ok(plants)
    }
}

struct RawPlant {
    id: RecordId,
    name: String,
    scientific_name: Option<String>,
    added_at: i64,
    care_notes: String,
    location: String,
    light: String,
    issues: String,
}

impl RawPlant {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            scientific_name: row.get("scientific_name")?,
            added_at: row.get("added_at")?,
            care_notes: row.get("care_notes")?,
            location: row.get("location")?,
            light: row.get("light")?,
            issues: row.get("issues")?,
        })
    }

    fn into_model(self) -> RepoResult<Plant> {
        let plant = Plant {
            id: Some(self.id),
            name: self.name,
            scientific_name: self.scientific_name,
            added_at: from_epoch_ms(self.added_at, "plants.added_at")?,
            care_notes: self.care_notes,
            location: parse_enum(&self.location, "plants.location", PlantLocation::parse)?,
            light: parse_enum(&self.light, "plants.light", LightLevel::parse)?,
            issues: from_json_text(&self.issues, "plants.issues")?,
        };
        plant.validate()?;
        Ok(plant)
    }
}
