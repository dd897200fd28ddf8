//! Tank log repository contract and SQLite implementation.
//!
//! # Invariants
//! - Lists are ordered by `logged_at DESC, id DESC`.
//! - Water readings are stored as a JSON text column, `NULL` when absent.

use super::{
    expect_changed, from_epoch_ms, from_json_text, require_id, to_epoch_ms, to_json_text,
    RepoResult,
};
use crate::model::tank_log::{TankLog, WaterParameters};
use crate::model::RecordId;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ENTITY: &str = "tank log";

const TANK_LOG_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    logged_at,
    category,
    water_parameters
FROM tank_logs";

pub trait TankLogRepository {
    fn create_log(&self, log: &TankLog) -> RepoResult<RecordId>;
    fn update_log(&self, log: &TankLog) -> RepoResult<()>;
    fn delete_log(&self, id: RecordId) -> RepoResult<()>;
    fn get_log(&self, id: RecordId) -> RepoResult<Option<TankLog>>;
    fn list_logs(&self) -> RepoResult<Vec<TankLog>>;
}

pub struct SqliteTankLogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTankLogRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TankLogRepository for SqliteTankLogRepository<'_> {
    fn create_log(&self, log: &TankLog) -> RepoResult<RecordId> {
        log.validate()?;

        self.conn.execute(
            "INSERT INTO tank_logs (
                title,
                description,
                logged_at,
                category,
                water_parameters
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                log.title.as_str(),
                log.description.as_str(),
                to_epoch_ms(log.logged_at),
                log.category.as_str(),
                encode_water(log.water.as_ref())?,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_log(&self, log: &TankLog) -> RepoResult<()> {
        log.validate()?;
        let id = require_id(log.id, ENTITY)?;

        let changed = self.conn.execute(
            "UPDATE tank_logs
             SET
                title = ?1,
                description = ?2,
                logged_at = ?3,
                category = ?4,
                water_parameters = ?5
             WHERE id = ?6;",
            params![
                log.title.as_str(),
                log.description.as_str(),
                to_epoch_ms(log.logged_at),
                log.category.as_str(),
                encode_water(log.water.as_ref())?,
                id,
            ],
        )?;

        expect_changed(changed, ENTITY, id)
    }

    fn delete_log(&self, id: RecordId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tank_logs WHERE id = ?1;", [id])?;
        expect_changed(changed, ENTITY, id)
    }

    fn get_log(&self, id: RecordId) -> RepoResult<Option<TankLog>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TANK_LOG_SELECT_SQL} WHERE id = ?1;"))?;
        let raw = stmt.query_row([id], RawTankLog::from_row).optional()?;
        raw.map(RawTankLog::into_model).transpose()
    }

    fn list_logs(&self) -> RepoResult<Vec<TankLog>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TANK_LOG_SELECT_SQL} ORDER BY logged_at DESC, id DESC;"
        ))?;
        let rows = stmt.query_map([], RawTankLog::from_row)?;

        let mut logs = Vec::new();
        for raw in rows {
            logs.push(raw?.into_model()?);
        }
        Ok(logs)
    }
}

fn encode_water(water: Option<&WaterParameters>) -> RepoResult<Option<String>> {
    water
        .filter(|water| !water.is_empty())
        .map(|water| to_json_text(water, "tank_logs.water_parameters"))
        .transpose()
}

/// Column values as read, before domain conversion.
struct RawTankLog {
    id: RecordId,
    title: String,
    description: String,
    logged_at: i64,
    category: String,
    water_parameters: Option<String>,
}

impl RawTankLog {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            logged_at: row.get("logged_at")?,
            category: row.get("category")?,
            water_parameters: row.get("water_parameters")?,
        })
    }

    fn into_model(self) -> RepoResult<TankLog> {
        let water = self
            .water_parameters
            .as_deref()
            .map(|text| from_json_text(text, "tank_logs.water_parameters"))
            .transpose()?;

        let log = TankLog {
            id: Some(self.id),
            title: self.title,
            description: self.description,
            logged_at: from_epoch_ms(self.logged_at, "tank_logs.logged_at")?,
            category: self.category,
            water,
        };
        log.validate()?;
        Ok(log)
    }
}
