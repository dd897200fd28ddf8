//! Treatment plan repository contract and SQLite implementation.
//!
//! # Invariants
//! - Lists are ordered by `started_at DESC, id DESC`.
//! - `logs`, `symptoms` and `photo_ids` are JSON array columns written and
//!   read as a whole with the owning row.

use super::{
    expect_changed, from_epoch_ms, from_json_text, from_optional_epoch_ms, parse_enum,
    require_id, to_epoch_ms, to_json_text, RepoResult,
};
use crate::model::treatment::{TreatmentPlan, TreatmentStatus};
use crate::model::RecordId;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ENTITY: &str = "treatment plan";

const PLAN_SELECT_SQL: &str = "SELECT
    id,
    illness_name,
    description,
    started_at,
    ended_at,
    status,
    medication_notes,
    logs,
    symptoms,
    photo_ids
FROM treatment_plans";

pub trait TreatmentRepository {
    fn create_plan(&self, plan: &TreatmentPlan) -> RepoResult<RecordId>;
    fn update_plan(&self, plan: &TreatmentPlan) -> RepoResult<()>;
    fn delete_plan(&self, id: RecordId) -> RepoResult<()>;
    fn get_plan(&self, id: RecordId) -> RepoResult<Option<TreatmentPlan>>;
    fn list_plans(&self) -> RepoResult<Vec<TreatmentPlan>>;
}

pub struct SqliteTreatmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTreatmentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TreatmentRepository for SqliteTreatmentRepository<'_> {
    fn create_plan(&self, plan: &TreatmentPlan) -> RepoResult<RecordId> {
        plan.validate()?;

        self.conn.execute(
            "INSERT INTO treatment_plans (
                illness_name,
                description,
                started_at,
                ended_at,
                status,
                medication_notes,
                logs,
                symptoms,
                photo_ids
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                plan.illness_name.as_str(),
                plan.description.as_str(),
                to_epoch_ms(plan.started_at),
                plan.ended_at.map(to_epoch_ms),
                plan.status.as_str(),
                plan.medication_notes.as_str(),
                to_json_text(&plan.logs, "treatment_plans.logs")?,
                to_json_text(&plan.symptoms, "treatment_plans.symptoms")?,
                to_json_text(&plan.photo_ids, "treatment_plans.photo_ids")?,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_plan(&self, plan: &TreatmentPlan) -> RepoResult<()> {
        plan.validate()?;
        let id = require_id(plan.id, ENTITY)?;

        let changed = self.conn.execute(
            "UPDATE treatment_plans
             SET
                illness_name = ?1,
                description = ?2,
                started_at = ?3,
                ended_at = ?4,
                status = ?5,
                medication_notes = ?6,
                logs = ?7,
                symptoms = ?8,
                photo_ids = ?9
             WHERE id = ?10;",
            params![
                plan.illness_name.as_str(),
                plan.description.as_str(),
                to_epoch_ms(plan.started_at),
                plan.ended_at.map(to_epoch_ms),
                plan.status.as_str(),
                plan.medication_notes.as_str(),
                to_json_text(&plan.logs, "treatment_plans.logs")?,
                to_json_text(&plan.symptoms, "treatment_plans.symptoms")?,
                to_json_text(&plan.photo_ids, "treatment_plans.photo_ids")?,
                id,
            ],
        )?;

        expect_changed(changed, ENTITY, id)
    }

    fn delete_plan(&self, id: RecordId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM treatment_plans WHERE id = ?1;", [id])?;
        expect_changed(changed, ENTITY, id)
    }

    fn get_plan(&self, id: RecordId) -> RepoResult<Option<TreatmentPlan>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PLAN_SELECT_SQL} WHERE id = ?1;"))?;
        let raw = stmt.query_row([id], RawPlan::from_row).optional()?;
        raw.map(RawPlan::into_model).transpose()
    }

    fn list_plans(&self) -> RepoResult<Vec<TreatmentPlan>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PLAN_SELECT_SQL} ORDER BY started_at DESC, id DESC;"
        ))?;
        let rows = stmt.query_map([], RawPlan::from_row)?;

        let mut plans = Vec::new();
        for raw in rows {
            plans.push(raw?.into_model()?);
        }
        Ok(plans)
    }
}

struct RawPlan {
    id: RecordId,
    illness_name: String,
    description: String,
    started_at: i64,
    ended_at: Option<i64>,
    status: String,
    medication_notes: String,
    logs: String,
    symptoms: String,
    photo_ids: String,
}

impl RawPlan {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            illness_name: row.get("illness_name")?,
            description: row.get("description")?,
            started_at: row.get("started_at")?,
            ended_at: row.get("ended_at")?,
            status: row.get("status")?,
            medication_notes: row.get("medication_notes")?,
            logs: row.get("logs")?,
            symptoms: row.get("symptoms")?,
            photo_ids: row.get("photo_ids")?,
        })
    }

    fn into_model(self) -> RepoResult<TreatmentPlan> {
        let plan = TreatmentPlan {
            id: Some(self.id),
            illness_name: self.illness_name,
            description: self.description,
            started_at: from_epoch_ms(self.started_at, "treatment_plans.started_at")?,
            ended_at: from_optional_epoch_ms(self.ended_at, "treatment_plans.ended_at")?,
            status: parse_enum(
                &self.status,
                "treatment_plans.status",
                TreatmentStatus::parse,
            )?,
            medication_notes: self.medication_notes,
            logs: from_json_text(&self.logs, "treatment_plans.logs")?,
            symptoms: from_json_text(&self.symptoms, "treatment_plans.symptoms")?,
            photo_ids: from_json_text(&self.photo_ids, "treatment_plans.photo_ids")?,
        };
        plan.validate()?;
        Ok(plan)
    }
}
