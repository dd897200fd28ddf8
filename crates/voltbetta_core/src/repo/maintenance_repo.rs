//! Maintenance task repository contract and SQLite implementation.
//!
//! # Invariants
//! - Lists are ordered by `scheduled_at ASC, id ASC`.
//! - `recurrence_days` is persisted for one-off tasks too, so toggling
//!   recurrence later keeps the chosen interval.

use super::{
    bool_to_int, expect_changed, from_epoch_ms, from_optional_epoch_ms, int_to_bool, parse_enum,
    require_id, to_epoch_ms, RepoError, RepoResult,
};
use crate::model::maintenance::{MaintenanceCategory, MaintenanceTask};
use crate::model::RecordId;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ENTITY: &str = "maintenance task";

const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    category,
    scheduled_at,
    is_recurring,
    recurrence_days,
    last_completed_at,
    notifications_enabled,
    notification_id
FROM maintenance_tasks";

pub trait MaintenanceRepository {
    fn create_task(&self, task: &MaintenanceTask) -> RepoResult<RecordId>;
    fn update_task(&self, task: &MaintenanceTask) -> RepoResult<()>;
    fn delete_task(&self, id: RecordId) -> RepoResult<()>;
    fn get_task(&self, id: RecordId) -> RepoResult<Option<MaintenanceTask>>;
    fn list_tasks(&self) -> RepoResult<Vec<MaintenanceTask>>;
}

pub struct SqliteMaintenanceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMaintenanceRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl MaintenanceRepository for SqliteMaintenanceRepository<'_> {
    fn create_task(&self, task: &MaintenanceTask) -> RepoResult<RecordId> {
        task.validate()?;

        self.conn.execute(
            "INSERT INTO maintenance_tasks (
                title,
                description,
                category,
                scheduled_at,
                is_recurring,
                recurrence_days,
                last_completed_at,
                notifications_enabled,
                notification_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                task.title.as_str(),
                task.description.as_str(),
                task.category.as_str(),
                to_epoch_ms(task.scheduled_at),
                bool_to_int(task.is_recurring),
                task.recurrence_days,
                task.last_completed_at.map(to_epoch_ms),
                bool_to_int(task.notifications_enabled),
                task.notification_id.as_str(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_task(&self, task: &MaintenanceTask) -> RepoResult<()> {
        task.validate()?;
        let id = require_id(task.id, ENTITY)?;

        let changed = self.conn.execute(
            "UPDATE maintenance_tasks
             SET
                title = ?1,
                description = ?2,
                category = ?3,
                scheduled_at = ?4,
                is_recurring = ?5,
                recurrence_days = ?6,
                last_completed_at = ?7,
                notifications_enabled = ?8,
                notification_id = ?9
             WHERE id = ?10;",
            params![
                task.title.as_str(),
                task.description.as_str(),
                task.category.as_str(),
                to_epoch_ms(task.scheduled_at),
                bool_to_int(task.is_recurring),
                task.recurrence_days,
                task.last_completed_at.map(to_epoch_ms),
                bool_to_int(task.notifications_enabled),
                task.notification_id.as_str(),
                id,
            ],
        )?;

        expect_changed(changed, ENTITY, id)
    }

    fn delete_task(&self, id: RecordId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM maintenance_tasks WHERE id = ?1;", [id])?;
        expect_changed(changed, ENTITY, id)
    }

    fn get_task(&self, id: RecordId) -> RepoResult<Option<MaintenanceTask>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
        let raw = stmt.query_row([id], RawTask::from_row).optional()?;
        raw.map(RawTask::into_model).transpose()
    }

    fn list_tasks(&self) -> RepoResult<Vec<MaintenanceTask>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL} ORDER BY scheduled_at ASC, id ASC;"
        ))?;
        let rows = stmt.query_map([], RawTask::from_row)?;

        let mut tasks = Vec::new();
        for raw in rows {
            tasks.push(raw?.into_model()?);
        }
        Ok(tasks)
    }
}

struct RawTask {
    id: RecordId,
    title: String,
    description: String,
    category: String,
    scheduled_at: i64,
    is_recurring: i64,
    recurrence_days: i64,
    last_completed_at: Option<i64>,
    notifications_enabled: i64,
    notification_id: String,
}

impl RawTask {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            category: row.get("category")?,
            scheduled_at: row.get("scheduled_at")?,
            is_recurring: row.get("is_recurring")?,
            recurrence_days: row.get("recurrence_days")?,
            last_completed_at: row.get("last_completed_at")?,
            notifications_enabled: row.get("notifications_enabled")?,
            notification_id: row.get("notification_id")?,
        })
    }

    fn into_model(self) -> RepoResult<MaintenanceTask> {
        let recurrence_days = u32::try_from(self.recurrence_days).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid recurrence `{}` in maintenance_tasks.recurrence_days",
                self.recurrence_days
            ))
        })?;

        let task = MaintenanceTask {
            id: Some(self.id),
            title: self.title,
            description: self.description,
            category: parse_enum(
                &self.category,
                "maintenance_tasks.category",
                MaintenanceCategory::parse,
            )?,
            scheduled_at: from_epoch_ms(self.scheduled_at, "maintenance_tasks.scheduled_at")?,
            is_recurring: int_to_bool(self.is_recurring, "maintenance_tasks.is_recurring")?,
            recurrence_days,
            last_completed_at: from_optional_epoch_ms(
                self.last_completed_at,
                "maintenance_tasks.last_completed_at",
            )?,
            notifications_enabled: int_to_bool(
                self.notifications_enabled,
                "maintenance_tasks.notifications_enabled",
            )?,
            notification_id: self.notification_id,
        };
        task.validate()?;
        Ok(task)
    }
}
