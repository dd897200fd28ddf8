//! Schema steps, applied in order.
//!
//! # Invariants
//! - Step versions start at 1 and never repeat or go backwards.
//! - Each step and its `user_version` stamp commit together.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;

/// `(version, name, sql)`
type Step = (u32, &'static str, &'static str);

const STEPS: &[Step] = &[
    (1, "init", include_str!("0001_init.sql")),
    (2, "fish_profile", include_str!("0002_fish_profile.sql")),
];

/// Highest schema version this build knows how to produce.
pub fn latest_version() -> u32 {
    STEPS.iter().map(|(version, _, _)| *version).max().unwrap_or(0)
}

/// Brings `conn` up to [`latest_version`].
///
/// Each pending step runs in its own transaction, so a failure keeps every
/// earlier step and reports the one that broke as `DbError::Migration`.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = current_user_version(conn)?;
    let latest = latest_version();
    if found > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: latest,
        });
    }

    for &(version, name, sql) in STEPS.iter().filter(|(version, _, _)| *version > found) {
        run_step(conn, version, sql).map_err(|source| {
            error!("event=db_migrate module=db status=error version={version} name={name}");
            DbError::Migration {
                version,
                name,
                source,
            }
        })?;
        info!("event=db_migrate module=db status=ok version={version} name={name}");
    }
    Ok(())
}

fn run_step(conn: &mut Connection, version: u32, sql: &str) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(sql)?;
    tx.pragma_update(None, "user_version", version)?;
    tx.commit()
}

/// Schema version stamped on the open file, `0` for a fresh one.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
