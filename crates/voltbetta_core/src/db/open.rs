//! Connection setup.
//!
//! # Invariants
//! - Every returned connection has `foreign_keys=ON`, a busy timeout, and the
//!   latest schema.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// How long a writer waits for the background scheduler's reads.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (creating when needed) the database file at `path`.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| {
            error!("event=db_open module=db status=error mode=file reason=create_dir");
            DbError::CreateDir {
                path: parent.to_path_buf(),
                source,
            }
        })?;
    }
    prepare("file", Connection::open(path)?)
}

/// Opens a private in-memory database, used by tests and previews.
pub fn open_db_in_memory() -> DbResult<Connection> {
    prepare("memory", Connection::open_in_memory()?)
}

fn prepare(mode: &'static str, mut conn: Connection) -> DbResult<Connection> {
    let started_at = Instant::now();

    let result = conn
        .execute_batch("PRAGMA foreign_keys = ON;")
        .and_then(|()| conn.busy_timeout(BUSY_TIMEOUT))
        .map_err(DbError::from)
        .and_then(|()| apply_migrations(&mut conn));

    match result {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            Err(err)
        }
    }
}
