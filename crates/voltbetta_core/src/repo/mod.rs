//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define one data access contract per record kind.
//! - Keep SQL, timestamp encoding and JSON text columns inside this layer.
//!
//! # Invariants
//! - Writes call the record's `validate()` before any SQL mutation.
//! - Update/delete of a missing row is `RepoError::NotFound`, never silent.
//! - Reads reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::{RecordId, ValidationError};
use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod fish_repo;
pub mod maintenance_repo;
pub mod note_repo;
pub mod photo_repo;
pub mod plant_repo;
pub mod tank_log_repo;
pub mod treatment_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by every record kind.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound { entity: &'static str, id: RecordId },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn to_epoch_ms(value: DateTime<Utc>) -> i64 {
    value.timestamp_millis()
}

pub(crate) fn from_epoch_ms(value: i64, column: &str) -> RepoResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(value).single().ok_or_else(|| {
        RepoError::InvalidData(format!("invalid epoch millis `{value}` in {column}"))
    })
}

pub(crate) fn from_optional_epoch_ms(
    value: Option<i64>,
    column: &str,
) -> RepoResult<Option<DateTime<Utc>>> {
    value.map(|ms| from_epoch_ms(ms, column)).transpose()
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

/// Encodes an embedded list (or any sub-record) as a JSON text column.
pub(crate) fn to_json_text<T: Serialize>(value: &T, column: &str) -> RepoResult<String> {
    serde_json::to_string(value)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode {column}: {err}")))
}

pub(crate) fn from_json_text<T: DeserializeOwned>(text: &str, column: &str) -> RepoResult<T> {
    serde_json::from_str(text)
        .map_err(|err| RepoError::InvalidData(format!("invalid JSON in {column}: {err}")))
}

/// Parses a text enum column using the enum's own parser.
pub(crate) fn parse_enum<T>(
    text: &str,
    column: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> RepoResult<T> {
    parse(text).ok_or_else(|| RepoError::InvalidData(format!("invalid value `{text}` in {column}")))
}

/// Maps a zero-row write to `NotFound`.
pub(crate) fn expect_changed(changed: usize, entity: &'static str, id: RecordId) -> RepoResult<()> {
    if changed == 0 {
        return Err(RepoError::NotFound { entity, id });
    }
    Ok(())
}

/// Returns the id of an already-persisted record, or `InvalidData`.
pub(crate) fn require_id(id: Option<RecordId>, entity: &'static str) -> RepoResult<RecordId> {
    id.ok_or_else(|| RepoError::InvalidData(format!("{entity} has no id; create it first")))
}
