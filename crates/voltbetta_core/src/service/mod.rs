//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep CLI/HTTP layers decoupled from storage details.
//!
//! # Invariants
//! - Services load, mutate through the model, then persist; they never write
//!   partial records.
//! - A missing record is always `ServiceError::NotFound`, whichever layer
//!   noticed it first.

use crate::media::MediaError;
use crate::model::{RecordId, ValidationError};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod fish_service;
pub mod maintenance_service;
pub mod note_service;
pub mod photo_service;
pub mod plant_service;
pub mod tank_log_service;
pub mod treatment_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error shared by every use-case facade.
#[derive(Debug)]
pub enum ServiceError {
    /// Target record does not exist.
    NotFound { entity: &'static str, id: RecordId },
    /// Input or resulting record breaks a model rule.
    Validation(ValidationError),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Image file handling failure.
    Media(MediaError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Media(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Media(err) => Some(err),
            Self::NotFound { .. } | Self::InconsistentState(_) => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<MediaError> for ServiceError {
    fn from(value: MediaError) -> Self {
        Self::Media(value)
    }
}

/// Turns a `get` miss into `NotFound`.
pub(crate) fn found<T>(
    value: Option<T>,
    entity: &'static str,
    id: RecordId,
) -> ServiceResult<T> {
    value.ok_or(ServiceError::NotFound { entity, id })
}

/// Reads back a just-written record, which must exist.
pub(crate) fn read_back<T>(value: Option<T>, details: &'static str) -> ServiceResult<T> {
    value.ok_or(ServiceError::InconsistentState(details))
}
