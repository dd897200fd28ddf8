//! HTTP error mapping.
//!
//! # Invariants
//! - Missing records are `404`, rule violations `422`, malformed query
//!   values `400`, everything else `500`.
//! - Response bodies carry the error message; logs carry only the status
//!   class.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, warn};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use voltbetta_core::media::MediaError;
use voltbetta_core::{RepoError, ServiceError};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    Service(ServiceError),
    /// A query or path value could not be interpreted.
    BadRequest(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Service(ServiceError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Service(ServiceError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Service(ServiceError::Media(
                MediaError::SourceMissing(_) | MediaError::InvalidFileName(_),
            )) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Service(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Service(err) => write!(f, "{err}"),
            Self::BadRequest(details) => write!(f, "bad request: {details}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        Self::Service(value.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(
                "event=api_request module=api status=error code={}",
                status.as_u16()
            );
        } else {
            warn!(
                "event=api_request module=api status=rejected code={}",
                status.as_u16()
            );
        }

        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use voltbetta_core::{ServiceError, ValidationError};

    #[test]
    fn service_errors_map_to_status_codes() {
        let missing = ApiError::from(ServiceError::NotFound {
            entity: "plant",
            id: 3,
        });
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let invalid = ApiError::from(ServiceError::Validation(ValidationError::BlankField(
            "title",
        )));
        assert_eq!(invalid.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);

        let broken = ApiError::from(ServiceError::InconsistentState("read-back"));
        assert_eq!(broken.status(), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(
            ApiError::BadRequest("category".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
