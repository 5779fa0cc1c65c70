//! Error types for continuityd

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use continuity_engine::ContinuityError;
use continuity_types::EntityKind;
use serde::Serialize;
use thiserror::Error;

/// Daemon-level errors
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// API-specific errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Tenant or user header missing
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Body could not be parsed into the expected shape
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error(transparent)]
    Core(#[from] ContinuityError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

/// Accept an optional JSON body.
///
/// Only a request without a JSON body reads as `None`; a body that is
/// present but malformed is still rejected.
pub fn optional_json<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<Option<T>> {
    match body {
        Ok(Json(value)) => Ok(Some(value)),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(None),
        Err(rejection) => Err(rejection.into()),
    }
}

/// Error response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<EntityKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::InvalidBody(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            ApiError::Core(err) => {
                let status = match err {
                    ContinuityError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    ContinuityError::NotFound { .. } => StatusCode::NOT_FOUND,
                    ContinuityError::InvalidState { .. } | ContinuityError::Conflict { .. } => {
                        StatusCode::CONFLICT
                    }
                    ContinuityError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.code())
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let (entity, entity_id) = match &self {
            ApiError::Core(err) => (err.entity(), err.entity_id().map(str::to_string)),
            _ => (None, None),
        };
        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
            entity,
            entity_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;

#[cfg(test)]
mod tests {
    use super::*;
    use continuity_storage::StorageError;

    fn status_of(err: ContinuityError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(
            status_of(ContinuityError::validation(EntityKind::Workflow, "w", "empty")),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(ContinuityError::not_found(EntityKind::Campaign, "c")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ContinuityError::invalid_state(EntityKind::Policy, "p", "draft")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ContinuityError::conflict(EntityKind::Step, "s", "rejected")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ContinuityError::Storage(StorageError::Backend("down".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Unauthorized("no tenant".into()).into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
