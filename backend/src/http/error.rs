//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;
use crate::ingest::{FieldError, IngestError};

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Field-level errors of a rejected row
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            errors: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = errors;
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest(String),
    /// Internal server error
    Internal(String),
    /// Repository error
    Repository(RepositoryError),
    /// Ingestion failure
    Ingest(IngestError),
}

fn repository_response(err: RepositoryError) -> (StatusCode, ApiError) {
    let msg = err.to_string();
    let details = err.context().to_string();
    let (status, code) = match err {
        RepositoryError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        RepositoryError::ValidationError { .. } => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        RepositoryError::ConflictError { .. } => (StatusCode::CONFLICT, "CONFLICT"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "REPOSITORY_ERROR"),
    };
    (status, ApiError::new(code, msg).with_details(details))
}

fn ingest_response(err: IngestError) -> (StatusCode, ApiError) {
    let msg = err.to_string();
    match err {
        IngestError::InputAbsent { .. } => {
            (StatusCode::CONFLICT, ApiError::new("INPUT_ABSENT", msg))
        }
        IngestError::SheetEmpty => (StatusCode::BAD_REQUEST, ApiError::new("SHEET_EMPTY", msg)),
        IngestError::SheetUnreadable(_) => {
            (StatusCode::BAD_REQUEST, ApiError::new("SHEET_UNREADABLE", msg))
        }
        IngestError::RowValidation(row) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::new("ROW_VALIDATION_FAILED", msg)
                .with_details(format!("row={}", row.row))
                .with_errors(row.errors),
        ),
        IngestError::Transaction(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new("TRANSACTION_FAILED", msg),
        ),
        IngestError::Repository(e) => repository_response(e),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Repository(e) => repository_response(e),
            AppError::Ingest(e) => ingest_response(e),
        };

        if status.is_server_error() {
            tracing::error!(code = %error.code, "{}", error.message);
        }

        (status, Json(error)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        AppError::Ingest(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RevisionId;
    use crate::ingest::RowValidationError;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_ingest_status_mapping() {
        assert_eq!(
            status_of(IngestError::input_absent(RevisionId(1), "gone").into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(IngestError::SheetEmpty.into()),
            StatusCode::BAD_REQUEST
        );
        let row = RowValidationError {
            row: 3,
            errors: vec![FieldError::new("credits", "bad")],
        };
        assert_eq!(
            status_of(IngestError::from(row).into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_repository_status_mapping() {
        assert_eq!(
            status_of(RepositoryError::not_found("missing").into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(RepositoryError::validation("bad").into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(RepositoryError::connection("down").into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
