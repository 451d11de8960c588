//! Unified error handling for the admin API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;

/// A field-level validation failure, reported back to the form.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Application-level error type for admin routes.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request body failed field validation.
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// The authenticated admin's role does not permit this operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body returned to clients.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldError>,
}

impl AppError {
    /// Map `NotFound` from the repository layer onto a named 404.
    ///
    /// Repositories report a bare `NotFound`; routes use this to attach the
    /// entity name the client asked for.
    #[must_use]
    pub fn for_entity(entity: &str, err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound(entity.to_string()),
            other => Self::Database(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Server errors are reported to Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        };

        let (message, fields) = match self {
            // Don't expose internal error details to clients
            Self::Database(_) | Self::Internal(_) => ("Internal server error".to_string(), vec![]),
            Self::Validation(fields) => ("Validation failed".to_string(), fields),
            other => (other.to_string(), vec![]),
        };

        (
            status,
            Json(ErrorResponse {
                error: message,
                fields,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("invoice 3".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Forbidden("read-only role".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Validation(vec![FieldError::new(
                "price",
                "must be positive"
            )])),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_for_entity_maps_not_found() {
        let err = AppError::for_entity("product 7", RepositoryError::NotFound);
        assert!(matches!(err, AppError::NotFound(ref e) if e == "product 7"));
    }
}
