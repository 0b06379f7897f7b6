//! API error type with automatic HTTP status mapping.
//!
//! Errors are converted to JSON responses with appropriate status codes.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use roll_core::RepositoryError;

/// Application-level error that maps to an HTTP response.
#[derive(Debug)]
pub enum ApiError {
    /// Request body missing/invalid fields (400)
    Validation(String),

    /// Resource not found (404)
    NotFound { resource: &'static str, id: i64 },

    /// Duplicate primary key on create (409)
    Conflict(String),

    /// Storage error (500, logged)
    Database(String),
}

impl ApiError {
    /// Map a repository error for an operation keyed by `id`.
    pub fn from_repository(resource: &'static str, id: i64, err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound { resource, id },
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Database(other.to_string()),
        }
    }

    /// Map a repository error for an operation with no single key (list).
    pub fn database(err: RepositoryError) -> Self {
        Self::Database(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Validation(message) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "validation_error",
                    "message": message
                }),
            ),
            Self::NotFound { resource, id } => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "not_found",
                    "message": format!("{} '{}' not found", resource, id)
                }),
            ),
            Self::Conflict(message) => (
                StatusCode::CONFLICT,
                json!({
                    "error": "conflict",
                    "message": message
                }),
            ),
            Self::Database(message) => {
                // Log the actual error, return a generic message.
                tracing::error!("Database error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": "an internal error occurred"
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_is_400() {
        let err = ApiError::Validation("missing field `municipal_name`".into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_is_404() {
        let err = ApiError::NotFound {
            resource: "municipality",
            id: 999,
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn conflict_is_409() {
        let err = ApiError::Conflict("municipality 1 already exists".into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn repository_not_found_maps_to_404() {
        let err = ApiError::from_repository("property", 100, RepositoryError::NotFound);
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn repository_database_error_maps_to_500() {
        let err = ApiError::from_repository(
            "property",
            100,
            RepositoryError::Database("disk I/O error".into()),
        );
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
