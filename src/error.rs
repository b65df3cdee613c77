//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Application-wide error type.
///
/// Every store, service and handler returns this type, so a failure deep in
/// the persistence layer reaches the API caller as a structured JSON body.
///
/// # Error Categories
///
/// - **Database Errors**: Any sqlx::Error from database operations
/// - **Authentication Errors**: Missing, unknown or revoked API keys
/// - **Resource Errors**: Requested services, updates, keys or users not found
/// - **Validation Errors**: Invalid request data (e.g. unknown status code)
/// - **Conflict Errors**: Unique constraints (service names, usernames, key hashes)
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// API key is missing, invalid, or inactive.
    ///
    /// The message is identical for every cause so callers cannot tell a
    /// revoked key from one that never existed.
    #[error("Invalid or missing API key")]
    Unauthenticated,

    /// Referenced service does not exist (or is hidden from the public surface).
    #[error("Service not found")]
    ServiceNotFound,

    /// Referenced status update does not exist.
    #[error("Status update not found")]
    StatusUpdateNotFound,

    /// Referenced API key does not exist.
    #[error("API key not found")]
    ApiKeyNotFound,

    /// Referenced user does not exist.
    #[error("User not found")]
    UserNotFound,

    /// A status code outside the five recognized values.
    ///
    /// The message enumerates the valid codes; the rejected value is
    /// returned separately as `details`.
    #[error("Invalid status. Must be one of: {}", crate::models::status_update::ServiceStatus::valid_codes())]
    InvalidStatus(String),

    /// Request body or parameters are invalid.
    ///
    /// The String is returned to the caller verbatim.
    #[error("{0}")]
    InvalidArgument(String),

    /// A unique value is already taken.
    #[error("{0}")]
    Conflict(String),

    /// The backing store cannot serve the request (e.g. no database configured).
    #[error("{0}")]
    StoreUnavailable(String),
}

/// JSON body returned for every error.
///
/// ```json
/// { "error": "Invalid status. Must be one of: ...", "details": "..." }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::ServiceNotFound
            | AppError::StatusUpdateNotFound
            | AppError::ApiKeyNotFound
            | AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::InvalidStatus(_) | AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert AppError into an HTTP response.
///
/// # Status Code Mapping
///
/// - `Unauthenticated` → 401 Unauthorized
/// - `*NotFound` → 404 Not Found
/// - `InvalidStatus`, `InvalidArgument` → 400 Bad Request
/// - `Conflict` → 409 Conflict
/// - `StoreUnavailable` → 503 Service Unavailable
/// - `Database` → 500 Internal Server Error (hides details from client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            AppError::Database(ref err) => {
                tracing::error!(error = %err, "Database error while handling request");
                ErrorBody {
                    error: "An internal error occurred".to_string(),
                    details: None,
                }
            }
            AppError::InvalidStatus(ref value) => ErrorBody {
                error: self.to_string(),
                details: Some(format!("Received status '{value}'")),
            },
            other => ErrorBody {
                error: other.to_string(),
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

// Extractor failures keep axum's message but use the JSON error body.

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidArgument(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidArgument(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidArgument(rejection.body_text())
    }
}
