//! Health check endpoint for service monitoring.

use axum::Json;
use serde::{Deserialize, Serialize};

/// Generic message response.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Health check handler. Requires no authentication.
///
/// # Response (200 OK)
///
/// ```json
/// { "message": "API is running" }
/// ```
pub async fn health_check() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "API is running".to_string(),
    })
}
