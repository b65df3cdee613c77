//! Status update HTTP handlers.
//!
//! This module implements the status-update API endpoints:
//! - POST /api/status-updates - Record a new status update
//! - GET /api/status-updates - List recent updates across all services
//! - GET /api/status-updates/{id} - Get a single update

use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::Deserialize;

use super::extract::{self, Path, Query};
use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::status_update::{CreateStatusUpdateRequest, StatusUpdateResponse},
    services::{history, ingestion},
    state::AppState,
};

/// Query parameters for list endpoints.
#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

/// Create a status update.
///
/// # Request Body
///
/// ```json
/// {
///   "service_id": 1,
///   "status": "down",
///   "comments": "db lost",
///   "plan": "Restoring from replica"
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: The persisted update
/// - **Error (400)**: Unknown status code (message lists the valid codes) or malformed body
/// - **Error (404)**: Unknown service
pub async fn create_status_update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    extract::Json(request): extract::Json<CreateStatusUpdateRequest>,
) -> Result<(StatusCode, Json<StatusUpdateResponse>), AppError> {
    tracing::debug!(
        api_key_id = auth.api_key_id,
        api_key = %auth.api_key_name,
        service_id = request.service_id,
        "Status update submitted"
    );

    let created = ingestion::ingest(state.store(), request).await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// List status updates across all services, most recent first.
///
/// `limit` defaults to 50 and is capped at 200.
pub async fn list_status_updates(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<StatusUpdateResponse>>, AppError> {
    let updates = history::recent_updates(state.store(), query.limit).await?;

    Ok(Json(updates.into_iter().map(Into::into).collect()))
}

/// Get a specific status update by ID.
pub async fn get_status_update(
    State(state): State<AppState>,
    Path(update_id): Path<i64>,
) -> Result<Json<StatusUpdateResponse>, AppError> {
    let update = state
        .store()
        .get_status_update(update_id)
        .await?
        .ok_or(AppError::StatusUpdateNotFound)?;

    Ok(Json(update.into()))
}
