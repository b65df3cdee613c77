//! Public read-only views backing the status page.
//!
//! - GET / - Overview of active services and the overall status
//! - GET /service/{id} - Detail of one active service
//! - GET /api/service/{id}/history - Recent history of one active service
//!
//! Inactive services are hidden here and answer 404.

use axum::{Json, extract::State};
use serde::Serialize;

use super::extract::Path;
use crate::{
    error::AppError,
    models::{service::Service, status_update::PublicStatusUpdate},
    services::{
        history::PUBLIC_HISTORY_LIMIT,
        resolver::{self, ServiceSummary, StatusOverview},
    },
    state::AppState,
    store::StatusStore,
};

/// Public history response.
///
/// ```json
/// {
///   "service": "API",
///   "updates": [
///     {
///       "status_display": "Major Outage",
///       "status_code": "down",
///       "problem": "Database unreachable",
///       "plan": "",
///       "created_at": "2025-12-20T10:00:00+00:00",
///       "created_by": "alice"
///     }
///   ]
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct PublicHistoryResponse {
    pub service: String,
    pub updates: Vec<PublicStatusUpdate>,
}

async fn active_service(store: &dyn StatusStore, service_id: i64) -> Result<Service, AppError> {
    store
        .get_service(service_id)
        .await?
        .filter(|service| service.is_active)
        .ok_or(AppError::ServiceNotFound)
}

/// Status page overview.
pub async fn status_overview(
    State(state): State<AppState>,
) -> Result<Json<StatusOverview>, AppError> {
    Ok(Json(resolver::overview(state.store()).await?))
}

/// Detail view for one active service.
pub async fn service_detail(
    State(state): State<AppState>,
    Path(service_id): Path<i64>,
) -> Result<Json<ServiceSummary>, AppError> {
    let store = state.store();
    let service = active_service(store, service_id).await?;

    Ok(Json(resolver::summarize(store, service).await?))
}

/// Up to 10 most recent updates of an active service.
pub async fn service_history_json(
    State(state): State<AppState>,
    Path(service_id): Path<i64>,
) -> Result<Json<PublicHistoryResponse>, AppError> {
    let store = state.store();
    let service = active_service(store, service_id).await?;
    let updates = store
        .service_history(service.id, PUBLIC_HISTORY_LIMIT)
        .await?;

    Ok(Json(PublicHistoryResponse {
        service: service.name,
        updates: updates.into_iter().map(Into::into).collect(),
    }))
}
