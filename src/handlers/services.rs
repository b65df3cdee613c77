//! Service HTTP handlers.
//!
//! - GET /api/services - List services with their current status
//! - GET /api/services/{id} - Get one service with its current status
//! - GET /api/services/{id}/history - Status history of one service

use axum::{Json, extract::State};
use serde::Deserialize;

use super::{
    extract::{Path, Query},
    status_updates::LimitQuery,
};
use crate::{
    error::AppError,
    models::{service::ServiceWithStatusResponse, status_update::StatusUpdateResponse},
    services::{history, resolver},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ListServicesQuery {
    /// Only return active services (default: true)
    pub active_only: Option<bool>,
}

/// List services in display order, each with its current status.
///
/// A service that never reported has `"current_status": null`.
pub async fn list_services(
    State(state): State<AppState>,
    Query(query): Query<ListServicesQuery>,
) -> Result<Json<Vec<ServiceWithStatusResponse>>, AppError> {
    let store = state.store();
    let services = store.list_services(query.active_only.unwrap_or(true)).await?;

    let mut responses = Vec::with_capacity(services.len());
    for service in services {
        responses.push(resolver::with_current_status(store, service).await?);
    }

    Ok(Json(responses))
}

/// Get a specific service by ID with its current status.
///
/// Inactive services are returned too.
pub async fn get_service(
    State(state): State<AppState>,
    Path(service_id): Path<i64>,
) -> Result<Json<ServiceWithStatusResponse>, AppError> {
    let store = state.store();
    let service = store
        .get_service(service_id)
        .await?
        .ok_or(AppError::ServiceNotFound)?;

    Ok(Json(resolver::with_current_status(store, service).await?))
}

/// Status history for a service, most recent first.
///
/// `limit` defaults to 20 and is capped at 100.
pub async fn get_service_history(
    State(state): State<AppState>,
    Path(service_id): Path<i64>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<StatusUpdateResponse>>, AppError> {
    let updates = history::service_history(state.store(), service_id, query.limit).await?;

    Ok(Json(updates.into_iter().map(Into::into).collect()))
}
