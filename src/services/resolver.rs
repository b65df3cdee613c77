//! Status resolution - current status per service and the overall system status.
//!
//! Nothing here writes. The current status of a service is always its latest
//! status update, recomputed on every read; there is no cached status column.

use serde::Serialize;

use crate::{
    error::AppError,
    models::{
        service::{Service, ServiceWithStatusResponse},
        status_update::{ServiceStatus, StatusUpdate, StatusUpdateResponse},
    },
    store::StatusStore,
};

/// Number of recent updates shown per service on the public views.
pub const RECENT_UPDATES_SHOWN: i64 = 5;

/// Keep the more severe of two statuses.
///
/// `next` replaces `current` only when it is strictly more severe.
pub fn escalate(current: ServiceStatus, next: ServiceStatus) -> ServiceStatus {
    if next.severity() > current.severity() {
        next
    } else {
        current
    }
}

/// Aggregate per-service current statuses into one overall status.
///
/// Starts from `stable`; services without any status (`None`) do not
/// contribute. The result does not depend on iteration order.
pub fn overall_status<I>(current_statuses: I) -> ServiceStatus
where
    I: IntoIterator<Item = Option<ServiceStatus>>,
{
    current_statuses
        .into_iter()
        .flatten()
        .fold(ServiceStatus::Stable, escalate)
}

/// Latest status update for a service, or `None` when it never reported.
///
/// `None` means unknown, which callers must not treat as stable.
pub async fn current_status(
    store: &dyn StatusStore,
    service_id: i64,
) -> Result<Option<StatusUpdate>, AppError> {
    store.current_status(service_id).await
}

/// Attach the current status to a service for API responses.
pub async fn with_current_status(
    store: &dyn StatusStore,
    service: Service,
) -> Result<ServiceWithStatusResponse, AppError> {
    let current = current_status(store, service.id).await?;
    Ok(ServiceWithStatusResponse::new(
        service,
        current.map(StatusUpdateResponse::from),
    ))
}

/// One service as shown on the public overview and detail views.
#[derive(Debug, Serialize)]
pub struct ServiceSummary {
    pub service: Service,
    pub current_status: Option<StatusUpdateResponse>,
    pub recent_updates: Vec<StatusUpdateResponse>,
}

/// Everything the public status page needs.
#[derive(Debug, Serialize)]
pub struct StatusOverview {
    pub overall_status: ServiceStatus,
    pub overall_status_display: &'static str,
    pub overall_color: &'static str,
    pub services: Vec<ServiceSummary>,
}

/// Build the summary for a single service.
pub async fn summarize(
    store: &dyn StatusStore,
    service: Service,
) -> Result<ServiceSummary, AppError> {
    let recent = store
        .service_history(service.id, RECENT_UPDATES_SHOWN)
        .await?;

    Ok(ServiceSummary {
        current_status: recent.first().cloned().map(StatusUpdateResponse::from),
        recent_updates: recent.into_iter().map(StatusUpdateResponse::from).collect(),
        service,
    })
}

/// Build the overview of all active services with the overall status.
pub async fn overview(store: &dyn StatusStore) -> Result<StatusOverview, AppError> {
    let services = store.list_services(true).await?;

    let mut summaries = Vec::with_capacity(services.len());
    for service in services {
        summaries.push(summarize(store, service).await?);
    }

    let overall = overall_status(
        summaries
            .iter()
            .map(|summary| summary.current_status.as_ref().map(|update| update.status)),
    );

    Ok(StatusOverview {
        overall_status: overall,
        overall_status_display: overall.display_name(),
        overall_color: overall.color(),
        services: summaries,
    })
}
