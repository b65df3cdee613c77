//! Update ingestion - validates and records new status updates.
//!
//! This is the only mutating path reachable by API clients. Any status may
//! follow any other; there are no transition rules.

use chrono::{DateTime, Utc};

use crate::{
    error::AppError,
    models::status_update::{
        CreateStatusUpdateRequest, NewStatusUpdate, ServiceStatus, StatusUpdate,
    },
    store::StatusStore,
};

/// Record a status update submitted through the API.
///
/// # Process
///
/// 1. Resolve the service (active or not); unknown ids → `ServiceNotFound`
/// 2. Parse the status code; unknown codes → `InvalidStatus`
/// 3. Insert with `created_by = None` (API updates are never attributed)
///
/// # Returns
///
/// The persisted update including its server-assigned id and timestamp.
pub async fn ingest(
    store: &dyn StatusStore,
    request: CreateStatusUpdateRequest,
) -> Result<StatusUpdate, AppError> {
    store
        .get_service(request.service_id)
        .await?
        .ok_or(AppError::ServiceNotFound)?;

    let status: ServiceStatus = request.status.parse()?;

    let update = NewStatusUpdate {
        service_id: request.service_id,
        status,
        problem: String::new(),
        plan: request.plan.unwrap_or_default(),
        comments: request.comments.unwrap_or_default(),
        created_by: None,
        created_at: None,
    };

    let created = store.create_status_update(&update).await?;
    tracing::info!(
        update_id = created.id,
        service = %created.service_name,
        status = %created.status,
        "Status update recorded"
    );

    Ok(created)
}

/// A status update entered by an administrator.
#[derive(Debug, Clone)]
pub struct AdminUpdate {
    pub service_id: i64,
    pub status: ServiceStatus,
    pub problem: String,
    pub plan: String,
    pub comments: String,

    /// Username of the acting administrator
    pub acting_user: Option<String>,

    /// Backdated timestamp, if any
    pub created_at: Option<DateTime<Utc>>,
}

/// Record a status update on behalf of an administrator.
///
/// Follows the same unconstrained model as [`ingest`], but may carry a
/// problem description, an author and an explicit timestamp.
pub async fn record_admin_update(
    store: &dyn StatusStore,
    update: AdminUpdate,
) -> Result<StatusUpdate, AppError> {
    let created_by = match update.acting_user.as_deref() {
        Some(username) => Some(
            store
                .find_user_by_username(username)
                .await?
                .ok_or(AppError::UserNotFound)?
                .id,
        ),
        None => None,
    };

    let new_update = NewStatusUpdate {
        service_id: update.service_id,
        status: update.status,
        problem: update.problem,
        plan: update.plan,
        comments: update.comments,
        created_by,
        created_at: update.created_at,
    };

    store.create_status_update(&new_update).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::service::{NewService, ServiceChanges};
    use crate::store::MemoryStore;

    fn request(service_id: i64, status: &str) -> CreateStatusUpdateRequest {
        CreateStatusUpdateRequest {
            service_id,
            status: status.to_string(),
            comments: Some("db lost".to_string()),
            plan: None,
        }
    }

    #[tokio::test]
    async fn records_api_update_without_author() {
        let store = MemoryStore::new();
        let service = store.create_service(&NewService::named("API")).await.unwrap();

        let created = ingest(&store, request(service.id, "down")).await.unwrap();

        assert_eq!(created.status, ServiceStatus::Down);
        assert_eq!(created.comments, "db lost");
        assert_eq!(created.plan, "");
        assert_eq!(created.created_by, None);
        assert_eq!(created.created_by_username, None);
    }

    #[tokio::test]
    async fn rejects_unknown_status() {
        let store = MemoryStore::new();
        let service = store.create_service(&NewService::named("API")).await.unwrap();

        let err = ingest(&store, request(service.id, "bogus")).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidStatus(_)));
        assert!(store.recent_updates(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_unknown_service() {
        let store = MemoryStore::new();
        let err = ingest(&store, request(999_999, "down")).await.unwrap_err();
        assert!(matches!(err, AppError::ServiceNotFound));
    }

    #[tokio::test]
    async fn accepts_updates_for_inactive_services() {
        let store = MemoryStore::new();
        let service = store.create_service(&NewService::named("API")).await.unwrap();
        let changes = ServiceChanges {
            is_active: Some(false),
            ..ServiceChanges::default()
        };
        store.update_service(service.id, &changes).await.unwrap();

        assert!(ingest(&store, request(service.id, "maintenance")).await.is_ok());
    }

    #[tokio::test]
    async fn any_transition_is_allowed() {
        let store = MemoryStore::new();
        let service = store.create_service(&NewService::named("API")).await.unwrap();

        for status in ["down", "stable", "partial", "maintenance", "down", "degraded"] {
            ingest(&store, request(service.id, status)).await.unwrap();
        }
        assert_eq!(store.service_history(service.id, 100).await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn admin_update_is_attributed() {
        let store = MemoryStore::new();
        let service = store.create_service(&NewService::named("API")).await.unwrap();
        store.create_user("alice").await.unwrap();

        let created = record_admin_update(
            &store,
            AdminUpdate {
                service_id: service.id,
                status: ServiceStatus::Partial,
                problem: "Elevated error rates".to_string(),
                plan: String::new(),
                comments: String::new(),
                acting_user: Some("alice".to_string()),
                created_at: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(created.created_by_username.as_deref(), Some("alice"));
        assert_eq!(created.problem, "Elevated error rates");
    }

    #[tokio::test]
    async fn admin_update_with_unknown_user_fails() {
        let store = MemoryStore::new();
        let service = store.create_service(&NewService::named("API")).await.unwrap();

        let err = record_admin_update(
            &store,
            AdminUpdate {
                service_id: service.id,
                status: ServiceStatus::Stable,
                problem: String::new(),
                plan: String::new(),
                comments: String::new(),
                acting_user: Some("mallory".to_string()),
                created_at: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::UserNotFound));
    }
}
