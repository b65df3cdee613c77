//! Persistence layer for services, status updates, API keys and users.
//!
//! All reads and writes go through the [`StatusStore`] trait so handlers do
//! not care whether data lives in PostgreSQL ([`PgStore`]) or in process
//! memory ([`MemoryStore`]).
//!
//! # Ordering
//!
//! Every implementation must return:
//! - services ordered by `(order ASC, name ASC)`
//! - status updates ordered by `(created_at DESC, id DESC)`, so that among
//!   updates sharing a timestamp the most recently inserted one comes first

use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::{
    api_key::{ApiKey, NewApiKey},
    service::{NewService, Service, ServiceChanges},
    status_update::{NewStatusUpdate, StatusUpdate},
    user::User,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Storage operations used by the rest of the application.
#[async_trait::async_trait]
pub trait StatusStore: Send + Sync {
    /// List services in display order, optionally only active ones.
    async fn list_services(&self, active_only: bool) -> Result<Vec<Service>, AppError>;

    async fn get_service(&self, id: i64) -> Result<Option<Service>, AppError>;

    /// Create a service. A taken name yields `Conflict`.
    async fn create_service(&self, service: &NewService) -> Result<Service, AppError>;

    /// Apply a partial edit. Unknown ids yield `ServiceNotFound`.
    async fn update_service(&self, id: i64, changes: &ServiceChanges)
    -> Result<Service, AppError>;

    /// Hard-delete a service together with all of its status updates.
    ///
    /// Returns `false` when no such service existed.
    async fn delete_service(&self, id: i64) -> Result<bool, AppError>;

    /// Insert a status update. Unknown services yield `ServiceNotFound`.
    async fn create_status_update(&self, update: &NewStatusUpdate)
    -> Result<StatusUpdate, AppError>;

    async fn get_status_update(&self, id: i64) -> Result<Option<StatusUpdate>, AppError>;

    /// Most recent update for a service, if it has any.
    async fn current_status(&self, service_id: i64) -> Result<Option<StatusUpdate>, AppError>;

    /// Updates for one service, most recent first, at most `limit` rows.
    async fn service_history(
        &self,
        service_id: i64,
        limit: i64,
    ) -> Result<Vec<StatusUpdate>, AppError>;

    /// Updates across all services, most recent first, at most `limit` rows.
    async fn recent_updates(&self, limit: i64) -> Result<Vec<StatusUpdate>, AppError>;

    /// Insert a key record. A duplicate hash yields `Conflict`.
    async fn create_api_key(&self, key: &NewApiKey) -> Result<ApiKey, AppError>;

    /// Find an active key by hash. Inactive keys are never returned.
    async fn find_active_api_key(&self, key_hash: &str) -> Result<Option<ApiKey>, AppError>;

    /// Record a successful authentication.
    async fn touch_api_key(&self, id: i64, used_at: DateTime<Utc>) -> Result<(), AppError>;

    async fn list_api_keys(&self) -> Result<Vec<ApiKey>, AppError>;

    async fn get_api_key(&self, id: i64) -> Result<Option<ApiKey>, AppError>;

    /// Revoke a key. Unknown ids yield `ApiKeyNotFound`.
    async fn deactivate_api_key(&self, id: i64) -> Result<ApiKey, AppError>;

    /// Create a user. A taken username yields `Conflict`.
    async fn create_user(&self, username: &str) -> Result<User, AppError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
}
