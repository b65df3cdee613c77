//! In-process implementation of [`StatusStore`].
//!
//! Used when no `DATABASE_URL` is configured and by the test suite. Data is
//! lost when the process exits.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::StatusStore;
use crate::error::AppError;
use crate::models::{
    api_key::{ApiKey, NewApiKey},
    service::{NewService, Service, ServiceChanges},
    status_update::{NewStatusUpdate, StatusUpdate},
    user::User,
};

/// Status update as stored; names are resolved on read like a SQL join.
#[derive(Debug, Clone)]
struct StoredUpdate {
    id: i64,
    update: NewStatusUpdate,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    services: Vec<Service>,
    updates: Vec<StoredUpdate>,
    api_keys: Vec<ApiKey>,
    users: Vec<User>,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn resolve(&self, stored: &StoredUpdate) -> Option<StatusUpdate> {
        let service = self
            .services
            .iter()
            .find(|s| s.id == stored.update.service_id)?;
        let username = stored
            .update
            .created_by
            .and_then(|id| self.users.iter().find(|u| u.id == id))
            .map(|u| u.username.clone());

        Some(StatusUpdate {
            id: stored.id,
            service_id: service.id,
            service_name: service.name.clone(),
            status: stored.update.status,
            problem: stored.update.problem.clone(),
            plan: stored.update.plan.clone(),
            comments: stored.update.comments.clone(),
            created_at: stored.created_at,
            created_by: stored.update.created_by,
            created_by_username: username,
        })
    }

    /// Updates matching `filter`, newest first, ties broken by insertion order.
    fn newest_first(
        &self,
        filter: impl Fn(&StoredUpdate) -> bool,
        limit: i64,
    ) -> Vec<StatusUpdate> {
        let mut matching: Vec<&StoredUpdate> = self.updates.iter().filter(|u| filter(u)).collect();
        matching.sort_by_key(|u| Reverse((u.created_at, u.id)));

        let limit = usize::try_from(limit).unwrap_or(0);
        matching
            .into_iter()
            .take(limit)
            .filter_map(|u| self.resolve(u))
            .collect()
    }

    fn name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.services
            .iter()
            .any(|s| s.name == name && Some(s.id) != except)
    }
}

/// Store that keeps every table in memory behind a single lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl StatusStore for MemoryStore {
    async fn list_services(&self, active_only: bool) -> Result<Vec<Service>, AppError> {
        let tables = self.tables.read().await;
        let mut services: Vec<Service> = tables
            .services
            .iter()
            .filter(|s| !active_only || s.is_active)
            .cloned()
            .collect();
        services.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));

        Ok(services)
    }

    async fn get_service(&self, id: i64) -> Result<Option<Service>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.services.iter().find(|s| s.id == id).cloned())
    }

    async fn create_service(&self, service: &NewService) -> Result<Service, AppError> {
        let mut tables = self.tables.write().await;
        if tables.name_taken(&service.name, None) {
            return Err(AppError::Conflict(format!(
                "A service named '{}' already exists",
                service.name
            )));
        }

        let created = Service {
            id: tables.allocate_id(),
            name: service.name.clone(),
            description: service.description.clone(),
            order: service.order,
            is_active: service.is_active,
            created_at: Utc::now(),
        };
        tables.services.push(created.clone());

        Ok(created)
    }

    async fn update_service(
        &self,
        id: i64,
        changes: &ServiceChanges,
    ) -> Result<Service, AppError> {
        let mut tables = self.tables.write().await;
        if let Some(name) = &changes.name {
            if tables.name_taken(name, Some(id)) {
                return Err(AppError::Conflict(format!(
                    "A service named '{name}' already exists"
                )));
            }
        }

        let service = tables
            .services
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(AppError::ServiceNotFound)?;

        if let Some(name) = &changes.name {
            service.name = name.clone();
        }
        if let Some(description) = &changes.description {
            service.description = description.clone();
        }
        if let Some(order) = changes.order {
            service.order = order;
        }
        if let Some(is_active) = changes.is_active {
            service.is_active = is_active;
        }

        Ok(service.clone())
    }

    async fn delete_service(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.services.len();
        tables.services.retain(|s| s.id != id);
        if tables.services.len() == before {
            return Ok(false);
        }
        tables.updates.retain(|u| u.update.service_id != id);

        Ok(true)
    }

    async fn create_status_update(
        &self,
        update: &NewStatusUpdate,
    ) -> Result<StatusUpdate, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.services.iter().any(|s| s.id == update.service_id) {
            return Err(AppError::ServiceNotFound);
        }
        if let Some(user_id) = update.created_by {
            if !tables.users.iter().any(|u| u.id == user_id) {
                return Err(AppError::UserNotFound);
            }
        }

        let stored = StoredUpdate {
            id: tables.allocate_id(),
            update: update.clone(),
            created_at: update.created_at.unwrap_or_else(Utc::now),
        };
        let resolved = tables.resolve(&stored).ok_or(AppError::ServiceNotFound)?;
        tables.updates.push(stored);

        Ok(resolved)
    }

    async fn get_status_update(&self, id: i64) -> Result<Option<StatusUpdate>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .updates
            .iter()
            .find(|u| u.id == id)
            .and_then(|u| tables.resolve(u)))
    }

    async fn current_status(&self, service_id: i64) -> Result<Option<StatusUpdate>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .newest_first(|u| u.update.service_id == service_id, 1)
            .into_iter()
            .next())
    }

    async fn service_history(
        &self,
        service_id: i64,
        limit: i64,
    ) -> Result<Vec<StatusUpdate>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.newest_first(|u| u.update.service_id == service_id, limit))
    }

    async fn recent_updates(&self, limit: i64) -> Result<Vec<StatusUpdate>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.newest_first(|_| true, limit))
    }

    async fn create_api_key(&self, key: &NewApiKey) -> Result<ApiKey, AppError> {
        let mut tables = self.tables.write().await;
        if tables.api_keys.iter().any(|k| k.key_hash == key.key_hash) {
            return Err(AppError::Conflict("API key already exists".to_string()));
        }

        let created = ApiKey {
            id: tables.allocate_id(),
            name: key.name.clone(),
            key_hash: key.key_hash.clone(),
            key_prefix: key.key_prefix.clone(),
            is_active: true,
            created_at: Utc::now(),
            last_used_at: None,
            created_by: key.created_by,
        };
        tables.api_keys.push(created.clone());

        Ok(created)
    }

    async fn find_active_api_key(&self, key_hash: &str) -> Result<Option<ApiKey>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .api_keys
            .iter()
            .find(|k| k.is_active && k.key_hash == key_hash)
            .cloned())
    }

    async fn touch_api_key(&self, id: i64, used_at: DateTime<Utc>) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if let Some(key) = tables.api_keys.iter_mut().find(|k| k.id == id) {
            key.last_used_at = Some(used_at);
        }

        Ok(())
    }

    async fn list_api_keys(&self) -> Result<Vec<ApiKey>, AppError> {
        let tables = self.tables.read().await;
        let mut keys = tables.api_keys.clone();
        keys.sort_by_key(|k| Reverse((k.created_at, k.id)));

        Ok(keys)
    }

    async fn get_api_key(&self, id: i64) -> Result<Option<ApiKey>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.api_keys.iter().find(|k| k.id == id).cloned())
    }

    async fn deactivate_api_key(&self, id: i64) -> Result<ApiKey, AppError> {
        let mut tables = self.tables.write().await;
        let key = tables
            .api_keys
            .iter_mut()
            .find(|k| k.id == id)
            .ok_or(AppError::ApiKeyNotFound)?;
        key.is_active = false;

        Ok(key.clone())
    }

    async fn create_user(&self, username: &str) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == username) {
            return Err(AppError::Conflict(format!("User '{username}' already exists")));
        }

        let user = User {
            id: tables.allocate_id(),
            username: username.to_string(),
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());

        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }
}
