//! PostgreSQL implementation of [`StatusStore`].

use chrono::{DateTime, Utc};
use tracing::instrument;

use super::StatusStore;
use crate::db::DbPool;
use crate::error::AppError;
use crate::models::{
    api_key::{ApiKey, NewApiKey},
    service::{NewService, Service, ServiceChanges},
    status_update::{NewStatusUpdate, StatusUpdate},
    user::User,
};

const SERVICE_COLUMNS: &str = "id, name, description, display_order, is_active, created_at";

const API_KEY_COLUMNS: &str =
    "id, name, key_hash, key_prefix, is_active, created_at, last_used_at, created_by";

/// Status updates joined with their service name and author username.
/// Callers append `WHERE`/`ORDER BY` clauses using the `su` alias.
const STATUS_UPDATE_SELECT: &str = r#"
    SELECT su.id, su.service_id, s.name AS service_name, su.status,
           su.problem, su.plan, su.comments, su.created_at,
           su.created_by, u.username AS created_by_username
    FROM status_updates su
    JOIN services s ON s.id = su.service_id
    LEFT JOIN users u ON u.id = su.created_by
"#;

/// Store backed by a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Turn a unique-constraint violation into `Conflict`, keep anything else.
fn conflict_or_database(err: sqlx::Error, message: impl FnOnce() -> String) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return AppError::Conflict(message());
        }
    }
    AppError::Database(err)
}

/// A foreign-key violation on insert means the referenced row vanished.
fn missing_reference_or_database(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_foreign_key_violation() {
            return match db_err.constraint() {
                Some(constraint) if constraint.contains("created_by") => AppError::UserNotFound,
                _ => AppError::ServiceNotFound,
            };
        }
    }
    AppError::Database(err)
}

#[async_trait::async_trait]
impl StatusStore for PgStore {
    #[instrument(skip(self), err)]
    async fn list_services(&self, active_only: bool) -> Result<Vec<Service>, AppError> {
        let sql = format!(
            "SELECT {SERVICE_COLUMNS} FROM services
             WHERE ($1 = false OR is_active = true)
             ORDER BY display_order ASC, name ASC"
        );
        let services = sqlx::query_as::<_, Service>(&sql)
            .bind(active_only)
            .fetch_all(&self.pool)
            .await?;

        Ok(services)
    }

    #[instrument(skip(self), err)]
    async fn get_service(&self, id: i64) -> Result<Option<Service>, AppError> {
        let sql = format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1");
        let service = sqlx::query_as::<_, Service>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(service)
    }

    #[instrument(skip(self, service), fields(name = %service.name), err)]
    async fn create_service(&self, service: &NewService) -> Result<Service, AppError> {
        let sql = format!(
            "INSERT INTO services (name, description, display_order, is_active)
             VALUES ($1, $2, $3, $4)
             RETURNING {SERVICE_COLUMNS}"
        );
        sqlx::query_as::<_, Service>(&sql)
            .bind(&service.name)
            .bind(&service.description)
            .bind(service.order)
            .bind(service.is_active)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| {
                conflict_or_database(err, || {
                    format!("A service named '{}' already exists", service.name)
                })
            })
    }

    #[instrument(skip(self, changes), err)]
    async fn update_service(
        &self,
        id: i64,
        changes: &ServiceChanges,
    ) -> Result<Service, AppError> {
        let sql = format!(
            "UPDATE services
             SET name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 display_order = COALESCE($4, display_order),
                 is_active = COALESCE($5, is_active)
             WHERE id = $1
             RETURNING {SERVICE_COLUMNS}"
        );
        sqlx::query_as::<_, Service>(&sql)
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.description)
            .bind(changes.order)
            .bind(changes.is_active)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| {
                conflict_or_database(err, || {
                    format!(
                        "A service named '{}' already exists",
                        changes.name.as_deref().unwrap_or_default()
                    )
                })
            })?
            .ok_or(AppError::ServiceNotFound)
    }

    #[instrument(skip(self), err)]
    async fn delete_service(&self, id: i64) -> Result<bool, AppError> {
        // status_updates rows go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(
        skip(self, update),
        fields(service_id = update.service_id, status = %update.status),
        err
    )]
    async fn create_status_update(
        &self,
        update: &NewStatusUpdate,
    ) -> Result<StatusUpdate, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM services WHERE id = $1)")
            .bind(update.service_id)
            .fetch_one(&self.pool)
            .await?;

        if !exists {
            return Err(AppError::ServiceNotFound);
        }

        let sql = r#"
            WITH su AS (
                INSERT INTO status_updates
                    (service_id, status, problem, plan, comments, created_by, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, NOW()))
                RETURNING *
            )
            SELECT su.id, su.service_id, s.name AS service_name, su.status,
                   su.problem, su.plan, su.comments, su.created_at,
                   su.created_by, u.username AS created_by_username
            FROM su
            JOIN services s ON s.id = su.service_id
            LEFT JOIN users u ON u.id = su.created_by
        "#;

        sqlx::query_as::<_, StatusUpdate>(sql)
            .bind(update.service_id)
            .bind(update.status.as_str())
            .bind(&update.problem)
            .bind(&update.plan)
            .bind(&update.comments)
            .bind(update.created_by)
            .bind(update.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(missing_reference_or_database)
    }

    #[instrument(skip(self), err)]
    async fn get_status_update(&self, id: i64) -> Result<Option<StatusUpdate>, AppError> {
        let sql = format!("{STATUS_UPDATE_SELECT} WHERE su.id = $1");
        let update = sqlx::query_as::<_, StatusUpdate>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(update)
    }

    #[instrument(skip(self), err)]
    async fn current_status(&self, service_id: i64) -> Result<Option<StatusUpdate>, AppError> {
        let sql = format!(
            "{STATUS_UPDATE_SELECT}
             WHERE su.service_id = $1
             ORDER BY su.created_at DESC, su.id DESC
             LIMIT 1"
        );
        let update = sqlx::query_as::<_, StatusUpdate>(&sql)
            .bind(service_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(update)
    }

    #[instrument(skip(self), err)]
    async fn service_history(
        &self,
        service_id: i64,
        limit: i64,
    ) -> Result<Vec<StatusUpdate>, AppError> {
        let sql = format!(
            "{STATUS_UPDATE_SELECT}
             WHERE su.service_id = $1
             ORDER BY su.created_at DESC, su.id DESC
             LIMIT $2"
        );
        let updates = sqlx::query_as::<_, StatusUpdate>(&sql)
            .bind(service_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(updates)
    }

    #[instrument(skip(self), err)]
    async fn recent_updates(&self, limit: i64) -> Result<Vec<StatusUpdate>, AppError> {
        let sql = format!(
            "{STATUS_UPDATE_SELECT}
             ORDER BY su.created_at DESC, su.id DESC
             LIMIT $1"
        );
        let updates = sqlx::query_as::<_, StatusUpdate>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(updates)
    }

    #[instrument(skip(self, key), fields(name = %key.name), err)]
    async fn create_api_key(&self, key: &NewApiKey) -> Result<ApiKey, AppError> {
        let sql = format!(
            "INSERT INTO api_keys (name, key_hash, key_prefix, created_by)
             VALUES ($1, $2, $3, $4)
             RETURNING {API_KEY_COLUMNS}"
        );
        sqlx::query_as::<_, ApiKey>(&sql)
            .bind(&key.name)
            .bind(&key.key_hash)
            .bind(&key.key_prefix)
            .bind(key.created_by)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| conflict_or_database(err, || "API key already exists".to_string()))
    }

    // Hash is skipped from the span: it identifies the credential.
    #[instrument(skip_all, err)]
    async fn find_active_api_key(&self, key_hash: &str) -> Result<Option<ApiKey>, AppError> {
        let sql = format!(
            "SELECT {API_KEY_COLUMNS} FROM api_keys
             WHERE key_hash = $1 AND is_active = true"
        );
        let key = sqlx::query_as::<_, ApiKey>(&sql)
            .bind(key_hash)
            .fetch_optional(&self.pool)
            .await?;

        Ok(key)
    }

    #[instrument(skip(self), err)]
    async fn touch_api_key(&self, id: i64, used_at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query("UPDATE api_keys SET last_used_at = $2 WHERE id = $1")
            .bind(id)
            .bind(used_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn list_api_keys(&self) -> Result<Vec<ApiKey>, AppError> {
        let sql = format!("SELECT {API_KEY_COLUMNS} FROM api_keys ORDER BY created_at DESC, id DESC");
        let keys = sqlx::query_as::<_, ApiKey>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(keys)
    }

    #[instrument(skip(self), err)]
    async fn get_api_key(&self, id: i64) -> Result<Option<ApiKey>, AppError> {
        let sql = format!("SELECT {API_KEY_COLUMNS} FROM api_keys WHERE id = $1");
        let key = sqlx::query_as::<_, ApiKey>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(key)
    }

    #[instrument(skip(self), err)]
    async fn deactivate_api_key(&self, id: i64) -> Result<ApiKey, AppError> {
        let sql = format!(
            "UPDATE api_keys SET is_active = false WHERE id = $1 RETURNING {API_KEY_COLUMNS}"
        );
        sqlx::query_as::<_, ApiKey>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::ApiKeyNotFound)
    }

    #[instrument(skip(self), err)]
    async fn create_user(&self, username: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username) VALUES ($1) RETURNING id, username, created_at",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| conflict_or_database(err, || format!("User '{username}' already exists")))
    }

    #[instrument(skip(self), err)]
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
