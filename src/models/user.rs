//! Administrator accounts referenced by status updates and API keys.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Represents a user record from the `users` table.
///
/// Only the username is tracked; authentication of administrators happens
/// outside this service.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}
