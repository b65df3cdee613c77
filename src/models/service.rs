//! Service data models and API request/response types.
//!
//! This module defines:
//! - `Service`: Database entity representing a tracked component
//! - `NewService` / `ServiceChanges`: Administrative create and edit payloads
//! - `ServiceWithStatusResponse`: Response body returned to API clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status_update::StatusUpdateResponse;

/// Represents a service record from the database.
///
/// # Database Table
///
/// Maps to the `services` table. Listing order is `(order, name)`.
/// Services are hidden with `is_active = false`; deleting a row removes
/// its whole status history.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct Service {
    pub id: i64,

    /// Unique human-readable name
    pub name: String,

    pub description: String,

    /// Display priority, lower numbers first
    #[sqlx(rename = "display_order")]
    pub order: i32,

    /// Whether the service is shown on the status page
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

/// Payload for creating a service.
#[derive(Debug, Clone)]
pub struct NewService {
    pub name: String,
    pub description: String,
    pub order: i32,
    pub is_active: bool,
}

impl NewService {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            order: 0,
            is_active: true,
        }
    }
}

/// Partial edit of a service; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ServiceChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Response body for service endpoints.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": 1,
///   "name": "API",
///   "description": "Public REST API",
///   "order": 0,
///   "is_active": true,
///   "current_status": null
/// }
/// ```
///
/// `current_status` is `null` when the service has never reported; that
/// means unknown, not stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceWithStatusResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub order: i32,
    pub is_active: bool,
    pub current_status: Option<StatusUpdateResponse>,
}

impl ServiceWithStatusResponse {
    pub fn new(service: Service, current_status: Option<StatusUpdateResponse>) -> Self {
        Self {
            id: service.id,
            name: service.name,
            description: service.description,
            order: service.order,
            is_active: service.is_active,
            current_status,
        }
    }
}
