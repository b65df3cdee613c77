//! Status update data models and API request/response types.
//!
//! This module defines:
//! - `ServiceStatus`: The five recognized status codes and their display metadata
//! - `StatusUpdate`: Database entity (joined with its service and author)
//! - `NewStatusUpdate`: Insert payload used by the store
//! - `CreateStatusUpdateRequest`: Request body for the API
//! - `StatusUpdateResponse` / `PublicStatusUpdate`: Response bodies returned to clients

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Operational status of a service at a point in time.
///
/// Stored as its short code (`stable`, `degraded`, ...). Variants are
/// declared in display order, which is not the severity order; use
/// [`ServiceStatus::severity`] when comparing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Stable,
    Degraded,
    Partial,
    Down,
    Maintenance,
}

impl ServiceStatus {
    /// Every status in display order.
    pub const ALL: [ServiceStatus; 5] = [
        ServiceStatus::Stable,
        ServiceStatus::Degraded,
        ServiceStatus::Partial,
        ServiceStatus::Down,
        ServiceStatus::Maintenance,
    ];

    /// Short code as stored in the database and exchanged over the API.
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceStatus::Stable => "stable",
            ServiceStatus::Degraded => "degraded",
            ServiceStatus::Partial => "partial",
            ServiceStatus::Down => "down",
            ServiceStatus::Maintenance => "maintenance",
        }
    }

    /// Human-readable label.
    pub fn display_name(self) -> &'static str {
        match self {
            ServiceStatus::Stable => "Stable",
            ServiceStatus::Degraded => "Degraded Performance",
            ServiceStatus::Partial => "Partial Outage",
            ServiceStatus::Down => "Major Outage",
            ServiceStatus::Maintenance => "Maintenance",
        }
    }

    /// Color name used by the status page.
    pub fn color(self) -> &'static str {
        match self {
            ServiceStatus::Stable => "green",
            ServiceStatus::Degraded => "yellow",
            ServiceStatus::Partial => "orange",
            ServiceStatus::Down => "red",
            ServiceStatus::Maintenance => "blue",
        }
    }

    /// Badge color used by administrative listings.
    pub fn badge_hex(self) -> &'static str {
        match self {
            ServiceStatus::Stable => "#10b981",
            ServiceStatus::Degraded => "#f59e0b",
            ServiceStatus::Partial => "#f97316",
            ServiceStatus::Down => "#ef4444",
            ServiceStatus::Maintenance => "#3b82f6",
        }
    }

    /// Severity rank: `down > partial > degraded > maintenance > stable`.
    pub fn severity(self) -> u8 {
        match self {
            ServiceStatus::Stable => 0,
            ServiceStatus::Maintenance => 1,
            ServiceStatus::Degraded => 2,
            ServiceStatus::Partial => 3,
            ServiceStatus::Down => 4,
        }
    }

    /// Comma-separated list of the valid codes, for error messages.
    pub fn valid_codes() -> String {
        Self::ALL
            .iter()
            .map(|status| status.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceStatus {
    type Err = AppError;

    /// Parse a status code. Matching is exact (case-sensitive).
    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == code)
            .ok_or_else(|| AppError::InvalidStatus(code.to_string()))
    }
}

impl TryFrom<String> for ServiceStatus {
    type Error = AppError;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        code.parse()
    }
}

/// Represents a status update record from the database.
///
/// # Database Table
///
/// Maps to the `status_updates` table joined with `services` (for
/// `service_name`) and `users` (for `created_by_username`). Rows are
/// append-only: there is no update or delete path.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StatusUpdate {
    pub id: i64,

    /// Owning service
    pub service_id: i64,

    /// Name of the owning service at read time
    pub service_name: String,

    #[sqlx(try_from = "String")]
    pub status: ServiceStatus,

    /// Description of the problem (empty when none)
    pub problem: String,

    /// Plan to resolve the issue (empty when none)
    pub plan: String,

    /// Free-form comments, mostly supplied by API clients
    pub comments: String,

    pub created_at: DateTime<Utc>,

    /// Acting administrator; `None` for API-originated updates
    pub created_by: Option<i64>,

    pub created_by_username: Option<String>,
}

/// Insert payload for a new status update.
#[derive(Debug, Clone)]
pub struct NewStatusUpdate {
    pub service_id: i64,
    pub status: ServiceStatus,
    pub problem: String,
    pub plan: String,
    pub comments: String,

    /// Acting user, if any
    pub created_by: Option<i64>,

    /// Explicit timestamp; defaults to the insert time
    pub created_at: Option<DateTime<Utc>>,
}

/// Request body for creating a status update through the API.
///
/// # JSON Example
///
/// ```json
/// {
///   "service_id": 1,
///   "status": "down",
///   "comments": "db lost",
///   "plan": "Failing over to the replica"
/// }
/// ```
///
/// `status` is kept as a raw string so an unknown value can be rejected
/// with a message listing the valid codes.
#[derive(Debug, Deserialize)]
pub struct CreateStatusUpdateRequest {
    pub service_id: i64,

    pub status: String,

    #[serde(default)]
    pub comments: Option<String>,

    #[serde(default)]
    pub plan: Option<String>,
}

/// Response body for status update endpoints.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": 42,
///   "service_id": 1,
///   "service_name": "API",
///   "status": "down",
///   "status_display": "Major Outage",
///   "comments": "db lost",
///   "plan": "",
///   "created_at": "2025-12-20T10:00:00Z",
///   "created_by_username": null
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdateResponse {
    pub id: i64,
    pub service_id: i64,
    pub service_name: String,
    pub status: ServiceStatus,
    pub status_display: String,
    pub comments: String,
    pub plan: String,
    pub created_at: DateTime<Utc>,
    pub created_by_username: Option<String>,
}

impl From<StatusUpdate> for StatusUpdateResponse {
    fn from(update: StatusUpdate) -> Self {
        Self {
            id: update.id,
            service_id: update.service_id,
            service_name: update.service_name,
            status: update.status,
            status_display: update.status.display_name().to_string(),
            comments: update.comments,
            plan: update.plan,
            created_at: update.created_at,
            created_by_username: update.created_by_username,
        }
    }
}

/// Update shape served by the public history endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PublicStatusUpdate {
    pub status_display: &'static str,
    pub status_code: ServiceStatus,
    pub problem: String,
    pub plan: String,

    /// ISO-8601 timestamp
    pub created_at: String,

    pub created_by: Option<String>,
}

impl From<StatusUpdate> for PublicStatusUpdate {
    fn from(update: StatusUpdate) -> Self {
        Self {
            status_display: update.status.display_name(),
            status_code: update.status,
            problem: update.problem,
            plan: update.plan,
            created_at: update.created_at.to_rfc3339(),
            created_by: update.created_by_username,
        }
    }
}
