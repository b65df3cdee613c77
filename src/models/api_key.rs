//! API Key model for authentication.
//!
//! API keys authenticate clients that push status updates. They are stored
//! in the database as SHA-256 hashes; the plaintext is only shown once, when
//! the key is issued.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Represents an API key record from the database.
///
/// # Database Table
///
/// Maps to the `api_keys` table with columns:
/// - `id`: Unique identifier
/// - `name`: Label chosen by the administrator
/// - `key_hash`: SHA-256 hash of the actual API key
/// - `key_prefix`: First characters of the plaintext, for identification
/// - `is_active`: Whether the key is currently valid
/// - `created_at` / `last_used_at`: Issue time and last successful authentication
/// - `created_by`: Issuing administrator
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct ApiKey {
    pub id: i64,

    pub name: String,

    /// SHA-256 hash of the actual API key (64 hex characters)
    ///
    /// When a request comes in with "Bearer abc123", we:
    /// 1. Hash "abc123" with SHA-256
    /// 2. Look up this hash among active keys
    /// 3. If found, authenticate the request
    #[serde(skip_serializing)]
    pub key_hash: String,

    pub key_prefix: String,

    /// Inactive keys are rejected during authentication. This revokes
    /// access without deleting the record.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,

    /// Set on every successful authentication
    pub last_used_at: Option<DateTime<Utc>>,

    pub created_by: Option<i64>,
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_active { "Active" } else { "Inactive" };
        write!(f, "{} ({})", self.name, state)
    }
}

/// Insert payload for a new key. The hash is computed by the caller.
#[derive(Debug, Clone)]
pub struct NewApiKey {
    pub name: String,
    pub key_hash: String,
    pub key_prefix: String,
    pub created_by: Option<i64>,
}

/// A freshly issued key together with its plaintext value.
#[derive(Debug, Clone)]
pub struct IssuedApiKey {
    pub record: ApiKey,

    /// 64-character token; not recoverable after this point
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(is_active: bool) -> ApiKey {
        ApiKey {
            id: 1,
            name: "Test App".to_string(),
            key_hash: "0".repeat(64),
            key_prefix: "abcd1234".to_string(),
            is_active,
            created_at: Utc::now(),
            last_used_at: None,
            created_by: None,
        }
    }

    #[test]
    fn display_shows_activity() {
        assert_eq!(key(true).to_string(), "Test App (Active)");
        assert_eq!(key(false).to_string(), "Test App (Inactive)");
    }

    #[test]
    fn hash_is_never_serialized() {
        let json = serde_json::to_value(key(true)).unwrap();
        assert!(json.get("key_hash").is_none());
        assert_eq!(json["key_prefix"], "abcd1234");
    }
}
