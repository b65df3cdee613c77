//! API key authentication and issuance.
//!
//! Keys are 64 hex characters generated from 32 random bytes. Only their
//! SHA-256 hash is stored, so lookups compare hashes and never the
//! plaintext token.

use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::{
    error::AppError,
    models::api_key::{ApiKey, IssuedApiKey, NewApiKey},
    store::StatusStore,
};

/// Number of leading key characters stored for identification.
pub const KEY_PREFIX_LEN: usize = 8;

/// Insert attempts before giving up on hash collisions.
const ISSUE_ATTEMPTS: usize = 3;

/// Hash an API key with SHA-256, hex-encoded.
pub fn hash_api_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate a new random API key (64 hex characters).
pub fn generate_api_key() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// Validate a bearer token and record its use.
///
/// # Flow
///
/// 1. Hash the token
/// 2. Look up an active key with that hash
/// 3. Stamp `last_used_at`; a failure here is logged and does not deny access
///
/// # Errors
///
/// `Unauthenticated` when no active key matches, whether the key never
/// existed or was revoked.
pub async fn authenticate(store: &dyn StatusStore, token: &str) -> Result<ApiKey, AppError> {
    let key_hash = hash_api_key(token);

    let mut api_key = store
        .find_active_api_key(&key_hash)
        .await?
        .ok_or(AppError::Unauthenticated)?;

    let now = Utc::now();
    match store.touch_api_key(api_key.id, now).await {
        Ok(()) => api_key.last_used_at = Some(now),
        Err(err) => {
            tracing::warn!(api_key_id = api_key.id, error = %err, "Failed to record API key use");
        }
    }

    Ok(api_key)
}

/// Issue a new API key on behalf of an administrator.
///
/// `created_by` is resolved by username. The returned plaintext key is not
/// stored anywhere and cannot be shown again.
pub async fn issue_api_key(
    store: &dyn StatusStore,
    name: &str,
    created_by: Option<&str>,
) -> Result<IssuedApiKey, AppError> {
    let created_by = match created_by {
        Some(username) => Some(
            store
                .find_user_by_username(username)
                .await?
                .ok_or(AppError::UserNotFound)?
                .id,
        ),
        None => None,
    };

    let mut last_conflict = None;
    for _ in 0..ISSUE_ATTEMPTS {
        let key = generate_api_key();
        let new_key = NewApiKey {
            name: name.to_string(),
            key_hash: hash_api_key(&key),
            key_prefix: key.chars().take(KEY_PREFIX_LEN).collect(),
            created_by,
        };

        match store.create_api_key(&new_key).await {
            Ok(record) => {
                tracing::info!(api_key_id = record.id, name = %record.name, "API key issued");
                return Ok(IssuedApiKey { record, key });
            }
            Err(AppError::Conflict(message)) => {
                tracing::warn!("API key collision, regenerating");
                last_conflict = Some(message);
            }
            Err(err) => return Err(err),
        }
    }

    Err(AppError::Conflict(last_conflict.unwrap_or_else(|| {
        "Could not generate a unique API key".to_string()
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn generated_keys_are_64_hex_chars_and_distinct() {
        let a = generate_api_key();
        let b = generate_api_key();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn hash_is_stable_sha256() {
        assert_eq!(
            hash_api_key("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn first_use_sets_last_used_at() {
        let store = MemoryStore::new();
        let issued = issue_api_key(&store, "Test App", None).await.unwrap();
        assert!(issued.record.last_used_at.is_none());
        assert!(issued.record.is_active);

        let authenticated = authenticate(&store, &issued.key).await.unwrap();
        assert_eq!(authenticated.id, issued.record.id);

        let stored = store.get_api_key(issued.record.id).await.unwrap().unwrap();
        assert!(stored.last_used_at.is_some());
    }

    #[tokio::test]
    async fn revoked_key_is_rejected() {
        let store = MemoryStore::new();
        let issued = issue_api_key(&store, "Test App", None).await.unwrap();
        store.deactivate_api_key(issued.record.id).await.unwrap();

        let err = authenticate(&store, &issued.key).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated));
    }

    #[tokio::test]
    async fn unknown_key_is_rejected() {
        let store = MemoryStore::new();
        issue_api_key(&store, "Test App", None).await.unwrap();

        let err = authenticate(&store, "invalid_key_12345").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated));
    }

    #[tokio::test]
    async fn stores_only_hash_and_prefix() {
        let store = MemoryStore::new();
        let issued = issue_api_key(&store, "Test App", None).await.unwrap();

        assert_eq!(issued.record.key_hash, hash_api_key(&issued.key));
        assert_eq!(issued.record.key_prefix, issued.key[..KEY_PREFIX_LEN]);
        assert_ne!(issued.record.key_hash, issued.key);
    }

    #[tokio::test]
    async fn records_issuing_user() {
        let store = MemoryStore::new();
        let admin = store.create_user("admin").await.unwrap();

        let issued = issue_api_key(&store, "Deploy bot", Some("admin")).await.unwrap();
        assert_eq!(issued.record.created_by, Some(admin.id));

        let err = issue_api_key(&store, "Deploy bot", Some("ghost")).await.unwrap_err();
        assert!(matches!(err, AppError::UserNotFound));
    }
}
