//! Status history queries with bounded result sizes.

use crate::{error::AppError, models::status_update::StatusUpdate, store::StatusStore};

/// Default and maximum rows for the cross-service update list.
pub const DEFAULT_LIST_LIMIT: i64 = 50;
pub const MAX_LIST_LIMIT: i64 = 200;

/// Default and maximum rows for a single service's history.
pub const DEFAULT_HISTORY_LIMIT: i64 = 20;
pub const MAX_HISTORY_LIMIT: i64 = 100;

/// Updates served by the public history JSON endpoint.
pub const PUBLIC_HISTORY_LIMIT: i64 = 10;

/// Clamp a requested limit to `max`.
///
/// Negative limits are rejected; zero yields an empty result.
pub fn clamp_limit(requested: Option<i64>, default: i64, max: i64) -> Result<i64, AppError> {
    let limit = requested.unwrap_or(default);
    if limit < 0 {
        return Err(AppError::InvalidArgument(
            "limit must not be negative".to_string(),
        ));
    }

    Ok(limit.min(max))
}

/// Most recent updates across all services.
pub async fn recent_updates(
    store: &dyn StatusStore,
    limit: Option<i64>,
) -> Result<Vec<StatusUpdate>, AppError> {
    let limit = clamp_limit(limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT)?;
    store.recent_updates(limit).await
}

/// History of one service, most recent first.
///
/// The service must exist; inactive services are included.
pub async fn service_history(
    store: &dyn StatusStore,
    service_id: i64,
    limit: Option<i64>,
) -> Result<Vec<StatusUpdate>, AppError> {
    let limit = clamp_limit(limit, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT)?;
    store
        .get_service(service_id)
        .await?
        .ok_or(AppError::ServiceNotFound)?;

    store.service_history(service_id, limit).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_default_when_absent() {
        assert_eq!(clamp_limit(None, 50, 200).unwrap(), 50);
    }

    #[test]
    fn clamps_to_hard_cap() {
        assert_eq!(clamp_limit(Some(1000), 50, 200).unwrap(), 200);
        assert_eq!(clamp_limit(Some(1000), 20, 100).unwrap(), 100);
        assert_eq!(clamp_limit(Some(7), 20, 100).unwrap(), 7);
        assert_eq!(clamp_limit(Some(0), 20, 100).unwrap(), 0);
    }

    #[test]
    fn rejects_negative_limits() {
        assert!(matches!(
            clamp_limit(Some(-1), 20, 100),
            Err(AppError::InvalidArgument(_))
        ));
    }
}
