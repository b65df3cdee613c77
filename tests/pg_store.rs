//! PostgreSQL store tests. Run with `DATABASE_URL` set and `--ignored`.

use chrono::{TimeZone, Utc};
use sqlx::PgPool;

use status_dashboard::{
    error::AppError,
    models::{
        api_key::NewApiKey,
        service::{NewService, ServiceChanges},
        status_update::{NewStatusUpdate, ServiceStatus},
    },
    services::auth_service,
    store::{PgStore, StatusStore},
};

fn new_update(service_id: i64, status: ServiceStatus) -> NewStatusUpdate {
    NewStatusUpdate {
        service_id,
        status,
        problem: String::new(),
        plan: String::new(),
        comments: String::new(),
        created_by: None,
        created_at: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn services_are_listed_in_display_order(pool: PgPool) {
    let store = PgStore::new(pool);
    for (name, order) in [("Zeta", 0), ("Alpha", 1), ("Beta", 0)] {
        let mut service = NewService::named(name);
        service.order = order;
        store.create_service(&service).await.unwrap();
    }

    let names: Vec<String> = store
        .list_services(false)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, ["Beta", "Zeta", "Alpha"]);

    let err = store.create_service(&NewService::named("Beta")).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn current_status_breaks_timestamp_ties_by_insertion(pool: PgPool) {
    let store = PgStore::new(pool);
    let service = store.create_service(&NewService::named("API")).await.unwrap();
    let at = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();

    let mut first = new_update(service.id, ServiceStatus::Down);
    first.created_at = Some(at);
    let mut second = new_update(service.id, ServiceStatus::Stable);
    second.created_at = Some(at);
    store.create_status_update(&first).await.unwrap();
    let second = store.create_status_update(&second).await.unwrap();

    let current = store.current_status(service.id).await.unwrap().unwrap();
    assert_eq!(current, second);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn unknown_service_is_rejected(pool: PgPool) {
    let store = PgStore::new(pool);

    let err = store
        .create_status_update(&new_update(999_999, ServiceStatus::Down))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ServiceNotFound));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn delete_cascades_while_soft_disable_keeps_history(pool: PgPool) {
    let store = PgStore::new(pool);
    let kept = store.create_service(&NewService::named("Kept")).await.unwrap();
    let removed = store.create_service(&NewService::named("Removed")).await.unwrap();
    store
        .create_status_update(&new_update(kept.id, ServiceStatus::Degraded))
        .await
        .unwrap();
    let doomed = store
        .create_status_update(&new_update(removed.id, ServiceStatus::Down))
        .await
        .unwrap();

    let changes = ServiceChanges {
        is_active: Some(false),
        ..ServiceChanges::default()
    };
    store.update_service(kept.id, &changes).await.unwrap();
    assert!(store.delete_service(removed.id).await.unwrap());

    assert_eq!(store.service_history(kept.id, 100).await.unwrap().len(), 1);
    assert!(store.get_status_update(doomed.id).await.unwrap().is_none());
    assert!(store.list_services(true).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn authentication_tracks_last_use(pool: PgPool) {
    let store = PgStore::new(pool);
    let issued = auth_service::issue_api_key(&store, "Test App", None).await.unwrap();
    assert!(issued.record.last_used_at.is_none());

    auth_service::authenticate(&store, &issued.key).await.unwrap();
    let used = store.get_api_key(issued.record.id).await.unwrap().unwrap();
    assert!(used.last_used_at.is_some());

    store.deactivate_api_key(issued.record.id).await.unwrap();
    let err = auth_service::authenticate(&store, &issued.key).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn duplicate_key_hash_is_a_conflict(pool: PgPool) {
    let store = PgStore::new(pool);
    let key = NewApiKey {
        name: "CI".to_string(),
        key_hash: auth_service::hash_api_key("fixed"),
        key_prefix: "fixed".to_string(),
        created_by: None,
    };
    store.create_api_key(&key).await.unwrap();

    let err = store.create_api_key(&key).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}
