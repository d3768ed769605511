//! Postgres repository tests. Run with `cargo test -- --ignored` and a
//! reachable `DATABASE_URL`.

use chrono::{TimeZone, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use tiny_site::domain::entities::{NewZone, ZonePatch};
use tiny_site::domain::repositories::ZoneRepository;
use tiny_site::error::AppError;
use tiny_site::infrastructure::persistence::PgZoneRepository;

fn new_zone(name: &str) -> NewZone {
    NewZone {
        name: name.to_string(),
        owner: "tree".to_string(),
        description: Some("Test zone".to_string()),
        created_at: Utc.with_ymd_and_hms(2019, 5, 1, 8, 0, 0).unwrap(),
    }
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_create_zone(pool: PgPool) {
    let repo = PgZoneRepository::new(Arc::new(pool));

    let zone = repo.create(new_zone("banners")).await.unwrap();

    assert_eq!(zone.name, "banners");
    assert_eq!(zone.owner, "tree");
    assert_eq!(zone.created_at, zone.updated_at);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_name_is_conflict(pool: PgPool) {
    let repo = PgZoneRepository::new(Arc::new(pool));
    repo.create(new_zone("banners")).await.unwrap();

    let result = repo.create(new_zone("banners")).await;

    assert!(matches!(result.unwrap_err(), AppError::Conflict { .. }));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_find_and_list(pool: PgPool) {
    let repo = PgZoneRepository::new(Arc::new(pool));
    let first = repo.create(new_zone("banners")).await.unwrap();
    repo.create(new_zone("avatars")).await.unwrap();

    let found = repo.find_by_name("banners").await.unwrap().unwrap();
    assert_eq!(found.id, first.id);
    assert!(repo.find_by_id(first.id + 100).await.unwrap().is_none());

    let zones = repo.list().await.unwrap();
    assert_eq!(zones.len(), 2);
    assert_eq!(zones[0].name, "banners");
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_update_keeps_unset_fields(pool: PgPool) {
    let repo = PgZoneRepository::new(Arc::new(pool));
    let zone = repo.create(new_zone("banners")).await.unwrap();
    let later = Utc.with_ymd_and_hms(2019, 5, 2, 8, 0, 0).unwrap();

    let patch = ZonePatch {
        owner: Some("vicanso".to_string()),
        ..Default::default()
    };
    let updated = repo.update(zone.id, patch, later).await.unwrap().unwrap();

    assert_eq!(updated.owner, "vicanso");
    assert_eq!(updated.name, "banners");
    assert_eq!(updated.description.as_deref(), Some("Test zone"));
    assert_eq!(updated.updated_at, later);

    let missing = repo
        .update(zone.id + 100, ZonePatch::default(), later)
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_zone(pool: PgPool) {
    let repo = PgZoneRepository::new(Arc::new(pool));
    let zone = repo.create(new_zone("banners")).await.unwrap();

    assert!(repo.delete(zone.id).await.unwrap());
    assert!(!repo.delete(zone.id).await.unwrap());
}
