//! MongoDB repository tests for the catalog domain.
//!
//! These run against a real MongoDB container and are ignored by default:
//!
//! ```sh
//! cargo test -p domain_catalog --test mongo_test -- --ignored
//! ```

use domain_catalog::{
    CatalogError, CatalogEvent, CatalogEventRepository, CreateCatalogEvent, EventStatus,
    MongoCatalogEventRepository, init_indexes,
};
use test_utils::TestMongo;

fn create_input(event_id: Option<&str>, title: &str) -> CreateCatalogEvent {
    CreateCatalogEvent {
        event_id: event_id.map(String::from),
        title: title.to_string(),
        description: "Monthly meetup".to_string(),
        date: "2026-09-01T18:00:00".to_string(),
        location: "Community Hall".to_string(),
        capacity: 50,
        organizer: "Rust Group".to_string(),
        status: EventStatus::Draft,
    }
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_crud_round_trip() {
    let mongo = TestMongo::new().await;
    let db = mongo.database("catalog_crud");
    init_indexes(&db).await.unwrap();
    let repo = MongoCatalogEventRepository::new(&db);

    let created = repo
        .insert(CatalogEvent::new(create_input(Some("e1"), "Rust Meetup")))
        .await
        .unwrap();
    assert_eq!(created.event_id, "e1");

    let found = repo.find_by_id("e1").await.unwrap().expect("stored event");
    assert_eq!(found.title, "Rust Meetup");
    assert_eq!(found.status, EventStatus::Draft);

    let mut updated = found.clone();
    updated.title = "Renamed".to_string();
    assert!(repo.replace(&updated).await.unwrap());
    let found = repo.find_by_id("e1").await.unwrap().expect("stored event");
    assert_eq!(found.title, "Renamed");

    let removed = repo.delete_by_id("e1").await.unwrap();
    assert_eq!(removed.map(|event| event.event_id), Some("e1".to_string()));
    assert!(repo.find_by_id("e1").await.unwrap().is_none());
    assert!(repo.delete_by_id("e1").await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_duplicate_event_id_rejected() {
    let mongo = TestMongo::new().await;
    let db = mongo.database("catalog_duplicate");
    init_indexes(&db).await.unwrap();
    let repo = MongoCatalogEventRepository::new(&db);

    repo.insert(CatalogEvent::new(create_input(Some("e1"), "First")))
        .await
        .unwrap();
    let result = repo
        .insert(CatalogEvent::new(create_input(Some("e1"), "Second")))
        .await;

    match result {
        Err(CatalogError::Duplicate(id)) => assert_eq!(id, "e1"),
        other => panic!("expected duplicate error, got {:?}", other),
    }
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_list_filters_and_limits() {
    let mongo = TestMongo::new().await;
    let db = mongo.database("catalog_list");
    init_indexes(&db).await.unwrap();
    let repo = MongoCatalogEventRepository::new(&db);

    for i in 0..3 {
        let mut input = create_input(Some(&format!("draft-{i}")), "Draft event");
        input.status = EventStatus::Draft;
        repo.insert(CatalogEvent::new(input)).await.unwrap();
    }
    let mut input = create_input(Some("published-0"), "Published event");
    input.status = EventStatus::Published;
    repo.insert(CatalogEvent::new(input)).await.unwrap();

    let all = repo.list(100, None).await.unwrap();
    assert_eq!(all.len(), 4);

    let published = repo.list(100, Some(EventStatus::Published)).await.unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].event_id, "published-0");

    let limited = repo.list(2, None).await.unwrap();
    assert_eq!(limited.len(), 2);
}
