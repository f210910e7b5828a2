//! PostgreSQL-backed stores
//!
//! Run with `cargo test -- --ignored` against a database in `DATABASE_URL`.

mod common;

use serial_test::serial;

use common::database::TestDatabase;
use storyvault::backend::auth::{PgProviderLookup, ProviderLookup};
use storyvault::backend::storage::{PgStoryDataStore, StoryDataStore};
use storyvault::backend::stories::{PgStoryDirectory, StoryDirectory};
use storyvault::shared::document::DocumentKind;

#[tokio::test]
#[ignore]
#[serial]
async fn relational_save_touches_only_its_column() {
    let db = TestDatabase::new().await;
    let story = db.create_story(7, "Harbor").await;
    let store = PgStoryDataStore::new(db.pool().clone());

    assert_eq!(store.get_document(story, DocumentKind::Canvas).await.unwrap(), None);

    store.save_document(story, DocumentKind::Canvas, r#"{"strokes":[]}"#).await.unwrap();
    store.save_document(story, DocumentKind::Timeline, r#"{"events":[]}"#).await.unwrap();
    store.save_document(story, DocumentKind::Character, r#"{"characters":[]}"#).await.unwrap();

    assert_eq!(
        store.get_document(story, DocumentKind::Canvas).await.unwrap().as_deref(),
        Some(r#"{"strokes":[]}"#)
    );
    assert_eq!(
        store.get_document(story, DocumentKind::Timeline).await.unwrap().as_deref(),
        Some(r#"{"events":[]}"#)
    );

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM story_data WHERE story_id = $1")
        .bind(story)
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
#[ignore]
#[serial]
async fn concurrent_first_saves_of_different_kinds_both_land() {
    let db = TestDatabase::new().await;
    let story = db.create_story(7, "Race").await;
    let store = PgStoryDataStore::new(db.pool().clone());

    let (canvas, timeline) = tokio::join!(
        store.save_document(story, DocumentKind::Canvas, r#"{"strokes":[1]}"#),
        store.save_document(story, DocumentKind::Timeline, r#"{"events":[]}"#),
    );
    canvas.unwrap();
    timeline.unwrap();

    assert_eq!(
        store.get_document(story, DocumentKind::Canvas).await.unwrap().as_deref(),
        Some(r#"{"strokes":[1]}"#)
    );
    assert_eq!(
        store.get_document(story, DocumentKind::Timeline).await.unwrap().as_deref(),
        Some(r#"{"events":[]}"#)
    );
    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM story_data WHERE story_id = $1")
        .bind(story)
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
#[ignore]
#[serial]
async fn story_directory_access_and_soft_delete() {
    let db = TestDatabase::new().await;
    let owned = db.create_story(7, "Mine").await;
    let shared = db.create_story(8, "Theirs").await;
    db.share_story(shared, 7).await;
    let dir = PgStoryDirectory::new(db.pool().clone());

    assert!(dir.has_access(7, owned).await.unwrap());
    assert!(dir.has_access(7, shared).await.unwrap());
    assert!(!dir.has_access(9, owned).await.unwrap());
    assert_eq!(dir.owned_story_ids(7).await.unwrap(), vec![owned]);

    sqlx::query("UPDATE stories SET deleted_at = NOW() WHERE id = $1")
        .bind(owned)
        .execute(db.pool())
        .await
        .unwrap();
    assert!(!dir.story_exists(owned).await.unwrap());
    assert!(dir.owned_story_ids(7).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore]
#[serial]
async fn provider_lookup() {
    let db = TestDatabase::new().await;
    db.bind_provider(7, "google").await;
    let lookup = PgProviderLookup::new(db.pool().clone());

    assert_eq!(lookup.get_provider(7).await.unwrap().as_deref(), Some("google"));
    assert_eq!(lookup.get_provider(8).await.unwrap(), None);
}
