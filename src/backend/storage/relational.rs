/**
 * Relational Document Store
 *
 * One `story_data` row per story holds the canvas, character and timeline
 * JSON side by side. Saving a kind is a single upsert that touches only that
 * kind's column and the row's `updated_at`.
 *
 * There is no optimistic concurrency token. Two saves of different kinds for
 * the same story race only on `updated_at`.
 */

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::backend::storage::error::StorageResult;
use crate::shared::document::{DocumentKind, StoryId};

/// Story-scoped document persistence
#[async_trait]
pub trait StoryDataStore: Send + Sync {
    /// Stored JSON for the kind, `None` when the row or the column is empty
    async fn get_document(&self, story_id: StoryId, kind: DocumentKind) -> StorageResult<Option<String>>;

    /// Overwrite the kind's column, creating the story row if needed
    async fn save_document(&self, story_id: StoryId, kind: DocumentKind, json: &str) -> StorageResult<()>;
}

/// Column holding the given kind in `story_data`
fn column_for(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Canvas => "canvas_json",
        DocumentKind::Character => "character_json",
        DocumentKind::Timeline => "timeline_json",
    }
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStoryDataStore {
    pool: PgPool,
}

impl PgStoryDataStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoryDataStore for PgStoryDataStore {
    async fn get_document(&self, story_id: StoryId, kind: DocumentKind) -> StorageResult<Option<String>> {
        let query = format!(
            "SELECT {} FROM story_data WHERE story_id = $1",
            column_for(kind)
        );
        let json: Option<Option<String>> = sqlx::query_scalar(&query)
            .bind(story_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(json.flatten())
    }

    async fn save_document(&self, story_id: StoryId, kind: DocumentKind, json: &str) -> StorageResult<()> {
        // Whichever save reaches a new story first creates its row.
        let query = format!(
            r#"
            INSERT INTO story_data (story_id, {col}, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (story_id)
            DO UPDATE SET {col} = EXCLUDED.{col}, updated_at = EXCLUDED.updated_at
            "#,
            col = column_for(kind)
        );
        sqlx::query(&query)
            .bind(story_id)
            .bind(json)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        tracing::debug!(story_id, kind = %kind, "saved relational document");
        Ok(())
    }
}

/// One `story_data` row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryDataRow {
    pub canvas_json: Option<String>,
    pub character_json: Option<String>,
    pub timeline_json: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoryDataRow {
    fn field(&self, kind: DocumentKind) -> &Option<String> {
        match kind {
            DocumentKind::Canvas => &self.canvas_json,
            DocumentKind::Character => &self.character_json,
            DocumentKind::Timeline => &self.timeline_json,
        }
    }

    fn field_mut(&mut self, kind: DocumentKind) -> &mut Option<String> {
        match kind {
            DocumentKind::Canvas => &mut self.canvas_json,
            DocumentKind::Character => &mut self.character_json,
            DocumentKind::Timeline => &mut self.timeline_json,
        }
    }
}

/// In-memory store used when no database is configured and in tests
#[derive(Default)]
pub struct MemoryStoryDataStore {
    rows: RwLock<HashMap<StoryId, StoryDataRow>>,
}

impl MemoryStoryDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a story's row
    pub async fn row(&self, story_id: StoryId) -> Option<StoryDataRow> {
        self.rows.read().await.get(&story_id).cloned()
    }

    /// Number of story rows
    pub async fn row_count(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl StoryDataStore for MemoryStoryDataStore {
    async fn get_document(&self, story_id: StoryId, kind: DocumentKind) -> StorageResult<Option<String>> {
        Ok(self
            .rows
            .read()
            .await
            .get(&story_id)
            .and_then(|row| row.field(kind).clone()))
    }

    async fn save_document(&self, story_id: StoryId, kind: DocumentKind, json: &str) -> StorageResult<()> {
        let mut rows = self.rows.write().await;
        let row = rows.entry(story_id).or_default();
        *row.field_mut(kind) = Some(json.to_string());
        row.updated_at = Some(Utc::now());
        Ok(())
    }
}
