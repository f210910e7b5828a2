/**
 * Document Backends
 *
 * The router talks to one [`DocumentBackend`] per request. The relational
 * backend keeps a single shared copy per story and ignores the user; the
 * spreadsheet backend keeps a copy per (story, user) and stamps every save.
 */

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::backend::storage::error::{StorageError, StorageResult};
use crate::backend::storage::relational::StoryDataStore;
use crate::backend::storage::sheets::SpreadsheetDocumentStore;
use crate::shared::document::{DocumentKind, JsonWithModified, StoryId, UserId};

/// Provider label that selects spreadsheet storage
pub const GOOGLE_PROVIDER: &str = "google";

/// Uniform document operations over one storage location
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    async fn get(&self, kind: DocumentKind, story_id: StoryId, user_id: UserId) -> StorageResult<Option<String>>;

    async fn save(
        &self,
        kind: DocumentKind,
        story_id: StoryId,
        user_id: UserId,
        json: &str,
        last_modified: DateTime<Utc>,
    ) -> StorageResult<()>;

    async fn get_with_last_modified(
        &self,
        kind: DocumentKind,
        story_id: StoryId,
        user_id: UserId,
    ) -> StorageResult<Option<JsonWithModified>>;
}

/// Shared per-story storage in PostgreSQL
pub struct RelationalBackend {
    store: Arc<dyn StoryDataStore>,
}

impl RelationalBackend {
    pub fn new(store: Arc<dyn StoryDataStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl DocumentBackend for RelationalBackend {
    fn name(&self) -> &'static str {
        "relational"
    }

    async fn get(&self, kind: DocumentKind, story_id: StoryId, _user_id: UserId) -> StorageResult<Option<String>> {
        self.store.get_document(story_id, kind).await
    }

    async fn save(
        &self,
        kind: DocumentKind,
        story_id: StoryId,
        _user_id: UserId,
        json: &str,
        _last_modified: DateTime<Utc>,
    ) -> StorageResult<()> {
        self.store.save_document(story_id, kind, json).await
    }

    /// The table keeps no per-document stamp, so hits carry the sentinel
    async fn get_with_last_modified(
        &self,
        kind: DocumentKind,
        story_id: StoryId,
        _user_id: UserId,
    ) -> StorageResult<Option<JsonWithModified>> {
        Ok(self
            .store
            .get_document(story_id, kind)
            .await?
            .map(JsonWithModified::with_sentinel))
    }
}

/// Per-user storage in a spreadsheet; canvas goes through the chunked path
pub struct SpreadsheetBackend {
    store: Arc<SpreadsheetDocumentStore>,
}

impl SpreadsheetBackend {
    pub fn new(store: Arc<SpreadsheetDocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl DocumentBackend for SpreadsheetBackend {
    fn name(&self) -> &'static str {
        "spreadsheet"
    }

    async fn get(&self, kind: DocumentKind, story_id: StoryId, user_id: UserId) -> StorageResult<Option<String>> {
        if kind.is_chunked() {
            let doc = self.store.read_chunked(story_id, user_id).await?;
            return Ok(doc.map(|d| d.json));
        }
        self.store.get_document(story_id, user_id, kind).await
    }

    async fn save(
        &self,
        kind: DocumentKind,
        story_id: StoryId,
        user_id: UserId,
        json: &str,
        last_modified: DateTime<Utc>,
    ) -> StorageResult<()> {
        if kind.is_chunked() {
            return self.store.save_chunked(story_id, user_id, json, last_modified).await;
        }
        self.store
            .save_document(story_id, user_id, kind, json, last_modified)
            .await
    }

    async fn get_with_last_modified(
        &self,
        kind: DocumentKind,
        story_id: StoryId,
        user_id: UserId,
    ) -> StorageResult<Option<JsonWithModified>> {
        if kind.is_chunked() {
            return self.store.read_chunked(story_id, user_id).await;
        }
        self.store
            .get_document_with_last_modified(story_id, user_id, kind)
            .await
    }
}

/// Which backend a provider binding selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackendKind {
    Relational,
    Spreadsheet,
}

impl StorageBackendKind {
    /// `"google"` in any letter case selects the spreadsheet, everything else
    /// (including no binding) the relational store
    pub fn for_provider(provider: Option<&str>) -> Self {
        match provider {
            Some(p) if p.trim().eq_ignore_ascii_case(GOOGLE_PROVIDER) => Self::Spreadsheet,
            _ => Self::Relational,
        }
    }
}

/// Hands out the backend for a [`StorageBackendKind`]
#[derive(Clone)]
pub struct BackendFactory {
    relational: Arc<dyn DocumentBackend>,
    spreadsheet: Option<Arc<dyn DocumentBackend>>,
}

impl BackendFactory {
    pub fn new(relational: Arc<dyn DocumentBackend>, spreadsheet: Option<Arc<dyn DocumentBackend>>) -> Self {
        Self { relational, spreadsheet }
    }

    /// Wire the concrete stores into their backends
    pub fn from_stores(
        relational: Arc<dyn StoryDataStore>,
        spreadsheet: Option<Arc<SpreadsheetDocumentStore>>,
    ) -> Self {
        Self::new(
            Arc::new(RelationalBackend::new(relational)),
            spreadsheet.map(|s| Arc::new(SpreadsheetBackend::new(s)) as Arc<dyn DocumentBackend>),
        )
    }

    pub fn relational(&self) -> Arc<dyn DocumentBackend> {
        self.relational.clone()
    }

    pub fn has_spreadsheet(&self) -> bool {
        self.spreadsheet.is_some()
    }

    pub fn backend_for(&self, kind: StorageBackendKind) -> StorageResult<Arc<dyn DocumentBackend>> {
        match kind {
            StorageBackendKind::Relational => Ok(self.relational.clone()),
            StorageBackendKind::Spreadsheet => self.spreadsheet.clone().ok_or_else(|| {
                StorageError::unsupported("spreadsheet storage", "no spreadsheet is configured")
            }),
        }
    }
}
