/**
 * Storage Router
 *
 * Every document operation first asks the provider lookup which identity
 * provider the caller is bound to, then hands the call to the matching
 * backend. Nothing is cached between calls, so a binding change takes
 * effect on the next request. Lookup and backend failures propagate as-is.
 */

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::backend::auth::providers::ProviderLookup;
use crate::backend::storage::backend::{BackendFactory, DocumentBackend, StorageBackendKind};
use crate::backend::storage::error::StorageResult;
use crate::shared::document::{DocumentKind, JsonWithModified, StoryId, UserId};

/// Dispatches document operations to the caller's backend
#[derive(Clone)]
pub struct StorageRouter {
    providers: Arc<dyn ProviderLookup>,
    factory: BackendFactory,
}

impl StorageRouter {
    pub fn new(providers: Arc<dyn ProviderLookup>, factory: BackendFactory) -> Self {
        Self { providers, factory }
    }

    pub fn factory(&self) -> &BackendFactory {
        &self.factory
    }

    /// Backend selected by the user's current provider binding
    pub async fn backend_for_user(&self, user_id: UserId) -> StorageResult<Arc<dyn DocumentBackend>> {
        let provider = self.providers.get_provider(user_id).await?;
        let kind = StorageBackendKind::for_provider(provider.as_deref());
        let backend = self.factory.backend_for(kind)?;
        tracing::debug!(
            user_id,
            provider = provider.as_deref().unwrap_or("none"),
            backend = backend.name(),
            "resolved storage backend"
        );
        Ok(backend)
    }

    pub async fn get(&self, kind: DocumentKind, story_id: StoryId, user_id: UserId) -> StorageResult<Option<String>> {
        self.backend_for_user(user_id).await?.get(kind, story_id, user_id).await
    }

    pub async fn save(
        &self,
        kind: DocumentKind,
        story_id: StoryId,
        user_id: UserId,
        json: &str,
        last_modified: DateTime<Utc>,
    ) -> StorageResult<()> {
        self.backend_for_user(user_id)
            .await?
            .save(kind, story_id, user_id, json, last_modified)
            .await
    }

    pub async fn get_with_last_modified(
        &self,
        kind: DocumentKind,
        story_id: StoryId,
        user_id: UserId,
    ) -> StorageResult<Option<JsonWithModified>> {
        self.backend_for_user(user_id)
            .await?
            .get_with_last_modified(kind, story_id, user_id)
            .await
    }

    pub async fn get_canvas(&self, story_id: StoryId, user_id: UserId) -> StorageResult<Option<String>> {
        self.get(DocumentKind::Canvas, story_id, user_id).await
    }

    pub async fn save_canvas(
        &self,
        story_id: StoryId,
        user_id: UserId,
        json: &str,
        last_modified: DateTime<Utc>,
    ) -> StorageResult<()> {
        self.save(DocumentKind::Canvas, story_id, user_id, json, last_modified).await
    }

    pub async fn get_canvas_with_last_modified(
        &self,
        story_id: StoryId,
        user_id: UserId,
    ) -> StorageResult<Option<JsonWithModified>> {
        self.get_with_last_modified(DocumentKind::Canvas, story_id, user_id).await
    }

    pub async fn get_character(&self, story_id: StoryId, user_id: UserId) -> StorageResult<Option<String>> {
        self.get(DocumentKind::Character, story_id, user_id).await
    }

    pub async fn save_character(
        &self,
        story_id: StoryId,
        user_id: UserId,
        json: &str,
        last_modified: DateTime<Utc>,
    ) -> StorageResult<()> {
        self.save(DocumentKind::Character, story_id, user_id, json, last_modified).await
    }

    pub async fn get_character_with_last_modified(
        &self,
        story_id: StoryId,
        user_id: UserId,
    ) -> StorageResult<Option<JsonWithModified>> {
        self.get_with_last_modified(DocumentKind::Character, story_id, user_id).await
    }

    pub async fn get_timeline(&self, story_id: StoryId, user_id: UserId) -> StorageResult<Option<String>> {
        self.get(DocumentKind::Timeline, story_id, user_id).await
    }

    pub async fn save_timeline(
        &self,
        story_id: StoryId,
        user_id: UserId,
        json: &str,
        last_modified: DateTime<Utc>,
    ) -> StorageResult<()> {
        self.save(DocumentKind::Timeline, story_id, user_id, json, last_modified).await
    }

    pub async fn get_timeline_with_last_modified(
        &self,
        story_id: StoryId,
        user_id: UserId,
    ) -> StorageResult<Option<JsonWithModified>> {
        self.get_with_last_modified(DocumentKind::Timeline, story_id, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::providers::MemoryProviderLookup;
    use crate::backend::storage::error::StorageError;
    use crate::backend::storage::relational::MemoryStoryDataStore;
    use crate::backend::storage::sheets::{MemorySheets, SpreadsheetDocumentStore};
    use crate::shared::config::SheetsConfig;
    use async_trait::async_trait;
    use chrono::TimeZone;

    struct Fixture {
        providers: Arc<MemoryProviderLookup>,
        relational: Arc<MemoryStoryDataStore>,
        sheets: Arc<MemorySheets>,
        router: StorageRouter,
    }

    fn fixture() -> Fixture {
        let providers = Arc::new(MemoryProviderLookup::new());
        let relational = Arc::new(MemoryStoryDataStore::new());
        let sheets = Arc::new(MemorySheets::new());
        let config = SheetsConfig::builder().spreadsheet_id("test").build().unwrap();
        let spreadsheet = Arc::new(SpreadsheetDocumentStore::new(sheets.clone(), config));
        let factory = BackendFactory::from_stores(relational.clone(), Some(spreadsheet));
        let router = StorageRouter::new(providers.clone(), factory);
        Fixture { providers, relational, sheets, router }
    }

    struct FailingLookup;

    #[async_trait]
    impl ProviderLookup for FailingLookup {
        async fn get_provider(&self, _user_id: UserId) -> StorageResult<Option<String>> {
            Err(StorageError::sheets_api(500, "lookup down"))
        }
    }

    #[tokio::test]
    async fn test_unbound_user_goes_relational() {
        let f = fixture();
        f.router.save_character(5, 1, r#"{"characters":[]}"#, Utc::now()).await.unwrap();

        assert!(f.relational.row(5).await.unwrap().character_json.is_some());
        assert!(f.sheets.rows("Character").await.is_empty());
        let doc = f.router.get_character_with_last_modified(5, 1).await.unwrap().unwrap();
        assert!(doc.is_sentinel());
    }

    #[tokio::test]
    async fn test_google_user_goes_to_spreadsheet() {
        let f = fixture();
        f.providers.bind(1, "Google").await;
        f.router.save_timeline(5, 1, "[]", Utc::now()).await.unwrap();

        assert_eq!(f.relational.row_count().await, 0);
        assert_eq!(f.sheets.rows("Timeline").await.len(), 1);
        assert_eq!(f.router.get_timeline(5, 1).await.unwrap().as_deref(), Some("[]"));

        let stamp = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        f.router.save_timeline(5, 1, r#"{"events":[]}"#, stamp).await.unwrap();
        let doc = f.router.get_timeline_with_last_modified(5, 1).await.unwrap().unwrap();
        assert_eq!(doc.json, r#"{"events":[]}"#);
        assert_eq!(doc.last_modified(), Some(stamp));
        assert_eq!(f.sheets.rows("Timeline").await.len(), 1);
    }

    #[tokio::test]
    async fn test_binding_change_applies_to_next_call() {
        let f = fixture();
        f.router.save_canvas(5, 1, "relational", Utc::now()).await.unwrap();
        f.providers.bind(1, "google").await;
        assert_eq!(f.router.get_canvas(5, 1).await.unwrap(), None);

        f.router.save_canvas(5, 1, "sheet", Utc::now()).await.unwrap();
        assert_eq!(f.router.get_canvas(5, 1).await.unwrap().as_deref(), Some("sheet"));

        f.providers.unbind(1).await;
        assert_eq!(f.router.get_canvas(5, 1).await.unwrap().as_deref(), Some("relational"));
    }

    #[tokio::test]
    async fn test_other_provider_goes_relational() {
        let f = fixture();
        f.providers.bind(1, "github").await;
        f.router.save_canvas(5, 1, "{}", Utc::now()).await.unwrap();
        assert_eq!(f.relational.row_count().await, 1);
        assert!(f.sheets.rows("Canvas").await.is_empty());
    }

    #[tokio::test]
    async fn test_spreadsheet_failure_is_not_masked() {
        let f = fixture();
        f.providers.bind(1, "google").await;
        f.sheets.set_unavailable(true);

        let err = f.router.get_canvas(5, 1).await.unwrap_err();
        assert!(matches!(err, StorageError::SheetsApi { status: 503, .. }));
        assert_eq!(f.relational.row_count().await, 0);
    }

    #[tokio::test]
    async fn test_lookup_failure_propagates() {
        let factory = BackendFactory::from_stores(Arc::new(MemoryStoryDataStore::new()), None);
        let router = StorageRouter::new(Arc::new(FailingLookup), factory);
        let err = router.get_timeline(1, 1).await.unwrap_err();
        assert!(err.to_string().contains("lookup down"));
    }

    #[tokio::test]
    async fn test_google_user_without_spreadsheet_is_unsupported() {
        let providers = Arc::new(MemoryProviderLookup::new());
        providers.bind(1, "google").await;
        let factory = BackendFactory::from_stores(Arc::new(MemoryStoryDataStore::new()), None);
        let router = StorageRouter::new(providers, factory);

        let err = router.save_canvas(1, 1, "{}", Utc::now()).await.unwrap_err();
        assert!(matches!(err, StorageError::Unsupported { .. }));
    }
}
