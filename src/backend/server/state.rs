/**
 * Application State
 *
 * `AppState` is cloned into every handler. It holds the storage router, the
 * story directory used for existence and access checks, and the migration
 * routine. `FromRef` implementations let handlers extract just the piece they
 * need.
 */

use axum::extract::FromRef;
use sqlx::PgPool;
use std::sync::Arc;

use crate::backend::auth::providers::{MemoryProviderLookup, PgProviderLookup, ProviderLookup};
use crate::backend::storage::{
    BackendFactory, MemoryStoryDataStore, MigrationService, PgStoryDataStore, SpreadsheetDocumentStore,
    StorageRouter, StoryDataStore,
};
use crate::backend::stories::{MemoryStoryDirectory, PgStoryDirectory, StoryDirectory};

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Per-request dispatch to the caller's backend
    pub storage: StorageRouter,

    /// Story existence and access checks
    pub stories: Arc<dyn StoryDirectory>,

    /// Relational to spreadsheet copy
    pub migration: MigrationService,

    /// Database connection pool
    ///
    /// `None` when `DATABASE_URL` is unset; the stores are then in memory.
    pub db_pool: Option<PgPool>,
}

/// The stores behind an [`AppState`]
pub struct StorageServices {
    pub relational: Arc<dyn StoryDataStore>,
    pub providers: Arc<dyn ProviderLookup>,
    pub stories: Arc<dyn StoryDirectory>,
    pub spreadsheet: Option<Arc<SpreadsheetDocumentStore>>,
}

impl StorageServices {
    /// PostgreSQL-backed stores
    pub fn postgres(pool: PgPool, spreadsheet: Option<Arc<SpreadsheetDocumentStore>>) -> Self {
        Self {
            relational: Arc::new(PgStoryDataStore::new(pool.clone())),
            providers: Arc::new(PgProviderLookup::new(pool.clone())),
            stories: Arc::new(PgStoryDirectory::new(pool)),
            spreadsheet,
        }
    }

    /// Empty in-memory stores
    pub fn in_memory(spreadsheet: Option<Arc<SpreadsheetDocumentStore>>) -> Self {
        Self {
            relational: Arc::new(MemoryStoryDataStore::new()),
            providers: Arc::new(MemoryProviderLookup::new()),
            stories: Arc::new(MemoryStoryDirectory::new()),
            spreadsheet,
        }
    }
}

impl AppState {
    /// Wire the router and migration routine over the given stores
    pub fn new(services: StorageServices, db_pool: Option<PgPool>) -> Self {
        let factory = BackendFactory::from_stores(services.relational.clone(), services.spreadsheet);
        let storage = StorageRouter::new(services.providers, factory);
        let migration = MigrationService::new(services.relational, services.stories.clone(), storage.clone());

        Self {
            storage,
            stories: services.stories,
            migration,
            db_pool,
        }
    }
}

impl FromRef<AppState> for StorageRouter {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for Arc<dyn StoryDirectory> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.stories.clone()
    }
}

impl FromRef<AppState> for MigrationService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.migration.clone()
    }
}

impl FromRef<AppState> for Option<PgPool> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}
