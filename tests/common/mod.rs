//! Common test utilities
//!
//! - In-memory application fixture with handles on every store
//! - Request helpers for driving the router with `oneshot`
//! - PostgreSQL fixture for the ignored database tests

#![allow(dead_code)]

pub mod database;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use storyvault::backend::auth::{create_token, MemoryProviderLookup};
use storyvault::backend::routes::create_router;
use storyvault::backend::server::{AppState, StorageServices};
use storyvault::backend::storage::sheets::{MemorySheets, SpreadsheetDocumentStore};
use storyvault::backend::storage::MemoryStoryDataStore;
use storyvault::backend::stories::MemoryStoryDirectory;
use storyvault::shared::config::SheetsConfig;
use storyvault::shared::document::UserId;

/// Application wired to in-memory stores
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub stories: Arc<MemoryStoryDirectory>,
    pub providers: Arc<MemoryProviderLookup>,
    pub relational: Arc<MemoryStoryDataStore>,
    pub sheets: Arc<MemorySheets>,
}

impl TestApp {
    /// Both backends available
    pub fn new() -> Self {
        Self::build(true)
    }

    /// Spreadsheet backend not configured
    pub fn without_spreadsheet() -> Self {
        Self::build(false)
    }

    fn build(with_spreadsheet: bool) -> Self {
        let stories = Arc::new(MemoryStoryDirectory::new());
        let providers = Arc::new(MemoryProviderLookup::new());
        let relational = Arc::new(MemoryStoryDataStore::new());
        let sheets = Arc::new(MemorySheets::new());

        let spreadsheet = with_spreadsheet.then(|| {
            let config = SheetsConfig::builder()
                .spreadsheet_id("test-spreadsheet")
                .build()
                .expect("valid sheets config");
            Arc::new(SpreadsheetDocumentStore::new(sheets.clone(), config))
        });

        let services = StorageServices {
            relational: relational.clone(),
            providers: providers.clone(),
            stories: stories.clone(),
            spreadsheet,
        };
        let state = AppState::new(services, None);

        Self {
            router: create_router(state.clone()),
            state,
            stories,
            providers,
            relational,
            sheets,
        }
    }

    /// Send a request as `user`, returning status and parsed JSON body
    pub async fn send(&self, method: Method, uri: &str, user: Option<UserId>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = user {
            builder = builder.header(header::AUTHORIZATION, auth_header(&token_for(user_id)));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let response = self.router.clone().oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    pub async fn get(&self, uri: &str, user: UserId) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(user), None).await
    }

    pub async fn post(&self, uri: &str, user: UserId, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(user), Some(body)).await
    }
}

/// Bearer token for a user id
pub fn token_for(user_id: UserId) -> String {
    create_token(user_id, None).expect("Failed to generate test token")
}

/// Create authorization header value
pub fn auth_header(token: &str) -> String {
    format!("Bearer {}", token)
}
