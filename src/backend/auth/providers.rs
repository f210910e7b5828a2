/**
 * Identity Provider Bindings
 *
 * Each user may be bound to one external identity provider, recorded in
 * `user_providers`. Storage routing reads that label on every request.
 */

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::backend::storage::error::StorageResult;
use crate::shared::document::UserId;

/// Lookup of a user's provider label
#[async_trait]
pub trait ProviderLookup: Send + Sync {
    /// Provider label such as `"google"`, `None` when the user has no binding
    async fn get_provider(&self, user_id: UserId) -> StorageResult<Option<String>>;
}

/// Reads bindings from `user_providers`
#[derive(Clone)]
pub struct PgProviderLookup {
    pool: PgPool,
}

impl PgProviderLookup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProviderLookup for PgProviderLookup {
    async fn get_provider(&self, user_id: UserId) -> StorageResult<Option<String>> {
        let provider: Option<String> = sqlx::query_scalar(
            r#"
            SELECT provider FROM user_providers WHERE user_id = $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(provider)
    }
}

/// Bindings held in memory
#[derive(Default)]
pub struct MemoryProviderLookup {
    bindings: RwLock<HashMap<UserId, String>>,
}

impl MemoryProviderLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `user_id` to `provider`, replacing any earlier binding
    pub async fn bind(&self, user_id: UserId, provider: impl Into<String>) {
        self.bindings.write().await.insert(user_id, provider.into());
    }

    pub async fn unbind(&self, user_id: UserId) {
        self.bindings.write().await.remove(&user_id);
    }
}

#[async_trait]
impl ProviderLookup for MemoryProviderLookup {
    async fn get_provider(&self, user_id: UserId) -> StorageResult<Option<String>> {
        Ok(self.bindings.read().await.get(&user_id).cloned())
    }
}
