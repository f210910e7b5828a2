/**
 * Story Lookups
 *
 * A story is visible while `deleted_at` is null. A user may access a story
 * they own or one shared with them through `story_shared_users`.
 */

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::backend::storage::error::StorageResult;
use crate::shared::document::{StoryId, UserId};

#[async_trait]
pub trait StoryDirectory: Send + Sync {
    /// Story exists and is not soft-deleted
    async fn story_exists(&self, story_id: StoryId) -> StorageResult<bool>;

    /// User owns the story or it is shared with them
    async fn has_access(&self, user_id: UserId, story_id: StoryId) -> StorageResult<bool>;

    /// Non-deleted stories owned by the user, oldest first
    async fn owned_story_ids(&self, user_id: UserId) -> StorageResult<Vec<StoryId>>;
}

#[derive(Clone)]
pub struct PgStoryDirectory {
    pool: PgPool,
}

impl PgStoryDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoryDirectory for PgStoryDirectory {
    async fn story_exists(&self, story_id: StoryId) -> StorageResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(SELECT 1 FROM stories WHERE id = $1 AND deleted_at IS NULL)
            "#,
        )
        .bind(story_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn has_access(&self, user_id: UserId, story_id: StoryId) -> StorageResult<bool> {
        let allowed: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM stories WHERE id = $1 AND user_id = $2
                UNION ALL
                SELECT 1 FROM story_shared_users WHERE story_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(story_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(allowed)
    }

    async fn owned_story_ids(&self, user_id: UserId) -> StorageResult<Vec<StoryId>> {
        let ids: Vec<StoryId> = sqlx::query_scalar(
            r#"
            SELECT id FROM stories
            WHERE user_id = $1 AND deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}

#[derive(Debug, Clone)]
struct StoryRecord {
    owner: UserId,
    shared_with: HashSet<UserId>,
    deleted: bool,
}

/// Stories held in memory
#[derive(Default)]
pub struct MemoryStoryDirectory {
    stories: RwLock<HashMap<StoryId, StoryRecord>>,
}

impl MemoryStoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_story(&self, story_id: StoryId, owner: UserId) {
        self.stories.write().await.insert(
            story_id,
            StoryRecord {
                owner,
                shared_with: HashSet::new(),
                deleted: false,
            },
        );
    }

    /// Share an existing story; unknown ids are ignored
    pub async fn share(&self, story_id: StoryId, user_id: UserId) {
        if let Some(story) = self.stories.write().await.get_mut(&story_id) {
            story.shared_with.insert(user_id);
        }
    }

    pub async fn soft_delete(&self, story_id: StoryId) {
        if let Some(story) = self.stories.write().await.get_mut(&story_id) {
            story.deleted = true;
        }
    }
}

#[async_trait]
impl StoryDirectory for MemoryStoryDirectory {
    async fn story_exists(&self, story_id: StoryId) -> StorageResult<bool> {
        Ok(self
            .stories
            .read()
            .await
            .get(&story_id)
            .is_some_and(|s| !s.deleted))
    }

    async fn has_access(&self, user_id: UserId, story_id: StoryId) -> StorageResult<bool> {
        Ok(self
            .stories
            .read()
            .await
            .get(&story_id)
            .is_some_and(|s| s.owner == user_id || s.shared_with.contains(&user_id)))
    }

    async fn owned_story_ids(&self, user_id: UserId) -> StorageResult<Vec<StoryId>> {
        let mut ids: Vec<StoryId> = self
            .stories
            .read()
            .await
            .iter()
            .filter(|(_, s)| s.owner == user_id && !s.deleted)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_access_rules() {
        let dir = MemoryStoryDirectory::new();
        dir.add_story(42, 7).await;
        dir.share(42, 8).await;

        assert!(dir.has_access(7, 42).await.unwrap());
        assert!(dir.has_access(8, 42).await.unwrap());
        assert!(!dir.has_access(9, 42).await.unwrap());
        assert!(!dir.has_access(7, 43).await.unwrap());
    }

    #[tokio::test]
    async fn test_soft_deleted_story_is_hidden() {
        let dir = MemoryStoryDirectory::new();
        dir.add_story(3, 7).await;
        dir.add_story(1, 7).await;
        dir.add_story(2, 8).await;
        assert_eq!(dir.owned_story_ids(7).await.unwrap(), vec![1, 3]);

        dir.soft_delete(3).await;
        assert!(!dir.story_exists(3).await.unwrap());
        assert!(dir.story_exists(1).await.unwrap());
        assert_eq!(dir.owned_story_ids(7).await.unwrap(), vec![1]);
    }
}
