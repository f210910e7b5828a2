/**
 * Relational to Spreadsheet Migration
 *
 * Copies every document of every non-deleted story a user owns out of the
 * relational store and writes it back through the [`StorageRouter`]. Run it
 * after the user is bound to the spreadsheet provider so the router sends the
 * writes there.
 *
 * Documents are copied one at a time with no transaction around them. A
 * failure stops the run and leaves the documents copied so far in place;
 * running again overwrites them with the same content.
 */

use std::sync::Arc;

use chrono::Utc;

use crate::backend::storage::error::StorageResult;
use crate::backend::storage::relational::StoryDataStore;
use crate::backend::storage::router::StorageRouter;
use crate::backend::stories::StoryDirectory;
use crate::shared::document::{DocumentKind, UserId};

#[derive(Clone)]
pub struct MigrationService {
    relational: Arc<dyn StoryDataStore>,
    stories: Arc<dyn StoryDirectory>,
    router: StorageRouter,
}

impl MigrationService {
    pub fn new(relational: Arc<dyn StoryDataStore>, stories: Arc<dyn StoryDirectory>, router: StorageRouter) -> Self {
        Self {
            relational,
            stories,
            router,
        }
    }

    /// Copy the user's relational documents through the router
    ///
    /// Returns the number of documents written.
    pub async fn migrate_all_to_spreadsheet(&self, user_id: UserId) -> StorageResult<usize> {
        let story_ids = self.stories.owned_story_ids(user_id).await?;
        tracing::info!(user_id, stories = story_ids.len(), "migrating documents to spreadsheet");

        let mut written = 0;
        for story_id in story_ids {
            for kind in DocumentKind::ALL {
                let Some(json) = self.relational.get_document(story_id, kind).await? else {
                    continue;
                };
                self.router
                    .save(kind, story_id, user_id, &json, Utc::now())
                    .await?;
                written += 1;
            }
        }

        tracing::info!(user_id, documents = written, "migration complete");
        Ok(written)
    }
}
