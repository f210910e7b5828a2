/**
 * Spreadsheet Document Store
 *
 * Per-user document copies kept in worksheets. Character and timeline
 * documents use one row each:
 *
 * ```text
 * A: storyId | B: userId | C: json | D: lastModified
 * ```
 *
 * Canvas documents are split into chunks; see the `chunked` module.
 *
 * Every operation re-reads the full worksheet and matches rows by
 * (storyId, userId). Single-document sheets never delete rows, so a position
 * read before an update stays valid. The canvas sheet does delete rows;
 * chunked saves through one store are serialized, but writers in other
 * processes are not.
 */

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::backend::storage::error::StorageResult;
use crate::backend::storage::sheets::client::SheetsApi;
use crate::shared::config::SheetsConfig;
use crate::shared::document::{format_last_modified, DocumentKind, JsonWithModified, StoryId, UserId};

/// Columns of a single-document row
pub const DOCUMENT_ROW_WIDTH: usize = 4;

const COL_STORY: usize = 0;
const COL_USER: usize = 1;
const COL_JSON: usize = 2;
const COL_LAST_MODIFIED: usize = 3;

/// True when a row belongs to (story_id, user_id)
pub(crate) fn row_matches(row: &[String], story_id: &str, user_id: &str) -> bool {
    row.len() > COL_USER && row[COL_STORY] == story_id && row[COL_USER] == user_id
}

/// Document store backed by a spreadsheet
pub struct SpreadsheetDocumentStore {
    pub(crate) api: Arc<dyn SheetsApi>,
    pub(crate) config: SheetsConfig,
    /// Held across the append, re-read and delete of a chunked save
    pub(crate) chunk_writes: Mutex<()>,
}

impl SpreadsheetDocumentStore {
    pub fn new(api: Arc<dyn SheetsApi>, config: SheetsConfig) -> Self {
        Self {
            api,
            config,
            chunk_writes: Mutex::new(()),
        }
    }

    /// Index and contents of the first row for (story, user)
    async fn find_row(
        &self,
        sheet: &str,
        story_id: StoryId,
        user_id: UserId,
    ) -> StorageResult<Option<(usize, Vec<String>)>> {
        let (story, user) = (story_id.to_string(), user_id.to_string());
        let rows = self.api.read_rows(sheet, DOCUMENT_ROW_WIDTH).await?;
        Ok(rows
            .into_iter()
            .enumerate()
            .find(|(_, row)| row_matches(row, &story, &user)))
    }

    /// JSON cell of the matching row
    pub async fn get_document(
        &self,
        story_id: StoryId,
        user_id: UserId,
        kind: DocumentKind,
    ) -> StorageResult<Option<String>> {
        let sheet = self.config.sheet_for(kind);
        Ok(self
            .find_row(sheet, story_id, user_id)
            .await?
            .and_then(|(_, row)| row.get(COL_JSON).cloned()))
    }

    /// JSON and timestamp cells of the matching row
    pub async fn get_document_with_last_modified(
        &self,
        story_id: StoryId,
        user_id: UserId,
        kind: DocumentKind,
    ) -> StorageResult<Option<JsonWithModified>> {
        let sheet = self.config.sheet_for(kind);
        Ok(self
            .find_row(sheet, story_id, user_id)
            .await?
            .and_then(|(_, mut row)| {
                if row.len() <= COL_JSON {
                    return None;
                }
                row.resize(DOCUMENT_ROW_WIDTH, String::new());
                let last_modified = std::mem::take(&mut row[COL_LAST_MODIFIED]);
                let json = std::mem::take(&mut row[COL_JSON]);
                Some(JsonWithModified::new(json, last_modified))
            }))
    }

    /// Update the matching row in place or append a new one
    pub async fn save_document(
        &self,
        story_id: StoryId,
        user_id: UserId,
        kind: DocumentKind,
        json: &str,
        last_modified: DateTime<Utc>,
    ) -> StorageResult<()> {
        let sheet = self.config.sheet_for(kind);
        let values = vec![
            story_id.to_string(),
            user_id.to_string(),
            json.to_string(),
            format_last_modified(last_modified),
        ];

        match self.find_row(sheet, story_id, user_id).await? {
            Some((index, _)) => {
                tracing::debug!(story_id, user_id, kind = %kind, row = index, "updating sheet row");
                self.api.update_row(sheet, index, values).await
            }
            None => {
                tracing::debug!(story_id, user_id, kind = %kind, "appending sheet row");
                self.api.append_rows(sheet, vec![values]).await
            }
        }
    }
}
