/**
 * Chunked Documents
 *
 * A sheet cell holds at most 50,000 characters, so large documents are split
 * into [`CHUNK_SIZE`] character pieces, one row each:
 *
 * ```text
 * A: storyId | B: userId | C: chunkIndex | D: chunkText | E: lastModified
 * F: generation | G: chunkCount
 * ```
 *
 * All rows written by one save share a `generation` and a `lastModified`.
 * A save appends its rows first and only then deletes the rows of older
 * generations, bottom-up. Readers pick the newest generation whose chunks are
 * all present, so a read that overlaps a save sees either the previous
 * document or the new one.
 *
 * Rows written before generations existed carry only columns A-E. They are
 * read as a single legacy generation.
 */

use std::collections::HashMap;
use std::ops::Range;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::backend::storage::error::StorageResult;
use crate::backend::storage::sheets::store::{row_matches, SpreadsheetDocumentStore};
use crate::shared::document::{format_last_modified, DocumentKind, JsonWithModified, StoryId, UserId};

/// Characters per chunk
pub const CHUNK_SIZE: usize = 40_000;

/// Columns of a chunk row
pub const CHUNK_ROW_WIDTH: usize = 7;

const COL_GENERATION: usize = 5;

/// Split text into chunks of at most `size` characters
///
/// Empty input yields a single empty chunk so the document still exists.
pub fn split_chunks(text: &str, size: usize) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Merge row indices into contiguous ranges, bottom-most range first
pub fn deletion_ranges(mut indices: Vec<usize>) -> Vec<Range<usize>> {
    indices.sort_unstable();
    indices.dedup();

    let mut ranges: Vec<Range<usize>> = Vec::new();
    for index in indices {
        match ranges.last_mut() {
            Some(last) if last.end == index => last.end += 1,
            _ => ranges.push(index..index + 1),
        }
    }
    ranges.reverse();
    ranges
}

/// One parsed chunk row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRow {
    /// Data-row index in the sheet
    pub position: usize,
    pub index: usize,
    pub text: String,
    pub last_modified: String,
    /// Empty for legacy rows
    pub generation: String,
    pub count: Option<usize>,
}

impl ChunkRow {
    fn parse(position: usize, mut row: Vec<String>) -> Option<Self> {
        row.resize(CHUNK_ROW_WIDTH, String::new());
        let index = match row[2].trim().parse::<usize>() {
            Ok(index) => index,
            Err(_) => {
                tracing::warn!(position, cell = %row[2], "skipping chunk row with bad index");
                return None;
            }
        };
        Some(Self {
            position,
            index,
            count: row[6].trim().parse().ok(),
            generation: std::mem::take(&mut row[COL_GENERATION]),
            last_modified: std::mem::take(&mut row[4]),
            text: std::mem::take(&mut row[3]),
        })
    }
}

/// Chunks of one save, sorted by index
#[derive(Debug)]
struct Generation {
    chunks: Vec<ChunkRow>,
    last_position: usize,
}

impl Generation {
    /// Every index from 0 to the expected count is present exactly once
    fn is_complete(&self) -> bool {
        let expected = self
            .chunks
            .iter()
            .find_map(|c| c.count)
            .unwrap_or(self.chunks.len());
        self.chunks.len() == expected
            && self.chunks.iter().enumerate().all(|(i, c)| c.index == i)
    }

    fn assemble(self) -> JsonWithModified {
        let last_modified = self
            .chunks
            .last()
            .map(|c| c.last_modified.clone())
            .unwrap_or_default();
        let json: String = self.chunks.into_iter().map(|c| c.text).collect();
        JsonWithModified::new(json, last_modified)
    }
}

/// Newest complete generation among the rows of one (story, user)
///
/// Newer generations are appended below older ones, so the generation whose
/// last row sits lowest in the sheet is the newest.
pub fn reassemble(rows: Vec<ChunkRow>) -> Option<JsonWithModified> {
    let mut generations: HashMap<String, Generation> = HashMap::new();
    for row in rows {
        let generation = generations
            .entry(row.generation.clone())
            .or_insert_with(|| Generation {
                chunks: Vec::new(),
                last_position: 0,
            });
        generation.last_position = generation.last_position.max(row.position);
        generation.chunks.push(row);
    }

    let mut candidates: Vec<Generation> = generations
        .into_values()
        .map(|mut g| {
            g.chunks.sort_by_key(|c| c.index);
            g
        })
        .collect();
    candidates.sort_by_key(|g| std::cmp::Reverse(g.last_position));

    let total = candidates.len();
    match candidates.into_iter().find(Generation::is_complete) {
        Some(generation) => Some(generation.assemble()),
        None => {
            if total > 0 {
                tracing::warn!(generations = total, "no complete chunk generation found");
            }
            None
        }
    }
}

impl SpreadsheetDocumentStore {
    /// Matching chunk rows of the canvas sheet
    async fn chunk_rows(&self, story_id: StoryId, user_id: UserId) -> StorageResult<Vec<ChunkRow>> {
        let sheet = self.config.sheet_for(DocumentKind::Canvas);
        let (story, user) = (story_id.to_string(), user_id.to_string());
        let rows = self.api.read_rows(sheet, CHUNK_ROW_WIDTH).await?;
        Ok(rows
            .into_iter()
            .enumerate()
            .filter(|(_, row)| row_matches(row, &story, &user))
            .filter_map(|(position, row)| ChunkRow::parse(position, row))
            .collect())
    }

    /// Write `json` as a new chunk generation, then drop the older ones
    ///
    /// Stale positions come from a read taken after the append.
    pub async fn save_chunked(
        &self,
        story_id: StoryId,
        user_id: UserId,
        json: &str,
        last_modified: DateTime<Utc>,
    ) -> StorageResult<()> {
        let sheet = self.config.sheet_for(DocumentKind::Canvas);
        let (story, user) = (story_id.to_string(), user_id.to_string());

        let chunks = split_chunks(json, CHUNK_SIZE);
        let count = chunks.len().to_string();
        let generation = Uuid::new_v4().simple().to_string();
        let stamp = format_last_modified(last_modified);

        let new_rows: Vec<Vec<String>> = chunks
            .into_iter()
            .enumerate()
            .map(|(index, text)| {
                vec![
                    story.clone(),
                    user.clone(),
                    index.to_string(),
                    text,
                    stamp.clone(),
                    generation.clone(),
                    count.clone(),
                ]
            })
            .collect();
        let chunk_count = new_rows.len();

        let _guard = self.chunk_writes.lock().await;
        self.api.append_rows(sheet, new_rows).await?;

        let stale: Vec<usize> = self
            .api
            .read_rows(sheet, CHUNK_ROW_WIDTH)
            .await?
            .iter()
            .enumerate()
            .filter(|(_, row)| row_matches(row, &story, &user))
            .filter(|(_, row)| row.get(COL_GENERATION) != Some(&generation))
            .map(|(position, _)| position)
            .collect();

        tracing::debug!(
            story_id,
            user_id,
            chunks = chunk_count,
            stale = stale.len(),
            "saved chunked canvas"
        );

        self.api.delete_rows(sheet, &deletion_ranges(stale)).await
    }

    /// Reassemble the newest complete chunk generation
    pub async fn read_chunked(
        &self,
        story_id: StoryId,
        user_id: UserId,
    ) -> StorageResult<Option<JsonWithModified>> {
        let rows = self.chunk_rows(story_id, user_id).await?;
        Ok(reassemble(rows))
    }
}
