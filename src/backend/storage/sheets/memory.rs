/**
 * In-Memory Worksheets
 *
 * A [`SheetsApi`] that keeps rows in process memory. It follows the same
 * positional semantics as the real API: rows are addressed by index, append
 * adds at the bottom and deletion shifts later rows up.
 */

use std::collections::HashMap;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::backend::storage::error::{StorageError, StorageResult};
use crate::backend::storage::sheets::client::SheetsApi;

/// Worksheets held in memory
#[derive(Default)]
pub struct MemorySheets {
    sheets: RwLock<HashMap<String, Vec<Vec<String>>>>,
    unavailable: AtomicBool,
}

impl MemorySheets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current data rows of a worksheet
    pub async fn rows(&self, sheet: &str) -> Vec<Vec<String>> {
        self.sheets.read().await.get(sheet).cloned().unwrap_or_default()
    }

    /// Make every call fail with 503, as when the API is unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> StorageResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::sheets_api(503, "The service is currently unavailable."));
        }
        Ok(())
    }
}

#[async_trait]
impl SheetsApi for MemorySheets {
    async fn read_rows(&self, sheet: &str, width: usize) -> StorageResult<Vec<Vec<String>>> {
        self.ensure_available()?;
        Ok(self
            .rows(sheet)
            .await
            .into_iter()
            .map(|row| row.into_iter().take(width).collect())
            .collect())
    }

    async fn update_row(&self, sheet: &str, row: usize, values: Vec<String>) -> StorageResult<()> {
        self.ensure_available()?;
        let mut sheets = self.sheets.write().await;
        let rows = sheets.entry(sheet.to_string()).or_default();
        if rows.len() <= row {
            rows.resize(row + 1, Vec::new());
        }
        let target = &mut rows[row];
        if target.len() < values.len() {
            target.resize(values.len(), String::new());
        }
        for (cell, value) in target.iter_mut().zip(values) {
            *cell = value;
        }
        Ok(())
    }

    async fn append_rows(&self, sheet: &str, new_rows: Vec<Vec<String>>) -> StorageResult<()> {
        self.ensure_available()?;
        self.sheets
            .write()
            .await
            .entry(sheet.to_string())
            .or_default()
            .extend(new_rows);
        Ok(())
    }

    async fn delete_rows(&self, sheet: &str, ranges: &[Range<usize>]) -> StorageResult<()> {
        self.ensure_available()?;
        let mut sheets = self.sheets.write().await;
        let rows = sheets.entry(sheet.to_string()).or_default();
        for range in ranges {
            if range.end > rows.len() || range.start > range.end {
                return Err(StorageError::sheets_api(
                    400,
                    format!("Invalid requests[0].deleteDimension: range {:?} out of bounds", range),
                ));
            }
            rows.drain(range.clone());
        }
        Ok(())
    }
}
