/**
 * Sheets API Client
 *
 * The spreadsheet store talks to worksheets through the row-oriented
 * [`SheetsApi`] trait. Row 1 of every worksheet is a header; data row `i`
 * (0-based) lives on sheet row `i + 2`. Columns are positional.
 *
 * [`GoogleSheetsClient`] implements the trait over the Sheets v4 REST API.
 * Every read is a full-range `values.get`; there is no server-side query.
 */

use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::backend::storage::error::{StorageError, StorageResult};
use crate::backend::storage::sheets::credentials::ServiceAccountTokenSource;

/// Sheets v4 REST endpoint
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// First sheet row holding data (row 1 is the header)
pub const FIRST_DATA_ROW: usize = 2;

/// Row-oriented access to the worksheets of one spreadsheet
#[async_trait]
pub trait SheetsApi: Send + Sync {
    /// All data rows, each truncated to `width` columns
    async fn read_rows(&self, sheet: &str, width: usize) -> StorageResult<Vec<Vec<String>>>;

    /// Overwrite data row `row` starting at column A
    async fn update_row(&self, sheet: &str, row: usize, values: Vec<String>) -> StorageResult<()>;

    /// Append rows after the last data row
    async fn append_rows(&self, sheet: &str, rows: Vec<Vec<String>>) -> StorageResult<()>;

    /// Remove data-row ranges, applied one after another in the given order
    ///
    /// Callers pass ranges from the bottom of the sheet upward so earlier
    /// removals do not shift the indices of later ones.
    async fn delete_rows(&self, sheet: &str, ranges: &[Range<usize>]) -> StorageResult<()>;
}

/// Column letter for a 1-based column number (1 -> A, 27 -> AA)
pub fn column_letter(mut column: usize) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        column = (column - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Open-ended A1 range covering every data row, e.g. `Canvas!A2:G`
pub fn data_range(sheet: &str, width: usize) -> String {
    format!("{}!A{}:{}", sheet, FIRST_DATA_ROW, column_letter(width))
}

/// A1 range covering a single data row, e.g. `Timeline!A5:D5`
pub fn row_range(sheet: &str, row: usize, width: usize) -> String {
    let sheet_row = row + FIRST_DATA_ROW;
    format!("{}!A{}:{}{}", sheet, sheet_row, column_letter(width), sheet_row)
}

/// `deleteDimension` requests for the given data-row ranges, order preserved
pub fn delete_dimension_requests(sheet_id: i64, ranges: &[Range<usize>]) -> Vec<Value> {
    ranges
        .iter()
        .filter(|r| !r.is_empty())
        .map(|r| {
            // Grid indices are 0-based and include the header row.
            json!({
                "deleteDimension": {
                    "range": {
                        "sheetId": sheet_id,
                        "dimension": "ROWS",
                        "startIndex": r.start + FIRST_DATA_ROW - 1,
                        "endIndex": r.end + FIRST_DATA_ROW - 1,
                    }
                }
            })
        })
        .collect()
}

/// Render a cell from a `values.get` response as text
fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct ValueRangeResponse {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

/// Sheets v4 REST client authenticated with a service account
pub struct GoogleSheetsClient {
    http: Client,
    base_url: String,
    spreadsheet_id: String,
    tokens: Arc<ServiceAccountTokenSource>,
    /// Numeric worksheet ids by title; titles map to ids for the life of a sheet
    sheet_ids: RwLock<HashMap<String, i64>>,
}

impl GoogleSheetsClient {
    pub fn new(http: Client, spreadsheet_id: impl Into<String>, tokens: Arc<ServiceAccountTokenSource>) -> Self {
        Self::with_base_url(http, SHEETS_API_BASE, spreadsheet_id, tokens)
    }

    /// Point the client at a different endpoint (emulators, proxies)
    pub fn with_base_url(
        http: Client,
        base_url: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        tokens: Arc<ServiceAccountTokenSource>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            spreadsheet_id: spreadsheet_id.into(),
            tokens,
            sheet_ids: RwLock::new(HashMap::new()),
        }
    }

    /// `{base}/{spreadsheet_id}` followed by the given path segments
    fn url(&self, segments: &[&str]) -> StorageResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| StorageError::sheets_api(0, format!("invalid Sheets base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| StorageError::sheets_api(0, "Sheets base URL cannot take a path"))?
            .pop_if_empty()
            .push(&self.spreadsheet_id)
            .extend(segments);
        Ok(url)
    }

    /// `{base}/{spreadsheet_id}{suffix}` for RPC-style methods such as `:batchUpdate`
    fn method_url(&self, suffix: &str) -> StorageResult<Url> {
        let mut url = self.url(&[])?;
        let path = format!("{}{}", url.path(), suffix);
        url.set_path(&path);
        Ok(url)
    }

    /// Fail on non-success responses, keeping the API's message
    async fn check(response: Response) -> StorageResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = status.as_u16(), "Sheets API error: {}", body);
        Err(StorageError::sheets_api(status.as_u16(), body))
    }

    /// Numeric id of a worksheet, needed for row deletion
    async fn sheet_id(&self, sheet: &str) -> StorageResult<i64> {
        if let Some(id) = self.sheet_ids.read().await.get(sheet) {
            return Ok(*id);
        }

        let token = self.tokens.access_token(&self.http).await?;
        let url = self.url(&[])?;
        let response = self
            .http
            .get(url)
            .query(&[("fields", "sheets.properties(sheetId,title)")])
            .bearer_auth(token)
            .send()
            .await?;
        let metadata: SpreadsheetMetadata = Self::check(response).await?.json().await?;

        let mut ids = self.sheet_ids.write().await;
        for entry in metadata.sheets {
            ids.insert(entry.properties.title, entry.properties.sheet_id);
        }
        ids.get(sheet).copied().ok_or_else(|| StorageError::SheetNotFound {
            sheet: sheet.to_string(),
        })
    }
}

#[async_trait]
impl SheetsApi for GoogleSheetsClient {
    async fn read_rows(&self, sheet: &str, width: usize) -> StorageResult<Vec<Vec<String>>> {
        let range = data_range(sheet, width);
        let token = self.tokens.access_token(&self.http).await?;
        let url = self.url(&["values", &range])?;

        let response = self.http.get(url).bearer_auth(token).send().await?;
        let body: ValueRangeResponse = Self::check(response).await?.json().await?;

        Ok(body
            .values
            .iter()
            .map(|row| row.iter().take(width).map(cell_text).collect())
            .collect())
    }

    async fn update_row(&self, sheet: &str, row: usize, values: Vec<String>) -> StorageResult<()> {
        let range = row_range(sheet, row, values.len());
        let token = self.tokens.access_token(&self.http).await?;
        let url = self.url(&["values", &range])?;

        let response = self
            .http
            .put(url)
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(token)
            .json(&json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": [values],
            }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn append_rows(&self, sheet: &str, rows: Vec<Vec<String>>) -> StorageResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let width = rows.iter().map(Vec::len).max().unwrap_or(1);
        let range = data_range(sheet, width);
        let token = self.tokens.access_token(&self.http).await?;
        let url = self.url(&["values", &format!("{}:append", range)])?;

        let response = self
            .http
            .post(url)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .bearer_auth(token)
            .json(&json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": rows,
            }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_rows(&self, sheet: &str, ranges: &[Range<usize>]) -> StorageResult<()> {
        if ranges.iter().all(|r| r.is_empty()) {
            return Ok(());
        }
        let sheet_id = self.sheet_id(sheet).await?;
        let requests = delete_dimension_requests(sheet_id, ranges);
        let token = self.tokens.access_token(&self.http).await?;
        let url = self.method_url(":batchUpdate")?;

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&json!({ "requests": requests }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
