//! Spreadsheet Storage
//!
//! Per-user document copies kept in a Google spreadsheet, one worksheet per
//! document kind.
//!
//! - `client`: the [`SheetsApi`] seam and its REST implementation
//! - `credentials`: service-account tokens for the REST client
//! - `memory`: in-process worksheets for tests and local runs
//! - `store`: single-row documents
//! - `chunked`: canvas documents split across rows

pub mod chunked;
pub mod client;
pub mod credentials;
pub mod memory;
pub mod store;

pub use chunked::{split_chunks, CHUNK_ROW_WIDTH, CHUNK_SIZE};
pub use client::{GoogleSheetsClient, SheetsApi};
pub use credentials::{ServiceAccountKey, ServiceAccountTokenSource};
pub use memory::MemorySheets;
pub use store::SpreadsheetDocumentStore;
