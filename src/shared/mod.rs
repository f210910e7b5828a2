//! Shared Module
//!
//! This module contains types that describe story documents independently of
//! where they are stored. Both storage backends and the HTTP handlers speak in
//! these types.
//!
//! # Overview
//!
//! - **`document`** - Document kinds, identifiers, default shapes and the
//!   last-modified envelope returned by the storage layer
//! - **`error`** - Validation and serialization errors
//! - **`config`** - Spreadsheet layout configuration

/// Story document types
pub mod document;

/// Shared error types
pub mod error;

/// Spreadsheet layout configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use document::{DocumentKind, JsonWithModified, StoryId, UserId};
pub use error::SharedError;
pub use config::{SheetsConfig, SheetsConfigBuilder, ConfigError};
