//! Shared Error Types
//!
//! Errors raised while interpreting document payloads, independent of which
//! store produced them.
//!
//! # Error Categories
//!
//! - `SerializationError` - JSON serialization/deserialization failures
//! - `ValidationError` - Request data that fails a shape check
//! - `MalformedDocument` - A stored document that no longer parses
//!
//! # Usage
//!
//! ```rust
//! use storyvault::shared::error::SharedError;
//!
//! let error = SharedError::validation("json", "payload must be an object or a string");
//! ```
use thiserror::Error;

/// Errors that can occur while handling document payloads
#[derive(Debug, Error, Clone)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// Stored document could not be parsed
    ///
    /// Payloads are not validated at write time, so this surfaces only when a
    /// reader inspects the document.
    #[error("Stored {kind} document is malformed: {message}")]
    MalformedDocument {
        /// Document kind (canvas, character, timeline)
        kind: String,
        /// Parser diagnostic including line and column
        message: String,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new malformed-document error
    pub fn malformed(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedDocument {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Helper trait for converting serialization errors
impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
