/**
 * Storage Errors
 *
 * Failures raised by either document backend. Nothing in the storage layer
 * retries; every error here travels unchanged to the HTTP boundary.
 */

use thiserror::Error;

/// Result alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors from the relational store, the spreadsheet store or the router
#[derive(Debug, Error)]
pub enum StorageError {
    /// SQL query failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Transport-level failure talking to the Sheets API
    #[error("Sheets request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Sheets API answered with a non-success status
    #[error("Sheets API returned {status}: {message}")]
    SheetsApi {
        /// HTTP status code
        status: u16,
        /// Response body or summary
        message: String,
    },

    /// Service-account key could not be loaded or exchanged for a token
    #[error("Service account error: {message}")]
    Credentials {
        /// Human-readable error message
        message: String,
    },

    /// Worksheet name not present in the spreadsheet
    #[error("Worksheet '{sheet}' not found")]
    SheetNotFound {
        /// Worksheet name
        sheet: String,
    },

    /// The resolved backend cannot serve this operation
    #[error("{operation} is not supported: {reason}")]
    Unsupported {
        /// Operation that was attempted
        operation: String,
        /// Why it was rejected
        reason: String,
    },
}

impl StorageError {
    /// Create a new Sheets API status error
    pub fn sheets_api(status: u16, message: impl Into<String>) -> Self {
        Self::SheetsApi {
            status,
            message: message.into(),
        }
    }

    /// Create a new credentials error
    pub fn credentials(message: impl Into<String>) -> Self {
        Self::Credentials {
            message: message.into(),
        }
    }

    /// Create a new unsupported-operation error
    pub fn unsupported(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}
