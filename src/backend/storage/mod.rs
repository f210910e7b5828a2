//! Document Storage
//!
//! Story documents live in one of two places:
//!
//! - **relational**: one shared copy per story in the `story_data` table
//! - **spreadsheet**: one copy per (story, user) in worksheet rows, with
//!   canvas documents split into chunks
//!
//! The [`StorageRouter`] picks between them on every call from the caller's
//! identity provider binding. [`MigrationService`] copies a user's relational
//! documents across once they switch to the spreadsheet provider.

pub mod backend;
pub mod error;
pub mod migration;
pub mod relational;
pub mod router;
pub mod sheets;

pub use backend::{BackendFactory, DocumentBackend, RelationalBackend, SpreadsheetBackend, StorageBackendKind};
pub use error::{StorageError, StorageResult};
pub use migration::MigrationService;
pub use relational::{MemoryStoryDataStore, PgStoryDataStore, StoryDataStore};
pub use router::StorageRouter;
pub use sheets::SpreadsheetDocumentStore;
