//! Document Endpoints
//!
//! HTTP consumers of the storage router.
//!
//! - **`handlers`** - Axum handlers for the three document kinds and migration
//! - **`normalize`** - Payload to stored text and back, character and
//!   timeline fix-ups
//! - **`types`** - Request/response bodies

pub mod handlers;
pub mod normalize;
pub mod types;

pub use handlers::{
    get_canvas, get_character, get_timeline, migrate_to_google, save_canvas, save_character, save_timeline,
};
pub use types::{DocumentResponse, MigrationResponse, SaveDocumentRequest, SaveDocumentResponse};
