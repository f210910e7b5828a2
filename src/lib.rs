//! Storyvault
//!
//! Backend for a story-building app. Each story carries three JSON
//! documents (canvas, character sheet and timeline) stored either in
//! PostgreSQL, one shared copy per story, or in a Google spreadsheet, one
//! copy per user. The caller's identity provider decides which, on every
//! request.
//!
//! # Module Structure
//!
//! - **`shared`** - Document kinds, stamps, default documents, sheet layout
//!   configuration and shared errors
//! - **`backend`** - Axum server, storage layer and HTTP handlers
//!
//! # Usage
//!
//! ```rust,no_run
//! use storyvault::backend::server::init::create_app;
//!
//! # async fn example() {
//! let app = create_app().await;
//! // Serve with axum::serve
//! # }
//! ```

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
