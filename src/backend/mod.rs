//! Backend Module
//!
//! Axum HTTP server for story documents.
//!
//! # Architecture
//!
//! - **`server`** - Configuration, application state, app creation
//! - **`routes`** - Route configuration and router assembly
//! - **`documents`** - Canvas, character and timeline endpoints
//! - **`storage`** - Relational and spreadsheet stores, the storage router
//!   and the migration routine
//! - **`stories`** - Story existence and access checks
//! - **`auth`** - Bearer tokens and identity provider bindings
//! - **`middleware`** - Request authentication
//! - **`error`** - Backend error types
//!
//! # Request Flow
//!
//! A document request passes the auth middleware, then the handler checks
//! the story exists and the caller may access it. The storage router looks up
//! the caller's identity provider and hands the call to the relational or the
//! spreadsheet backend. Errors propagate unchanged to the HTTP boundary where
//! `BackendError` maps them to a status code.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Document endpoints
pub mod documents;

/// Document persistence
pub mod storage;

/// Story directory
pub mod stories;

/// Backend error types
pub mod error;

/// Authentication and provider bindings
pub mod auth;

/// Middleware for request processing
pub mod middleware;

pub use error::BackendError;
pub use server::create_app;
pub use storage::StorageRouter;
