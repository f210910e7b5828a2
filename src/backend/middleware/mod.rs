//! Middleware Module
//!
//! - **`auth`** - Bearer token authentication for document routes

pub mod auth;

pub use auth::{auth_middleware, AuthUser, AuthenticatedUser};
