//! Route Configuration Module
//!
//! - **`router`** - Main router creation, middleware and tracing layers
//! - **`api_routes`** - Document and user endpoints

/// Main router creation
pub mod router;

/// API endpoint routes
pub mod api_routes;

pub use router::create_router;
