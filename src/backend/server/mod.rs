//! Server Module
//!
//! - **`state`** - `AppState`, the stores behind it and `FromRef` impls
//! - **`config`** - Environment configuration and optional service loading
//! - **`init`** - App creation
//!
//! ```rust,no_run
//! use storyvault::backend::server::create_app;
//!
//! # async fn example() {
//! let app = create_app().await;
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::ServerConfig;
pub use init::create_app;
pub use state::{AppState, StorageServices};
