//! Authentication Module
//!
//! Identity as far as document storage cares about it: who is calling, and
//! which identity provider their account is bound to.
//!
//! - **`sessions`** - JWT bearer token creation and validation
//! - **`providers`** - Per-user identity provider bindings
//!
//! Signup, login and account management live in a separate service. Requests
//! reach this crate already carrying a bearer token.

/// JWT token generation and validation
pub mod sessions;

/// Identity provider bindings
pub mod providers;

pub use providers::{MemoryProviderLookup, PgProviderLookup, ProviderLookup};
pub use sessions::{create_token, get_user_id_from_token, verify_token, Claims};
