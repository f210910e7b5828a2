//! Story Directory
//!
//! Ownership, sharing and soft deletion of stories, as far as document
//! handlers and the migration routine need them. Story CRUD itself is handled
//! by another service.

pub mod db;

pub use db::{MemoryStoryDirectory, PgStoryDirectory, StoryDirectory};
