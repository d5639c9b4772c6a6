//! Database abstraction layer.
//!
//! Trait-based abstractions for data access so the service and protocol
//! layers never see the storage backend.
//!
//! # Architecture
//!
//! - `error`: Storage-agnostic error types
//! - `models`: Domain entities (Organization, Ticket, Task)
//! - `repository`: Trait definitions for scoped data access
//! - `sqlite`: SQLx-backed implementation

mod error;
mod models;
mod repository;
pub mod sqlite;
pub mod utils;

#[cfg(test)]
mod error_test;

pub use error::{DbError, DbResult};
pub use models::*;
pub use repository::*;
pub use sqlite::SqliteDatabase;
