//! SQLite backend for the Rolodex person directory.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime, and fronts single-record reads with a
//! [`rolodex_cache::PersonCache`].

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteRepository;
