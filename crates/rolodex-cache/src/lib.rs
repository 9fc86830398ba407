//! Short-lived read cache for person point lookups.
//!
//! [`PersonCache`] speaks a minimal `GET` / `SET .. EX` / `DEL` protocol
//! through the [`KeyValueStore`] trait. It is never a source of truth: entries
//! expire after a fixed TTL and writers invalidate rather than update them.

mod backend;
mod cache;

pub mod error;

pub use backend::{KeyValueStore, MemoryKv};
pub use cache::{DEFAULT_TTL, PersonCache};
pub use error::{Error, Result};
