//! Core types and trait definitions for the Rolodex person directory.
//!
//! This crate is deliberately free of HTTP, cache and database dependencies.
//! All other crates depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod contact;
pub mod date;
pub mod error;
pub mod keys;
pub mod person;
pub mod store;

pub use error::{Error, Result};
