//! The `PersonRepository` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `rolodex-store-sqlite`).
//! Higher layers (`rolodex-api`) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  contact::ContactEdge,
  person::{Person, PersonPatch},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Offset pagination over the email-ordered person listing.
///
/// Pages are not cursor-stable: rows inserted or deleted between two page
/// reads can shift later pages, so a row may be skipped or seen twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
  pub limit:  u32,
  pub offset: u32,
}

impl Pagination {
  pub const DEFAULT_LIMIT: u32 = 10;

  pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
    Self {
      limit:  limit.unwrap_or(Self::DEFAULT_LIMIT),
      offset: offset.unwrap_or(0),
    }
  }
}

impl Default for Pagination {
  fn default() -> Self { Self::new(None, None) }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Rolodex repository backend.
///
/// Absent records are reported as `Ok(None)`, never as errors. Every method
/// may suspend on storage or cache I/O.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PersonRepository: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Persons ───────────────────────────────────────────────────────────

  /// Persist a fully-formed person and return the row as stored.
  fn insert_person(
    &self,
    person: Person,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Point lookup by id. Returns `None` if not found.
  fn find_person_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Up to `page.limit` persons ordered by email, skipping `page.offset`.
  fn find_persons_paginated(
    &self,
    page: Pagination,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// Number of stored persons. Not coupled to any concurrent page read.
  fn get_total_person_count(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Delete a person and return its final values, or `None` if unknown.
  fn remove_person_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Merge `patch` over the current record and persist it. Returns `None` if
  /// the id is unknown.
  fn update_person(
    &self,
    patch: PersonPatch,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  // ── Contacts ──────────────────────────────────────────────────────────

  /// For each id in `person_ids`, the persons it has an outgoing edge to.
  ///
  /// The result has the same length and order as the input; ids without
  /// contacts map to an empty list.
  fn find_contacts<'a>(
    &'a self,
    person_ids: &'a [Uuid],
  ) -> impl Future<Output = Result<Vec<Vec<Person>>, Self::Error>> + Send + 'a;

  /// Add a directed edge. Returns `false` when either endpoint does not
  /// exist or the edge is already present.
  fn insert_contact(
    &self,
    edge: ContactEdge,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Remove a directed edge. Returns whether a row was removed.
  fn remove_contact(
    &self,
    edge: ContactEdge,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
