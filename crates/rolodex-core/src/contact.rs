//! Directed contact edges between persons.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A directed `person -> contact` relation.
///
/// Edges are not symmetric: `(a, b)` says nothing about `(b, a)`. Self-edges
/// are permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactEdge {
  pub person_id:  Uuid,
  pub contact_id: Uuid,
}

impl ContactEdge {
  pub fn new(person_id: Uuid, contact_id: Uuid) -> Self {
    Self { person_id, contact_id }
  }

  /// The same pair in the opposite direction.
  pub fn reversed(self) -> Self {
    Self { person_id: self.contact_id, contact_id: self.person_id }
  }
}
