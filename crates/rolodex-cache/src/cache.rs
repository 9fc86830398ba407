//! [`PersonCache`] — TTL-bounded person lookups by id.

use std::{sync::Arc, time::Duration};

use rolodex_core::{
  keys::{KeyFn, person_key},
  person::Person,
};
use uuid::Uuid;

use crate::{KeyValueStore, Result};

/// Lifetime of a cached record.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Serialises whole [`Person`] records under an id-derived key.
///
/// Cloning is cheap — the backend is reference-counted.
pub struct PersonCache<B> {
  backend: Arc<B>,
  key:     KeyFn,
  ttl:     Duration,
}

impl<B> Clone for PersonCache<B> {
  fn clone(&self) -> Self {
    Self { backend: Arc::clone(&self.backend), key: self.key, ttl: self.ttl }
  }
}

impl<B: KeyValueStore> PersonCache<B> {
  /// A cache keyed by [`person_key`] with the default TTL.
  pub fn new(backend: Arc<B>) -> Self { Self::with_key_fn(backend, person_key) }

  pub fn with_key_fn(backend: Arc<B>, key: KeyFn) -> Self {
    Self { backend, key, ttl: DEFAULT_TTL }
  }

  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.ttl = ttl;
    self
  }

  pub fn ttl(&self) -> Duration { self.ttl }

  pub fn backend(&self) -> &B { &self.backend }

  /// The key a person's record is stored under.
  pub fn key_for(&self, id: Uuid) -> String { (self.key)(id) }

  /// Look up a cached record. A miss is `Ok(None)`.
  pub async fn get(&self, id: Uuid) -> Result<Option<Person>> {
    let key = self.key_for(id);
    match self.backend.get(&key).await? {
      Some(raw) => {
        let person: Person = serde_json::from_str(&raw)?;
        tracing::debug!(%id, "retrieved person from cache");
        Ok(Some(person))
      }
      None => {
        tracing::debug!(%id, "cache miss for person");
        Ok(None)
      }
    }
  }

  /// Store `person`, replacing any previous entry and restarting its TTL.
  pub async fn set(&self, person: &Person) -> Result<()> {
    let raw = serde_json::to_string(person)?;
    self.backend.set_ex(self.key_for(person.id), raw, self.ttl).await?;
    tracing::debug!(id = %person.id, "inserted person in cache");
    Ok(())
  }

  /// Drop any cached entry for `id`.
  pub async fn del(&self, id: Uuid) -> Result<()> {
    self.backend.del(&self.key_for(id)).await?;
    tracing::debug!(%id, "removed person from cache");
    Ok(())
  }
}
