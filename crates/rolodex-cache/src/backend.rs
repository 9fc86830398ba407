//! Key-value backends.

use std::{
  future::Future,
  time::{Duration, Instant},
};

use moka::{Expiry, future::Cache};

use crate::Result;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// The subset of a string key-value store the cache relies on.
pub trait KeyValueStore: Send + Sync {
  /// `GET key`
  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>>> + Send + 'a;

  /// `SET key value EX ttl`; replaces any existing value.
  fn set_ex(
    &self,
    key: String,
    value: String,
    ttl: Duration,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// `DEL key`; succeeds whether or not the key existed.
  fn del<'a>(&'a self, key: &'a str) -> impl Future<Output = Result<()>> + Send + 'a;
}

// ─── In-process backend ──────────────────────────────────────────────────────

const DEFAULT_CAPACITY: u64 = 100_000;

#[derive(Clone)]
struct Entry {
  value: String,
  ttl:   Duration,
}

/// Expires each entry after the TTL it was written with.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
  fn expire_after_create(
    &self,
    _key: &String,
    entry: &Entry,
    _created_at: Instant,
  ) -> Option<Duration> {
    Some(entry.ttl)
  }

  fn expire_after_update(
    &self,
    _key: &String,
    entry: &Entry,
    _updated_at: Instant,
    _duration_until_expiry: Option<Duration>,
  ) -> Option<Duration> {
    Some(entry.ttl)
  }
}

/// A process-local [`KeyValueStore`] backed by a `moka` cache.
///
/// Cloning is cheap — clones share the same entries.
#[derive(Clone)]
pub struct MemoryKv {
  entries: Cache<String, Entry>,
}

impl MemoryKv {
  pub fn new() -> Self { Self::with_capacity(DEFAULT_CAPACITY) }

  pub fn with_capacity(max_entries: u64) -> Self {
    let entries = Cache::builder()
      .max_capacity(max_entries)
      .expire_after(PerEntryTtl)
      .build();
    Self { entries }
  }
}

impl Default for MemoryKv {
  fn default() -> Self { Self::new() }
}

impl KeyValueStore for MemoryKv {
  async fn get(&self, key: &str) -> Result<Option<String>> {
    Ok(self.entries.get(key).await.map(|e| e.value))
  }

  async fn set_ex(&self, key: String, value: String, ttl: Duration) -> Result<()> {
    self.entries.insert(key, Entry { value, ttl }).await;
    Ok(())
  }

  async fn del(&self, key: &str) -> Result<()> {
    self.entries.invalidate(key).await;
    Ok(())
  }
}
