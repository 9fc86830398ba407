//! Server configuration and wiring for the `server` binary.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use axum::Router;
use rolodex_cache::{MemoryKv, PersonCache};
use rolodex_store_sqlite::SqliteRepository;
use serde::Deserialize;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Top-level server configuration, loaded from `config.toml` and `ROLODEX_*`
/// environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:           String,
  #[serde(default = "default_port")]
  pub port:           u16,
  #[serde(default = "default_store_path")]
  pub store_path:     PathBuf,
  /// Lifetime of cached person records, in seconds.
  #[serde(default = "default_cache_ttl_secs")]
  pub cache_ttl_secs: u64,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 3000 }

fn default_store_path() -> PathBuf { PathBuf::from("rolodex.db") }

fn default_cache_ttl_secs() -> u64 { 60 }

impl ServerConfig {
  /// Layer the optional TOML file at `path` under the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("ROLODEX"))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Wiring ───────────────────────────────────────────────────────────────────

/// Open the store described by `cfg`, fronted by an in-process cache.
pub async fn open_store(cfg: &ServerConfig) -> anyhow::Result<SqliteRepository<MemoryKv>> {
  let store_path = expand_tilde(&cfg.store_path);

  let cache = PersonCache::new(Arc::new(MemoryKv::new()))
    .with_ttl(Duration::from_secs(cfg.cache_ttl_secs));
  let store = SqliteRepository::open(&store_path, cache)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  tracing::info!(
    path = ?store_path,
    ttl_secs = store.cache().ttl().as_secs(),
    "opened store"
  );

  Ok(store)
}

/// Open the store described by `cfg` and build the application router.
pub async fn build_app(cfg: &ServerConfig) -> anyhow::Result<Router> {
  let store = open_store(cfg).await?;
  Ok(rolodex_api::api_router(Arc::new(store)))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
