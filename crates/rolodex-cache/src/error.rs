//! Error type for `rolodex-cache`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The key-value backend could not be reached or rejected the command.
  #[error("cache backend error: {0}")]
  Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
