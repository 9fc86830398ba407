//! Key derivation shared by the cache and anything that inspects it.

use uuid::Uuid;

/// Maps a person id to the key its cached record is stored under.
pub type KeyFn = fn(Uuid) -> String;

/// Namespace prefix for cached person records.
pub const PERSON_KEY_PREFIX: &str = "PERSON";

/// `PERSON:<hyphenated uuid>`
pub fn person_key(id: Uuid) -> String {
  format!("{PERSON_KEY_PREFIX}:{}", id.hyphenated())
}
