//! Calendar-date and timestamp normalisation.
//!
//! Birthdates cross the API boundary either as a bare ISO 8601 date
//! (`1990-04-01`) or as a full RFC 3339 timestamp; both normalise to a
//! [`NaiveDate`]. Timestamps with any offset normalise to UTC.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, de};

use crate::{Error, Result};

/// The on-the-wire and on-disk calendar-date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(s: &str) -> Result<NaiveDate> {
  let s = s.trim();
  if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
    return Ok(date);
  }
  parse_timestamp(s)
    .map(|dt| dt.date_naive())
    .map_err(|_| Error::InvalidDate(s.to_owned()))
}

pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s.trim())
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|_| Error::InvalidDate(s.to_owned()))
}

/// Serde `deserialize_with` helper for optional calendar dates.
pub fn deserialize_optional_date<'de, D>(
  deserializer: D,
) -> std::result::Result<Option<NaiveDate>, D::Error>
where
  D: Deserializer<'de>,
{
  Option::<String>::deserialize(deserializer)?
    .as_deref()
    .map(parse_date)
    .transpose()
    .map_err(de::Error::custom)
}

/// [`deserialize_optional_date`] for patch bodies: absent is `None` (with
/// `#[serde(default)]`), `null` is `Some(None)`.
pub fn deserialize_nullable_date<'de, D>(
  deserializer: D,
) -> std::result::Result<Option<Option<NaiveDate>>, D::Error>
where
  D: Deserializer<'de>,
{
  deserialize_optional_date(deserializer).map(Some)
}
