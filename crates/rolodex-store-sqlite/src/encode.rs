//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings, birthdates as
//! `YYYY-MM-DD`, UUIDs as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rolodex_core::{
  date::{DATE_FORMAT, parse_date},
  person::{Gender, Person},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate
// ────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> { Ok(parse_date(s)?) }

// ─── Gender
// ───────────────────────────────────────────────────────────────────

pub fn encode_gender(g: Gender) -> &'static str {
  match g {
    Gender::Male => "male",
    Gender::Female => "female",
  }
}

pub fn decode_gender(s: &str) -> Result<Gender> {
  match s {
    "male" => Ok(Gender::Male),
    "female" => Ok(Gender::Female),
    other => Err(Error::Decode(format!("unknown gender: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `persons` row.
///
/// Every statement that materialises a person selects, in order:
/// `id, name, surname, email, phone, gender, birthdate, modified, created`.
pub struct RawPerson {
  pub id:        String,
  pub name:      String,
  pub surname:   String,
  pub email:     String,
  pub phone:     Option<String>,
  pub gender:    Option<String>,
  pub birthdate: Option<String>,
  pub modified:  String,
  pub created:   String,
}

impl RawPerson {
  /// Read the person columns starting at column `start`.
  pub fn from_row(row: &rusqlite::Row<'_>, start: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      id:        row.get(start)?,
      name:      row.get(start + 1)?,
      surname:   row.get(start + 2)?,
      email:     row.get(start + 3)?,
      phone:     row.get(start + 4)?,
      gender:    row.get(start + 5)?,
      birthdate: row.get(start + 6)?,
      modified:  row.get(start + 7)?,
      created:   row.get(start + 8)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      id:        decode_uuid(&self.id)?,
      name:      self.name,
      surname:   self.surname,
      email:     self.email,
      phone:     self.phone,
      gender:    self.gender.as_deref().map(decode_gender).transpose()?,
      birthdate: self.birthdate.as_deref().map(decode_date).transpose()?,
      modified:  decode_dt(&self.modified)?,
      created:   decode_dt(&self.created)?,
    })
  }
}

/// A person flattened into bindable column values.
pub struct PersonParams {
  pub id:        String,
  pub name:      String,
  pub surname:   String,
  pub email:     String,
  pub phone:     Option<String>,
  pub gender:    Option<&'static str>,
  pub birthdate: Option<String>,
  pub modified:  String,
  pub created:   String,
}

impl From<&Person> for PersonParams {
  fn from(p: &Person) -> Self {
    Self {
      id:        encode_uuid(p.id),
      name:      p.name.clone(),
      surname:   p.surname.clone(),
      email:     p.email.clone(),
      phone:     p.phone.clone(),
      gender:    p.gender.map(encode_gender),
      birthdate: p.birthdate.map(encode_date),
      modified:  encode_dt(p.modified),
      created:   encode_dt(p.created),
    }
  }
}
