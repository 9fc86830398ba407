//! The person record and the inputs that create and modify it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::date::deserialize_optional_date;

/// Serde `deserialize_with` helper that keeps an explicit `null` apart from an
/// absent field. Pair it with `#[serde(default)]`: absent is `None`, `null` is
/// `Some(None)`.
pub fn deserialize_nullable<'de, T, D>(
  deserializer: D,
) -> std::result::Result<Option<Option<T>>, D::Error>
where
  T: Deserialize<'de>,
  D: Deserializer<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}

// ─── Gender ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
  Male,
  Female,
}

// ─── Person ──────────────────────────────────────────────────────────────────

/// A stored person.
///
/// `id` and `created` never change after insertion; `modified` is bumped on
/// every successful update, so `created <= modified` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub id:        Uuid,
  pub name:      String,
  pub surname:   String,
  /// Listing sort key. Not required to be unique.
  pub email:     String,
  pub gender:    Option<Gender>,
  pub phone:     Option<String>,
  #[serde(default, deserialize_with = "deserialize_optional_date")]
  pub birthdate: Option<NaiveDate>,
  pub created:   DateTime<Utc>,
  pub modified:  DateTime<Utc>,
}

impl Person {
  /// Whole years between `birthdate` and `today`.
  pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
    self.birthdate.and_then(|b| today.years_since(b))
  }

  pub fn age(&self) -> Option<u32> { self.age_on(Utc::now().date_naive()) }
}

// ─── Creation ────────────────────────────────────────────────────────────────

/// Caller-supplied fields for a new person. Identity and timestamps are
/// assigned by [`NewPerson::into_person`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewPerson {
  pub name:      String,
  pub surname:   String,
  pub email:     String,
  #[serde(default)]
  pub gender:    Option<Gender>,
  #[serde(default)]
  pub phone:     Option<String>,
  #[serde(default, deserialize_with = "deserialize_optional_date")]
  pub birthdate: Option<NaiveDate>,
}

impl NewPerson {
  pub fn into_person(self) -> Person { self.into_person_at(Utc::now()) }

  /// Build a record with a fresh v4 id and `created == modified == now`.
  pub fn into_person_at(self, now: DateTime<Utc>) -> Person {
    Person {
      id:        Uuid::new_v4(),
      name:      self.name,
      surname:   self.surname,
      email:     self.email,
      gender:    self.gender,
      phone:     self.phone,
      birthdate: self.birthdate,
      created:   now,
      modified:  now,
    }
  }
}

// ─── Partial update ──────────────────────────────────────────────────────────

/// A partial update. `None` means "keep the current value". The optional
/// fields nest a second `Option`: `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonPatch {
  pub id:        Uuid,
  pub name:      Option<String>,
  pub surname:   Option<String>,
  pub email:     Option<String>,
  pub gender:    Option<Option<Gender>>,
  pub phone:     Option<Option<String>>,
  pub birthdate: Option<Option<NaiveDate>>,
}

impl PersonPatch {
  pub fn new(id: Uuid) -> Self { Self { id, ..Default::default() } }

  pub fn is_empty(&self) -> bool {
    self.name.is_none()
      && self.surname.is_none()
      && self.email.is_none()
      && self.gender.is_none()
      && self.phone.is_none()
      && self.birthdate.is_none()
  }

  /// Left-merge this patch over `current`. `id` and `created` are taken from
  /// `current`; `modified` is forced to `now`.
  pub fn apply(self, current: &Person, now: DateTime<Utc>) -> Person {
    Person {
      id:        current.id,
      name:      self.name.unwrap_or_else(|| current.name.clone()),
      surname:   self.surname.unwrap_or_else(|| current.surname.clone()),
      email:     self.email.unwrap_or_else(|| current.email.clone()),
      gender:    self.gender.unwrap_or(current.gender),
      phone:     self.phone.unwrap_or_else(|| current.phone.clone()),
      birthdate: self.birthdate.unwrap_or(current.birthdate),
      created:   current.created,
      modified:  now,
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn alice() -> Person {
    NewPerson {
      name:      "Alice".into(),
      surname:   "Liddell".into(),
      email:     "alice@example.com".into(),
      gender:    Some(Gender::Female),
      phone:     Some("+44 1865 000000".into()),
      birthdate: NaiveDate::from_ymd_opt(1852, 5, 4),
    }
    .into_person_at(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap())
  }

  #[test]
  fn new_person_has_equal_timestamps() {
    let p = alice();
    assert_eq!(p.created, p.modified);
    assert_eq!(p.id.get_version_num(), 4);
  }

  #[test]
  fn patch_overwrites_only_supplied_fields() {
    let current = alice();
    let later = current.created + chrono::Duration::seconds(5);

    let patch = PersonPatch {
      name: Some("Alicia".into()),
      ..PersonPatch::new(current.id)
    };
    let merged = patch.apply(&current, later);

    assert_eq!(merged.name, "Alicia");
    assert_eq!(merged.surname, current.surname);
    assert_eq!(merged.email, current.email);
    assert_eq!(merged.gender, current.gender);
    assert_eq!(merged.phone, current.phone);
    assert_eq!(merged.birthdate, current.birthdate);
    assert_eq!(merged.created, current.created);
    assert_eq!(merged.modified, later);
  }

  #[test]
  fn patch_clears_optional_fields() {
    let current = alice();
    let patch = PersonPatch {
      gender: Some(None),
      phone: Some(None),
      birthdate: Some(None),
      ..PersonPatch::new(current.id)
    };
    assert!(!patch.is_empty());

    let merged = patch.apply(&current, Utc::now());
    assert_eq!(merged.gender, None);
    assert_eq!(merged.phone, None);
    assert_eq!(merged.birthdate, None);
    assert_eq!(merged.name, current.name);
  }

  #[test]
  fn patch_replaces_optional_fields() {
    let current = alice();
    let patch = PersonPatch {
      gender: Some(Some(Gender::Male)),
      phone: Some(Some("555-0100".into())),
      ..PersonPatch::new(current.id)
    };
    let merged = patch.apply(&current, Utc::now());
    assert_eq!(merged.gender, Some(Gender::Male));
    assert_eq!(merged.phone.as_deref(), Some("555-0100"));
    assert_eq!(merged.birthdate, current.birthdate);
  }

  #[test]
  fn nullable_distinguishes_null_from_absent() {
    #[derive(Deserialize)]
    struct Body {
      #[serde(default, deserialize_with = "deserialize_nullable")]
      phone: Option<Option<String>>,
    }

    let absent: Body = serde_json::from_str("{}").unwrap();
    let null: Body = serde_json::from_str(r#"{"phone":null}"#).unwrap();
    let set: Body = serde_json::from_str(r#"{"phone":"555"}"#).unwrap();
    assert_eq!(absent.phone, None);
    assert_eq!(null.phone, Some(None));
    assert_eq!(set.phone, Some(Some("555".into())));
  }

  #[test]
  fn patch_cannot_change_identity() {
    let current = alice();
    let merged = PersonPatch::new(Uuid::new_v4()).apply(&current, Utc::now());
    assert_eq!(merged.id, current.id);
  }

  #[test]
  fn age_counts_whole_years() {
    let p = alice();
    assert_eq!(p.age_on(NaiveDate::from_ymd_opt(1862, 5, 3).unwrap()), Some(9));
    assert_eq!(p.age_on(NaiveDate::from_ymd_opt(1862, 5, 4).unwrap()), Some(10));
  }

  #[test]
  fn age_absent_without_birthdate() {
    let p = Person { birthdate: None, ..alice() };
    assert_eq!(p.age(), None);
  }

  #[test]
  fn json_roundtrip_preserves_timestamps() {
    let p = alice();
    let json = serde_json::to_string(&p).unwrap();
    let back: Person = serde_json::from_str(&json).unwrap();
    assert_eq!(back, p);
  }

  #[test]
  fn birthdate_accepts_full_timestamp() {
    let body = r#"{
      "name": "Bob", "surname": "Builder", "email": "bob@example.com",
      "birthdate": "1990-04-01T10:00:00Z"
    }"#;
    let input: NewPerson = serde_json::from_str(body).unwrap();
    assert_eq!(input.birthdate, NaiveDate::from_ymd_opt(1990, 4, 1));
    assert_eq!(input.gender, None);
  }
}
