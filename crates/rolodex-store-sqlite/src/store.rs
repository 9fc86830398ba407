//! [`SqliteRepository`] — the SQLite implementation of [`PersonRepository`].

use std::{collections::HashMap, path::Path, time::Instant};

use chrono::Utc;
use rolodex_cache::{KeyValueStore, PersonCache};
use rolodex_core::{
  contact::ContactEdge,
  person::{Person, PersonPatch},
  store::{Pagination, PersonRepository},
};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  encode::{PersonParams, RawPerson, decode_uuid, encode_uuid},
  schema::SCHEMA,
  Error, Result,
};

// ─── Statements ──────────────────────────────────────────────────────────────

const INSERT_PERSON: &str = "
  INSERT INTO persons
    (id, name, surname, email, phone, gender, birthdate, modified, created)
  VALUES
    (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
  RETURNING
    id, name, surname, email, phone, gender, birthdate, modified, created";

const SELECT_PERSON_BY_ID: &str = "
  SELECT id, name, surname, email, phone, gender, birthdate, modified, created
  FROM persons
  WHERE id = ?1";

const SELECT_PERSONS_PAGE: &str = "
  SELECT id, name, surname, email, phone, gender, birthdate, modified, created
  FROM persons
  ORDER BY email ASC, id ASC
  LIMIT ?1 OFFSET ?2";

const COUNT_PERSONS: &str = "SELECT COUNT(*) FROM persons";

const DELETE_PERSON: &str = "
  DELETE FROM persons
  WHERE id = ?1
  RETURNING
    id, name, surname, email, phone, gender, birthdate, modified, created";

const UPDATE_PERSON: &str = "
  UPDATE persons
  SET name = ?1, surname = ?2, email = ?3, phone = ?4, gender = ?5,
      birthdate = ?6, modified = ?7
  WHERE id = ?8
  RETURNING
    id, name, surname, email, phone, gender, birthdate, modified, created";

// `?1` is a JSON array of owner ids.
const SELECT_CONTACTS: &str = "
  SELECT
    c.person_id,
    p.id, p.name, p.surname, p.email, p.phone, p.gender, p.birthdate,
    p.modified, p.created
  FROM contacts c
  JOIN persons p ON p.id = c.contact_id
  WHERE c.person_id IN (SELECT value FROM json_each(?1))";

const INSERT_CONTACT: &str = "
  INSERT INTO contacts (person_id, contact_id)
  VALUES (?1, ?2)
  ON CONFLICT DO NOTHING";

const DELETE_CONTACT: &str =
  "DELETE FROM contacts WHERE person_id = ?1 AND contact_id = ?2";

// ─── Statement outcomes ──────────────────────────────────────────────────────

/// Row count reported in per-statement diagnostics.
trait Affected {
  fn affected(&self) -> usize;
}

impl<T> Affected for Vec<T> {
  fn affected(&self) -> usize { self.len() }
}

impl<T> Affected for Option<T> {
  fn affected(&self) -> usize { usize::from(self.is_some()) }
}

impl Affected for usize {
  fn affected(&self) -> usize { *self }
}

impl Affected for i64 {
  fn affected(&self) -> usize { 1 }
}

impl Affected for RawPerson {
  fn affected(&self) -> usize { 1 }
}

enum EdgeInsert {
  Created,
  AlreadyPresent,
  /// Either endpoint is not a stored person; carries the store's message.
  MissingEndpoint(String),
}

impl Affected for EdgeInsert {
  fn affected(&self) -> usize { usize::from(matches!(self, Self::Created)) }
}

fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _)
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Rolodex repository backed by a single SQLite file, with point lookups
/// fronted by a [`PersonCache`].
///
/// Cloning is cheap — the connection and cache backend are reference-counted.
pub struct SqliteRepository<B> {
  conn:  tokio_rusqlite::Connection,
  cache: PersonCache<B>,
}

impl<B> Clone for SqliteRepository<B> {
  fn clone(&self) -> Self {
    Self { conn: self.conn.clone(), cache: self.cache.clone() }
  }
}

impl<B: KeyValueStore> SqliteRepository<B> {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>, cache: PersonCache<B>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, cache };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory(cache: PersonCache<B>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, cache };
    store.init_schema().await?;
    Ok(store)
  }

  pub fn cache(&self) -> &PersonCache<B> { &self.cache }

  #[cfg(test)]
  pub(crate) fn connection(&self) -> &tokio_rusqlite::Connection { &self.conn }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run one statement on the connection thread and log its timing.
  async fn run<T, F>(&self, op: &'static str, f: F) -> Result<T>
  where
    T: Affected + Send + 'static,
    F: FnOnce(&mut rusqlite::Connection) -> rusqlite::Result<T> + Send + 'static,
  {
    let start = Instant::now();
    let out = self.conn.call(move |conn| Ok(f(conn)?)).await?;
    tracing::debug!(
      op,
      elapsed_ms = start.elapsed().as_millis() as u64,
      rows = out.affected(),
      "db query"
    );
    Ok(out)
  }
}

// ─── PersonRepository impl ───────────────────────────────────────────────────

impl<B: KeyValueStore> PersonRepository for SqliteRepository<B> {
  type Error = Error;

  // ── Persons ───────────────────────────────────────────────────────────────

  async fn insert_person(&self, person: Person) -> Result<Person> {
    let p = PersonParams::from(&person);

    let raw = self
      .run("insert_person", move |conn| {
        conn.query_row(
          INSERT_PERSON,
          rusqlite::params![
            p.id, p.name, p.surname, p.email, p.phone, p.gender, p.birthdate,
            p.modified, p.created,
          ],
          |row| RawPerson::from_row(row, 0),
        )
      })
      .await?;

    raw.into_person()
  }

  async fn find_person_by_id(&self, id: Uuid) -> Result<Option<Person>> {
    match self.cache.get(id).await {
      Ok(Some(person)) => return Ok(Some(person)),
      Ok(None) => {}
      Err(e) => {
        tracing::warn!(%id, error = %e, "cache read failed, falling back to store");
      }
    }

    let id_str = encode_uuid(id);
    let raw = self
      .run("find_person_by_id", move |conn| {
        conn
          .query_row(SELECT_PERSON_BY_ID, rusqlite::params![id_str], |row| {
            RawPerson::from_row(row, 0)
          })
          .optional()
      })
      .await?;

    let person = raw.map(RawPerson::into_person).transpose()?;

    // Population is best-effort; the read has already succeeded.
    if let Some(p) = &person
      && let Err(e) = self.cache.set(p).await
    {
      tracing::warn!(%id, error = %e, "failed to populate cache");
    }

    Ok(person)
  }

  async fn find_persons_paginated(&self, page: Pagination) -> Result<Vec<Person>> {
    let limit = i64::from(page.limit);
    let offset = i64::from(page.offset);

    let raws = self
      .run("find_persons_paginated", move |conn| {
        let mut stmt = conn.prepare(SELECT_PERSONS_PAGE)?;
        let rows = stmt
          .query_map(rusqlite::params![limit, offset], |row| {
            RawPerson::from_row(row, 0)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn get_total_person_count(&self) -> Result<u64> {
    let count: i64 = self
      .run("get_total_person_count", |conn| {
        conn.query_row(COUNT_PERSONS, [], |row| row.get(0))
      })
      .await?;

    u64::try_from(count).map_err(|_| Error::Decode(format!("negative count: {count}")))
  }

  async fn remove_person_by_id(&self, id: Uuid) -> Result<Option<Person>> {
    let id_str = encode_uuid(id);
    let raw = self
      .run("remove_person_by_id", move |conn| {
        conn
          .query_row(DELETE_PERSON, rusqlite::params![id_str], |row| {
            RawPerson::from_row(row, 0)
          })
          .optional()
      })
      .await?;

    // Invalidate even when nothing was deleted.
    self.cache.del(id).await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn update_person(&self, patch: PersonPatch) -> Result<Option<Person>> {
    let id = patch.id;
    let Some(current) = self.find_person_by_id(id).await? else {
      return Ok(None);
    };

    // Never let a backwards clock step break `created <= modified`.
    let now = Utc::now().max(current.created);
    let merged = patch.apply(&current, now);
    let p = PersonParams::from(&merged);

    let raw = self
      .run("update_person", move |conn| {
        conn
          .query_row(
            UPDATE_PERSON,
            rusqlite::params![
              p.name, p.surname, p.email, p.phone, p.gender, p.birthdate,
              p.modified, p.id,
            ],
            |row| RawPerson::from_row(row, 0),
          )
          .optional()
      })
      .await?;

    let Some(raw) = raw else {
      return Ok(None);
    };
    let updated = raw.into_person()?;
    self.cache.del(id).await?;
    Ok(Some(updated))
  }

  // ── Contacts ──────────────────────────────────────────────────────────────

  async fn find_contacts(&self, person_ids: &[Uuid]) -> Result<Vec<Vec<Person>>> {
    if person_ids.is_empty() {
      return Ok(Vec::new());
    }

    let owners: Vec<String> = person_ids.iter().copied().map(encode_uuid).collect();
    let owners_json = serde_json::to_string(&owners)?;

    let rows: Vec<(String, RawPerson)> = self
      .run("find_contacts", move |conn| {
        let mut stmt = conn.prepare(SELECT_CONTACTS)?;
        let rows = stmt
          .query_map(rusqlite::params![owners_json], |row| {
            Ok((row.get(0)?, RawPerson::from_row(row, 1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    // The store returns an unordered bag; bucket it by owner.
    let mut buckets: HashMap<Uuid, Vec<Person>> = HashMap::new();
    for (owner, raw) in rows {
      buckets
        .entry(decode_uuid(&owner)?)
        .or_default()
        .push(raw.into_person()?);
    }

    Ok(
      person_ids
        .iter()
        .map(|id| buckets.get(id).cloned().unwrap_or_default())
        .collect(),
    )
  }

  async fn insert_contact(&self, edge: ContactEdge) -> Result<bool> {
    let person_str = encode_uuid(edge.person_id);
    let contact_str = encode_uuid(edge.contact_id);

    let outcome = self
      .run("insert_contact", move |conn| {
        match conn.execute(INSERT_CONTACT, rusqlite::params![person_str, contact_str]) {
          Ok(0) => Ok(EdgeInsert::AlreadyPresent),
          Ok(_) => Ok(EdgeInsert::Created),
          Err(e) if is_foreign_key_violation(&e) => {
            Ok(EdgeInsert::MissingEndpoint(e.to_string()))
          }
          Err(e) => Err(e),
        }
      })
      .await?;

    match outcome {
      EdgeInsert::Created => Ok(true),
      EdgeInsert::AlreadyPresent => Ok(false),
      EdgeInsert::MissingEndpoint(detail) => {
        tracing::info!(
          person_id = %edge.person_id,
          contact_id = %edge.contact_id,
          %detail,
          "attempted to violate foreign key constraint"
        );
        Ok(false)
      }
    }
  }

  async fn remove_contact(&self, edge: ContactEdge) -> Result<bool> {
    let person_str = encode_uuid(edge.person_id);
    let contact_str = encode_uuid(edge.contact_id);

    let removed = self
      .run("remove_contact", move |conn| {
        conn.execute(DELETE_CONTACT, rusqlite::params![person_str, contact_str])
      })
      .await?;

    Ok(removed > 0)
  }
}
