//! SQL schema for the Rolodex SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Timestamps are fixed-width RFC 3339 strings (nanosecond precision, `Z`
/// suffix) so text comparison matches chronological order.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS persons (
    id         TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    surname    TEXT NOT NULL,
    email      TEXT NOT NULL,
    phone      TEXT,
    gender     TEXT CHECK (gender IN ('male', 'female')),
    birthdate  TEXT,             -- YYYY-MM-DD
    modified   TEXT NOT NULL,
    created    TEXT NOT NULL,
    CHECK (created <= modified)
);

-- Directed edges. Removing either endpoint removes the edge.
CREATE TABLE IF NOT EXISTS contacts (
    person_id  TEXT NOT NULL REFERENCES persons(id) ON DELETE CASCADE,
    contact_id TEXT NOT NULL REFERENCES persons(id) ON DELETE CASCADE,
    PRIMARY KEY (person_id, contact_id)
);

CREATE INDEX IF NOT EXISTS persons_email_idx   ON persons(email);
CREATE INDEX IF NOT EXISTS contacts_contact_idx ON contacts(contact_id);

PRAGMA user_version = 1;
";
