//! SQL schema for the membership SQLite store.
//!
//! Executed once at connection startup. Schema migration is out of scope;
//! `PRAGMA user_version` records the layout for anyone who needs one later.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS applicants (
    id             TEXT PRIMARY KEY,
    first_name     TEXT NOT NULL,
    last_name      TEXT NOT NULL,   -- stored upper-case
    email          TEXT NOT NULL UNIQUE,   -- stored lower-case
    phone          TEXT NOT NULL,
    date_of_birth  TEXT NOT NULL DEFAULT '',
    nationality    TEXT NOT NULL DEFAULT '',
    address        TEXT NOT NULL DEFAULT '',
    city           TEXT NOT NULL DEFAULT '',
    country        TEXT NOT NULL DEFAULT '',
    title          TEXT NOT NULL,
    institution    TEXT NOT NULL DEFAULT '',
    field          TEXT NOT NULL,
    presentation   TEXT NOT NULL DEFAULT '',
    motivation     TEXT NOT NULL,
    interests      TEXT NOT NULL DEFAULT '',
    links          TEXT NOT NULL DEFAULT '',
    newsletter     INTEGER NOT NULL DEFAULT 0,
    submitted_at   TEXT NOT NULL,   -- RFC 3339 UTC; server-assigned
    status         TEXT NOT NULL DEFAULT 'pending'
                   CHECK (status IN ('pending', 'accepted', 'rejected')),
    updated_at     TEXT,
    admin_comment  TEXT,
    client_ip      TEXT,
    user_agent     TEXT
);

CREATE INDEX IF NOT EXISTS applicants_status_idx    ON applicants(status);
CREATE INDEX IF NOT EXISTS applicants_field_idx     ON applicants(field);
CREATE INDEX IF NOT EXISTS applicants_submitted_idx ON applicants(submitted_at);

PRAGMA user_version = 1;
";
