//! SQL schema for the campus SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    email         TEXT UNIQUE COLLATE NOCASE,
    password_hash TEXT,            -- argon2 PHC string; NULL for federated-only accounts
    display_name  TEXT,
    student_id    TEXT,
    created_at    TEXT NOT NULL
);

-- Only a SHA-256 digest of each bearer token is kept.
CREATE TABLE IF NOT EXISTS sessions (
    token_hash TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES users(user_id),
    issued_at  TEXT NOT NULL
);

-- Absence of a row means 'student'.
CREATE TABLE IF NOT EXISTS roles (
    user_id    TEXT PRIMARY KEY REFERENCES users(user_id),
    role       TEXT NOT NULL,  -- 'student' | 'administrator'
    granted_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS federated_identities (
    provider  TEXT NOT NULL,
    subject   TEXT NOT NULL,
    user_id   TEXT NOT NULL REFERENCES users(user_id),
    linked_at TEXT NOT NULL,
    PRIMARY KEY (provider, subject)
);

-- Complaints are never deleted. Only status and feedback are ever updated.
CREATE TABLE IF NOT EXISTS complaints (
    complaint_id    TEXT PRIMARY KEY,
    title           TEXT NOT NULL,
    description     TEXT NOT NULL,
    category        TEXT NOT NULL DEFAULT '',
    location        TEXT NOT NULL DEFAULT '',
    contact         TEXT NOT NULL DEFAULT '',
    status          TEXT NOT NULL DEFAULT 'Pending',
    submitter_id    TEXT NOT NULL REFERENCES users(user_id),
    submitter_email TEXT NOT NULL DEFAULT '',
    created_at      TEXT NOT NULL,   -- RFC 3339, fixed microsecond precision
    priority        TEXT NOT NULL DEFAULT 'Medium',
    feedback        TEXT
);

CREATE INDEX IF NOT EXISTS complaints_created_idx   ON complaints(created_at);
CREATE INDEX IF NOT EXISTS complaints_submitter_idx ON complaints(submitter_id);
CREATE INDEX IF NOT EXISTS sessions_user_idx        ON sessions(user_id);

PRAGMA user_version = 1;
";
