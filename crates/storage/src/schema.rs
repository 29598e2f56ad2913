use rusqlite::Connection;

use crate::error::StorageError;

pub const SCHEMA_VERSION: i32 = 1;

/// Singleton counter row id.
pub const COUNTER_ROW_ID: i64 = 1;

/// Creates every table that is missing and the counter row if absent.
/// Safe to run against an initialized database: existing rows are untouched.
pub fn init_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
    ",
    )?;
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, unixepoch())",
        [SCHEMA_VERSION],
    )?;
    Ok(())
}

/// Highest schema version recorded in the database.
pub fn schema_version(conn: &Connection) -> Result<Option<i32>, StorageError> {
    Ok(conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?)
}

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS counter (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    value INTEGER NOT NULL
);
INSERT INTO counter (id, value)
SELECT 1, 0
WHERE NOT EXISTS (SELECT 1 FROM counter WHERE id = 1);

CREATE TABLE IF NOT EXISTS counter_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    who TEXT NOT NULL CHECK (length(trim(who)) > 0),
    value INTEGER NOT NULL,
    createdUtc TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    body TEXT NOT NULL,
    createdUtc TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    task TEXT NOT NULL,
    isCompleted INTEGER NOT NULL DEFAULT 0,
    createdUtc TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL,
    country TEXT NOT NULL,
    createdUtc TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_users_email ON users (email);
CREATE INDEX IF NOT EXISTS idx_users_country ON users (country);
";
