use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OpenFlags, OptionalExtension, Params, Row, TransactionBehavior};

use notesapi_core::{
    CounterHistoryEntry, CounterState, CountryCount, HistoryId, NewNote, NewTodo, NewUser, Note,
    NoteId, Page, Todo, TodoId, User, UserId, Who,
};

use crate::error::StorageError;
use crate::schema::{self, COUNTER_ROW_ID};
use crate::traits::{COUNTRY_LIMIT, CounterStore, RecordStore};

pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Storage backed by a single SQLite file.
///
/// Holds no connection of its own: every operation opens a fresh connection
/// and drops it before returning, on success and on error alike.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteStorage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::open_with_busy_timeout(path, DEFAULT_BUSY_TIMEOUT)
    }

    pub fn open_with_busy_timeout(
        path: impl AsRef<Path>,
        busy_timeout: Duration,
    ) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Unavailable(format!("cannot create {}: {e}", parent.display()))
            })?;
        }

        let conn = Connection::open(&path)?;
        conn.busy_timeout(busy_timeout)?;
        schema::init_schema(&conn)?;
        tracing::debug!(path = %path.display(), "database initialized");

        Ok(Self { path, busy_timeout })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-runs table and singleton-row setup on an already open database.
    pub fn ensure_schema(&self) -> Result<(), StorageError> {
        let conn = self.connect()?;
        schema::init_schema(&conn)
    }

    /// Opens a connection to an existing database file. A file that has
    /// disappeared is reported as unavailable rather than silently recreated.
    fn connect(&self) -> Result<Connection, StorageError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&self.path, flags).map_err(|e| {
            StorageError::Unavailable(format!("cannot open {}: {e}", self.path.display()))
        })?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }
}

fn format_utc(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn parse_utc(text: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::Serialization(format!("invalid createdUtc {text:?}: {e}")))
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Escapes LIKE wildcards so user input only ever matches literally.
fn like_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Runs `sql`, reads each row into a raw tuple with `read`, then converts it
/// outside the rusqlite closure so conversion errors stay `StorageError`.
fn query_all<R, T>(
    conn: &Connection,
    sql: &str,
    params: impl Params,
    read: impl FnMut(&Row<'_>) -> rusqlite::Result<R>,
    convert: impl Fn(R) -> Result<T, StorageError>,
) -> Result<Vec<T>, StorageError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, read)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(convert).collect()
}

type RawHistory = (i64, String, i64, String);

fn read_raw_history(row: &Row<'_>) -> rusqlite::Result<RawHistory> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn history_from_raw(
    (id, who, value, created): RawHistory,
) -> Result<CounterHistoryEntry, StorageError> {
    Ok(CounterHistoryEntry {
        id: HistoryId::from_raw(id),
        who,
        value,
        created_utc: parse_utc(&created)?,
    })
}

type RawUser = (i64, String, String, String);

fn read_raw_user(row: &Row<'_>) -> rusqlite::Result<RawUser> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn user_from_raw((id, email, country, created): RawUser) -> Result<User, StorageError> {
    Ok(User {
        id: UserId::from_raw(id),
        email,
        country,
        created_utc: parse_utc(&created)?,
    })
}

fn select_value(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row(
        "SELECT value FROM counter WHERE id = ?1",
        [COUNTER_ROW_ID],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| StorageError::NotFound("counter row".into()))
}

fn select_recent_history(
    conn: &Connection,
    limit: usize,
) -> Result<Vec<CounterHistoryEntry>, StorageError> {
    query_all(
        conn,
        "SELECT id, who, value, createdUtc FROM counter_history ORDER BY id DESC LIMIT ?1",
        [limit_param(limit)],
        read_raw_history,
        history_from_raw,
    )
}

fn insert_history(
    conn: &Connection,
    who: &Who,
    value: i64,
    at: DateTime<Utc>,
) -> Result<HistoryId, StorageError> {
    conn.execute(
        "INSERT INTO counter_history (who, value, createdUtc) VALUES (?1, ?2, ?3)",
        rusqlite::params![who.as_str(), value, format_utc(at)],
    )?;
    Ok(HistoryId::from_raw(conn.last_insert_rowid()))
}

fn update_value(conn: &Connection, value: i64) -> Result<(), StorageError> {
    let changed = conn.execute(
        "UPDATE counter SET value = ?1 WHERE id = ?2",
        rusqlite::params![value, COUNTER_ROW_ID],
    )?;
    if changed == 0 {
        return Err(StorageError::NotFound("counter row".into()));
    }
    Ok(())
}

impl CounterStore for SqliteStorage {
    fn read_value(&self) -> Result<i64, StorageError> {
        let conn = self.connect()?;
        select_value(&conn)
    }

    fn write_value(&self, value: i64) -> Result<(), StorageError> {
        let conn = self.connect()?;
        update_value(&conn, value)
    }

    fn append_history(
        &self,
        who: &Who,
        value: i64,
        at: DateTime<Utc>,
    ) -> Result<HistoryId, StorageError> {
        let conn = self.connect()?;
        insert_history(&conn, who, value, at)
    }

    fn read_recent_history(&self, limit: usize) -> Result<Vec<CounterHistoryEntry>, StorageError> {
        let conn = self.connect()?;
        select_recent_history(&conn, limit)
    }

    fn read_state(&self, limit: usize) -> Result<CounterState, StorageError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let value = select_value(&tx)?;
        let history = select_recent_history(&tx, limit)?;
        tx.commit()?;
        Ok(CounterState { value, history })
    }

    fn increment_atomic(
        &self,
        who: &Who,
        at: DateTime<Utc>,
    ) -> Result<CounterHistoryEntry, StorageError> {
        let mut conn = self.connect()?;
        // IMMEDIATE takes the write lock up front, so no other writer can
        // slip in between the read and the update.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let next = select_value(&tx)?
            .checked_add(1)
            .ok_or_else(|| StorageError::Serialization("counter overflow".into()))?;
        let id = insert_history(&tx, who, next, at)?;
        update_value(&tx, next)?;

        tx.commit()?;
        Ok(CounterHistoryEntry {
            id,
            who: who.as_str().to_string(),
            value: next,
            created_utc: at,
        })
    }

    fn history_count(&self) -> Result<u64, StorageError> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM counter_history", [], |row| {
            row.get(0)
        })?;
        Ok(count as u64)
    }
}

impl RecordStore for SqliteStorage {
    fn insert_note(&self, note: &NewNote, at: DateTime<Utc>) -> Result<Note, StorageError> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO notes (title, body, createdUtc) VALUES (?1, ?2, ?3)",
            rusqlite::params![note.title(), note.body(), format_utc(at)],
        )?;
        Ok(Note {
            id: NoteId::from_raw(conn.last_insert_rowid()),
            title: note.title().to_string(),
            body: note.body().to_string(),
            created_utc: at,
        })
    }

    fn list_notes(&self) -> Result<Vec<Note>, StorageError> {
        let conn = self.connect()?;
        query_all(
            &conn,
            "SELECT id, title, body, createdUtc FROM notes ORDER BY id",
            [],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
            |(id, title, body, created)| {
                Ok(Note {
                    id: NoteId::from_raw(id),
                    title,
                    body,
                    created_utc: parse_utc(&created)?,
                })
            },
        )
    }

    fn insert_todo(&self, todo: &NewTodo, at: DateTime<Utc>) -> Result<Todo, StorageError> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO todos (task, isCompleted, createdUtc) VALUES (?1, ?2, ?3)",
            rusqlite::params![todo.task(), todo.is_completed(), format_utc(at)],
        )?;
        Ok(Todo {
            id: TodoId::from_raw(conn.last_insert_rowid()),
            task: todo.task().to_string(),
            is_completed: todo.is_completed(),
            created_utc: at,
        })
    }

    fn list_todos(&self) -> Result<Vec<Todo>, StorageError> {
        let conn = self.connect()?;
        query_all(
            &conn,
            "SELECT id, task, isCompleted, createdUtc FROM todos ORDER BY id",
            [],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, bool>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
            |(id, task, is_completed, created)| {
                Ok(Todo {
                    id: TodoId::from_raw(id),
                    task,
                    is_completed,
                    created_utc: parse_utc(&created)?,
                })
            },
        )
    }

    fn insert_user(&self, user: &NewUser, at: DateTime<Utc>) -> Result<User, StorageError> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO users (email, country, createdUtc) VALUES (?1, ?2, ?3)",
            rusqlite::params![user.email(), user.country(), format_utc(at)],
        )?;
        Ok(User {
            id: UserId::from_raw(conn.last_insert_rowid()),
            email: user.email().to_string(),
            country: user.country().to_string(),
            created_utc: at,
        })
    }

    fn list_users(&self, page: Page) -> Result<Vec<User>, StorageError> {
        let conn = self.connect()?;
        query_all(
            &conn,
            "SELECT id, email, country, createdUtc FROM users ORDER BY id LIMIT ?1 OFFSET ?2",
            rusqlite::params![page.take, page.skip],
            read_raw_user,
            user_from_raw,
        )
    }

    fn find_users_by_email(&self, email: &str) -> Result<Vec<User>, StorageError> {
        let conn = self.connect()?;
        query_all(
            &conn,
            "SELECT id, email, country, createdUtc FROM users WHERE email = ?1 ORDER BY id",
            [email],
            read_raw_user,
            user_from_raw,
        )
    }

    fn find_users_by_email_prefix(&self, prefix: &str) -> Result<Vec<User>, StorageError> {
        let conn = self.connect()?;
        let pattern = format!("{}%", like_escape(prefix));
        query_all(
            &conn,
            "SELECT id, email, country, createdUtc FROM users
             WHERE email LIKE ?1 ESCAPE '\\' ORDER BY id",
            [pattern],
            read_raw_user,
            user_from_raw,
        )
    }

    fn find_users_by_email_contains(&self, fragment: &str) -> Result<Vec<User>, StorageError> {
        let conn = self.connect()?;
        let pattern = format!("%{}%", like_escape(fragment));
        query_all(
            &conn,
            "SELECT id, email, country, createdUtc FROM users
             WHERE email LIKE ?1 ESCAPE '\\' ORDER BY id",
            [pattern],
            read_raw_user,
            user_from_raw,
        )
    }

    fn list_users_by_country(&self, country: &str) -> Result<Vec<User>, StorageError> {
        let conn = self.connect()?;
        query_all(
            &conn,
            "SELECT id, email, country, createdUtc FROM users
             WHERE country = ?1 ORDER BY id LIMIT ?2",
            rusqlite::params![country, COUNTRY_LIMIT],
            read_raw_user,
            user_from_raw,
        )
    }

    fn user_stats(&self) -> Result<Vec<CountryCount>, StorageError> {
        let conn = self.connect()?;
        query_all(
            &conn,
            "SELECT country, COUNT(*) AS count FROM users
             GROUP BY country ORDER BY count DESC, country",
            [],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            |(country, count)| {
                Ok(CountryCount {
                    country,
                    count: count as u64,
                })
            },
        )
    }
}
