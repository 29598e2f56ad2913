use chrono::{DateTime, Utc};

use notesapi_core::{
    CounterHistoryEntry, CounterState, CountryCount, HistoryId, NewNote, NewTodo, NewUser, Note,
    Page, Todo, User, Who,
};

use crate::error::StorageError;

/// Durable home of the singleton counter and its append-only history.
pub trait CounterStore: Send + Sync {
    fn read_value(&self) -> Result<i64, StorageError>;

    /// Unconditional overwrite. Last writer wins; nothing checks whether the
    /// value changed since it was read.
    fn write_value(&self, value: i64) -> Result<(), StorageError>;

    fn append_history(
        &self,
        who: &Who,
        value: i64,
        at: DateTime<Utc>,
    ) -> Result<HistoryId, StorageError>;

    /// Newest first, ordered by insertion id rather than timestamp.
    fn read_recent_history(&self, limit: usize) -> Result<Vec<CounterHistoryEntry>, StorageError>;

    /// Value and history read inside one transaction.
    fn read_state(&self, limit: usize) -> Result<CounterState, StorageError>;

    /// Read, history append and value update under the database write lock.
    /// Either both writes become visible or neither does.
    fn increment_atomic(
        &self,
        who: &Who,
        at: DateTime<Utc>,
    ) -> Result<CounterHistoryEntry, StorageError>;

    fn history_count(&self) -> Result<u64, StorageError>;
}

pub trait RecordStore: Send + Sync {
    fn insert_note(&self, note: &NewNote, at: DateTime<Utc>) -> Result<Note, StorageError>;

    fn list_notes(&self) -> Result<Vec<Note>, StorageError>;

    fn insert_todo(&self, todo: &NewTodo, at: DateTime<Utc>) -> Result<Todo, StorageError>;

    fn list_todos(&self) -> Result<Vec<Todo>, StorageError>;

    fn insert_user(&self, user: &NewUser, at: DateTime<Utc>) -> Result<User, StorageError>;

    fn list_users(&self, page: Page) -> Result<Vec<User>, StorageError>;

    fn find_users_by_email(&self, email: &str) -> Result<Vec<User>, StorageError>;

    fn find_users_by_email_prefix(&self, prefix: &str) -> Result<Vec<User>, StorageError>;

    fn find_users_by_email_contains(&self, fragment: &str) -> Result<Vec<User>, StorageError>;

    /// At most [`COUNTRY_LIMIT`] rows.
    fn list_users_by_country(&self, country: &str) -> Result<Vec<User>, StorageError>;

    /// User count per country, largest first.
    fn user_stats(&self) -> Result<Vec<CountryCount>, StorageError>;
}

pub const COUNTRY_LIMIT: u32 = 100;
