use std::sync::Arc;
use std::time::Duration;

use notesapi_engine::{CounterService, IncrementMode, NoWindow, RecordService};
use notesapi_storage::{SqliteStorage, StorageError};
use tempfile::TempDir;

/// Generous so that dozens of threads queueing on the write lock never give up.
const TEST_BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// A database file in its own temporary directory. The directory and the file
/// are removed when the `TestDb` is dropped.
pub struct TestDb {
    dir: TempDir,
    pub storage: Arc<SqliteStorage>,
}

impl TestDb {
    pub fn new() -> Result<Self, StorageError> {
        let dir = tempfile::tempdir().map_err(|e| StorageError::Unavailable(e.to_string()))?;
        let storage =
            SqliteStorage::open_with_busy_timeout(dir.path().join("app.db"), TEST_BUSY_TIMEOUT)?;
        Ok(Self {
            dir,
            storage: Arc::new(storage),
        })
    }

    /// A second handle on the same file, as a restarted process would open it.
    pub fn reopen(&self) -> Result<SqliteStorage, StorageError> {
        SqliteStorage::open_with_busy_timeout(self.dir.path().join("app.db"), TEST_BUSY_TIMEOUT)
    }

    /// Counter service with no race window; callers add one with `with_window`.
    pub fn counter(&self, mode: IncrementMode) -> CounterService<SqliteStorage> {
        CounterService::new(Arc::clone(&self.storage))
            .with_mode(mode)
            .with_window(Arc::new(NoWindow))
    }

    pub fn records(&self) -> RecordService<SqliteStorage> {
        RecordService::new(Arc::clone(&self.storage))
    }
}
