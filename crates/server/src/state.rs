use std::sync::Arc;

use notesapi_engine::{CounterService, EngineError, FixedDelay, RecordService};
use notesapi_storage::SqliteStorage;

use crate::config::AppConfig;
use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub counter: CounterService<SqliteStorage>,
    pub records: RecordService<SqliteStorage>,
}

impl AppState {
    pub fn new(
        counter: CounterService<SqliteStorage>,
        records: RecordService<SqliteStorage>,
    ) -> Self {
        Self { counter, records }
    }

    /// Wires both services onto one storage handle according to `config`.
    pub fn from_config(storage: Arc<SqliteStorage>, config: &AppConfig) -> Self {
        let counter = CounterService::new(Arc::clone(&storage))
            .with_mode(config.counter_mode)
            .with_window(Arc::new(FixedDelay(config.race_delay)));
        let records = RecordService::new(storage);
        Self::new(counter, records)
    }
}

/// Runs blocking store work off the async executor.
pub async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, EngineError> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}
