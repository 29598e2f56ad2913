use notesapi_core::CoreError;
use notesapi_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    Validation(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("storage error: {0}")]
    Storage(StorageError),

    #[error("counter overflow at {0}")]
    Overflow(i64),
}

impl EngineError {
    /// Caller mistakes, as opposed to failures of the service itself.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<CoreError> for EngineError {
    fn from(e: CoreError) -> Self {
        let CoreError::Validation(msg) = e;
        Self::Validation(msg)
    }
}

impl From<StorageError> for EngineError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Unavailable(msg) => Self::StorageUnavailable(msg),
            other => Self::Storage(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_is_client_error() {
        let err: EngineError = CoreError::Validation("who must not be empty".into()).into();
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "who must not be empty");
    }

    #[test]
    fn unavailable_storage_maps_to_server_error() {
        let err: EngineError = StorageError::Unavailable("database is locked".into()).into();
        assert!(matches!(err, EngineError::StorageUnavailable(_)));
        assert!(!err.is_client_error());
    }
}
