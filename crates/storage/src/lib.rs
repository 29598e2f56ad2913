pub mod error;
pub mod schema;
pub mod sqlite;
pub mod traits;

pub use error::StorageError;
pub use sqlite::{DEFAULT_BUSY_TIMEOUT, SqliteStorage};
pub use traits::*;
