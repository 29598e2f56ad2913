pub mod counter;
pub mod error;
pub mod records;
pub mod window;

pub use counter::{CounterService, Increment, IncrementMode, ParseModeError};
pub use error::EngineError;
pub use records::{EmailMatch, RecordService};
pub use window::{FixedDelay, NoWindow, RaceWindow};
