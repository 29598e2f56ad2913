pub mod clock;
pub mod counter;
pub mod error;
pub mod identity;
pub mod ids;
pub mod records;

pub use clock::{Clock, FixedClock, SystemClock};
pub use counter::{CounterHistoryEntry, CounterState, DEFAULT_HISTORY_LIMIT};
pub use error::CoreError;
pub use identity::Who;
pub use ids::*;
pub use records::*;
