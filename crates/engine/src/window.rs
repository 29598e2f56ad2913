use std::time::Duration;

use notesapi_core::Who;

/// Pause between the read and the write of the racy increment. Concurrent
/// callers that overlap inside this window lose updates.
pub trait RaceWindow: Send + Sync {
    fn open(&self, who: &Who, observed: i64);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoWindow;

impl RaceWindow for NoWindow {
    fn open(&self, _who: &Who, _observed: i64) {}
}

/// Sleeps for a fixed duration, the way a slow request handler would.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl FixedDelay {
    pub const DEFAULT: Duration = Duration::from_millis(250);
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl RaceWindow for FixedDelay {
    fn open(&self, who: &Who, observed: i64) {
        tracing::trace!(%who, observed, delay_ms = self.0.as_millis() as u64, "race window open");
        std::thread::sleep(self.0);
    }
}
