use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use notesapi_core::{Clock, CounterState, HistoryId, SystemClock, Who};
use notesapi_storage::CounterStore;
use thiserror::Error;

use crate::error::EngineError;
use crate::window::{FixedDelay, RaceWindow};

/// Which increment protocol `CounterService::increment` runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IncrementMode {
    /// Unsynchronized read-modify-write. Loses updates under concurrency.
    Racy,
    /// Read, history append and write in one locked transaction.
    #[default]
    Atomic,
}

impl IncrementMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Racy => "racy",
            Self::Atomic => "atomic",
        }
    }
}

impl fmt::Display for IncrementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown increment mode: {0} (expected \"racy\" or \"atomic\")")]
pub struct ParseModeError(String);

impl FromStr for IncrementMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "racy" => Ok(Self::Racy),
            "atomic" => Ok(Self::Atomic),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Increment {
    pub value: i64,
    pub who: Who,
    pub history_id: HistoryId,
}

pub struct CounterService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    window: Arc<dyn RaceWindow>,
    mode: IncrementMode,
}

impl<S> Clone for CounterService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            window: Arc::clone(&self.window),
            mode: self.mode,
        }
    }
}

impl<S: CounterStore> CounterService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            window: Arc::new(FixedDelay::default()),
            mode: IncrementMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: IncrementMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_window(mut self, window: Arc<dyn RaceWindow>) -> Self {
        self.window = window;
        self
    }

    pub fn mode(&self) -> IncrementMode {
        self.mode
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs the configured protocol.
    pub fn increment(&self, who: &str) -> Result<Increment, EngineError> {
        match self.mode {
            IncrementMode::Racy => self.increment_racy(who),
            IncrementMode::Atomic => self.increment_atomic(who),
        }
    }

    /// Read, compute, wait, append history, overwrite. Two callers that both
    /// read before either writes compute the same successor, and the counter
    /// moves once for two successful calls. Both history rows are kept.
    pub fn increment_racy(&self, who: &str) -> Result<Increment, EngineError> {
        let who = Who::parse(who)?;

        let current = self.store.read_value()?;
        let next = current.checked_add(1).ok_or(EngineError::Overflow(current))?;
        tracing::debug!(%who, current, next, "racy increment read");

        self.window.open(&who, current);

        let history_id = self.store.append_history(&who, next, self.clock.now())?;
        self.store.write_value(next)?;
        tracing::debug!(%who, value = next, %history_id, "racy increment written");

        Ok(Increment {
            value: next,
            who,
            history_id,
        })
    }

    /// N successful calls from V always leave V+N, and every history row
    /// holds a value the counter really had. A failure leaves both the value
    /// and the history unchanged.
    pub fn increment_atomic(&self, who: &str) -> Result<Increment, EngineError> {
        let who = Who::parse(who)?;

        let entry = self.store.increment_atomic(&who, self.clock.now())?;
        tracing::debug!(
            %who,
            value = entry.value,
            history_id = %entry.id,
            "atomic increment committed"
        );

        Ok(Increment {
            value: entry.value,
            who,
            history_id: entry.id,
        })
    }

    /// Current value and the newest `limit` history rows, read together.
    pub fn get_state(&self, limit: usize) -> Result<CounterState, EngineError> {
        let state = self.store.read_state(limit)?;
        if state.diverged() {
            tracing::warn!(
                value = state.value,
                latest_claim = state.latest().map(|e| e.value),
                "counter value disagrees with newest history row"
            );
        }
        Ok(state)
    }
}
