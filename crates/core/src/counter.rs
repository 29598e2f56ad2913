use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ids::HistoryId;

/// Number of history rows returned alongside the counter value by default.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// One append-only audit row. `value` is the successor value the caller
/// *claimed*; under the racy protocol it may never have been the stored value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterHistoryEntry {
    pub id: HistoryId,
    pub who: String,
    pub value: i64,
    pub created_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterState {
    pub value: i64,
    /// Most recent first.
    pub history: Vec<CounterHistoryEntry>,
}

impl CounterState {
    pub fn latest(&self) -> Option<&CounterHistoryEntry> {
        self.history.first()
    }

    /// True when the newest history row disagrees with the stored value,
    /// the visible symptom of a lost update.
    pub fn diverged(&self) -> bool {
        self.latest().is_some_and(|e| e.value != self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, value: i64) -> CounterHistoryEntry {
        CounterHistoryEntry {
            id: HistoryId::from_raw(id),
            who: format!("actor-{id}"),
            value,
            created_utc: Utc::now(),
        }
    }

    #[test]
    fn empty_history_never_diverges() {
        let state = CounterState { value: 0, history: vec![] };
        assert!(state.latest().is_none());
        assert!(!state.diverged());
    }

    #[test]
    fn diverged_when_latest_claim_differs() {
        let state = CounterState {
            value: 1,
            history: vec![entry(2, 1), entry(1, 1)],
        };
        assert!(!state.diverged());

        let state = CounterState {
            value: 1,
            history: vec![entry(2, 2), entry(1, 1)],
        };
        assert!(state.diverged());
    }
}
