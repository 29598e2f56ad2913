//! Request and response bodies. Field names are camelCase on the wire.

use chrono::{DateTime, Utc};
use notesapi_core::{CounterHistoryEntry, CounterState, NoteId, Page, TodoId};
use serde::{Deserialize, Serialize};

/// `who` is optional so that a missing or null name reaches validation and
/// comes back as the same 400 as a blank one.
#[derive(Debug, Deserialize)]
pub struct IncrementRequest {
    #[serde(default)]
    pub who: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncrementResponse {
    pub value: i64,
    pub who: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub who: String,
    pub value: i64,
    pub created_utc: DateTime<Utc>,
}

impl From<CounterHistoryEntry> for HistoryItem {
    fn from(entry: CounterHistoryEntry) -> Self {
        Self {
            who: entry.who,
            value: entry.value,
            created_utc: entry.created_utc,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CounterResponse {
    pub value: i64,
    pub history: Vec<HistoryItem>,
}

impl From<CounterState> for CounterResponse {
    fn from(state: CounterState) -> Self {
        Self {
            value: state.value,
            history: state.history.into_iter().map(HistoryItem::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedNote {
    pub id: NoteId,
    pub title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedTodo {
    pub id: TodoId,
    pub task: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub skip: Option<u32>,
    pub take: Option<u32>,
}

impl From<PageQuery> for Page {
    fn from(query: PageQuery) -> Self {
        let defaults = Page::default();
        Page {
            skip: query.skip.unwrap_or(defaults.skip),
            take: query.take.unwrap_or(defaults.take),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}
