//! Notes, todos and users: plain rows with validated inputs.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::CoreError;
use crate::identity::is_present;
use crate::ids::{NoteId, TodoId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub body: String,
    pub created_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    title: String,
    body: String,
}

impl NewNote {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Result<Self, CoreError> {
        let title = title.into();
        let body = body.into();
        if !is_present(&title) || !is_present(&body) {
            return Err(CoreError::Validation(
                "title and body must not be empty".into(),
            ));
        }
        Ok(Self { title, body })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub task: String,
    pub is_completed: bool,
    pub created_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    task: String,
    is_completed: bool,
}

impl NewTodo {
    pub fn new(task: impl Into<String>, is_completed: bool) -> Result<Self, CoreError> {
        let task = task.into();
        if !is_present(&task) {
            return Err(CoreError::Validation("task must not be empty".into()));
        }
        Ok(Self { task, is_completed })
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub country: String,
    pub created_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    email: String,
    country: String,
}

impl NewUser {
    pub fn new(email: impl Into<String>, country: impl Into<String>) -> Result<Self, CoreError> {
        let email = email.into();
        let country = country.into();
        if !is_present(&email) || !is_present(&country) {
            return Err(CoreError::Validation(
                "email and country must not be empty".into(),
            ));
        }
        Ok(Self { email, country })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn country(&self) -> &str {
        &self.country
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryCount {
    pub country: String,
    pub count: u64,
}

/// Offset/limit window for listing users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u32,
    pub take: u32,
}

impl Page {
    pub const DEFAULT_TAKE: u32 = 100;
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            take: Self::DEFAULT_TAKE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_requires_title_and_body() {
        assert!(NewNote::new("Groceries", "milk").is_ok());
        assert!(NewNote::new("", "milk").is_err());
        assert!(NewNote::new("Groceries", "  ").is_err());
    }

    #[test]
    fn todo_requires_task() {
        let todo = NewTodo::new("water plants", true).unwrap();
        assert!(todo.is_completed());
        assert!(NewTodo::new(" ", false).is_err());
    }

    #[test]
    fn user_requires_email_and_country() {
        assert!(NewUser::new("a@example.com", "NO").is_ok());
        assert!(NewUser::new("a@example.com", "").is_err());
        assert!(NewUser::new("", "NO").is_err());
    }

    #[test]
    fn todo_serializes_camel_case() {
        let todo = Todo {
            id: TodoId::from_raw(1),
            task: "x".into(),
            is_completed: false,
            created_utc: Utc::now(),
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert!(json.get("isCompleted").is_some());
        assert!(json.get("createdUtc").is_some());
    }
}
