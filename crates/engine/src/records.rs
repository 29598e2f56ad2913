use std::sync::Arc;

use notesapi_core::{
    Clock, CountryCount, NewNote, NewTodo, NewUser, Note, Page, SystemClock, Todo, User,
};
use notesapi_storage::RecordStore;

use crate::error::EngineError;

/// How `search_users` matches the query against email addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailMatch {
    Exact,
    Prefix,
    Contains,
}

/// Notes, todos and users. Inputs are validated before the store is touched.
pub struct RecordService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for RecordService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: RecordStore> RecordService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn create_note(&self, title: &str, body: &str) -> Result<Note, EngineError> {
        let note = NewNote::new(title, body)?;
        let note = self.store.insert_note(&note, self.clock.now())?;
        tracing::debug!(id = %note.id, "note created");
        Ok(note)
    }

    pub fn list_notes(&self) -> Result<Vec<Note>, EngineError> {
        Ok(self.store.list_notes()?)
    }

    pub fn create_todo(&self, task: &str, is_completed: bool) -> Result<Todo, EngineError> {
        let todo = NewTodo::new(task, is_completed)?;
        let todo = self.store.insert_todo(&todo, self.clock.now())?;
        tracing::debug!(id = %todo.id, "todo created");
        Ok(todo)
    }

    pub fn list_todos(&self) -> Result<Vec<Todo>, EngineError> {
        Ok(self.store.list_todos()?)
    }

    pub fn add_user(&self, email: &str, country: &str) -> Result<User, EngineError> {
        let user = NewUser::new(email, country)?;
        Ok(self.store.insert_user(&user, self.clock.now())?)
    }

    pub fn list_users(&self, page: Page) -> Result<Vec<User>, EngineError> {
        Ok(self.store.list_users(page)?)
    }

    pub fn search_users(&self, by: EmailMatch, query: &str) -> Result<Vec<User>, EngineError> {
        let users = match by {
            EmailMatch::Exact => self.store.find_users_by_email(query)?,
            EmailMatch::Prefix => self.store.find_users_by_email_prefix(query)?,
            EmailMatch::Contains => self.store.find_users_by_email_contains(query)?,
        };
        Ok(users)
    }

    pub fn users_in_country(&self, country: &str) -> Result<Vec<User>, EngineError> {
        Ok(self.store.list_users_by_country(country)?)
    }

    pub fn user_stats(&self) -> Result<Vec<CountryCount>, EngineError> {
        Ok(self.store.user_stats()?)
    }
}
