use std::fmt;

use serde::Serialize;

use crate::error::CoreError;

/// Returns true when `s` has at least one non-whitespace character.
pub fn is_present(s: &str) -> bool {
    !s.trim().is_empty()
}

/// The actor recorded against a counter increment. Never blank.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Who(String);

impl Who {
    pub fn parse(raw: impl Into<String>) -> Result<Self, CoreError> {
        let raw = raw.into();
        if !is_present(&raw) {
            return Err(CoreError::Validation("who must not be empty".into()));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for Who {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Who({:?})", self.0)
    }
}

impl fmt::Display for Who {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
