//! Todo domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use online_store_core::{TodoId, UserId};

/// Maximum todo content length.
pub const MAX_CONTENT_LENGTH: usize = 500;

/// Errors raised when todo input fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TodoValidationError {
    /// The content is empty or only whitespace.
    #[error("content may not be blank")]
    BlankContent,
    /// The content is too long.
    #[error("content must be at most {max} characters")]
    ContentTooLong {
        /// Maximum number of characters.
        max: usize,
    },
}

/// A todo item owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Todo {
    pub id: TodoId,
    #[serde(skip)]
    pub owner: UserId,
    pub content: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// A validated todo about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    content: String,
    completed: bool,
}

impl NewTodo {
    /// Validate new todo content.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is blank or too long.
    pub fn new(content: &str, completed: bool) -> Result<Self, TodoValidationError> {
        Ok(Self {
            content: validate_content(content)?,
            completed,
        })
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub const fn completed(&self) -> bool {
        self.completed
    }
}

/// A partial todo update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoChanges {
    content: Option<String>,
    completed: Option<bool>,
}

impl TodoChanges {
    /// Validate a partial update.
    ///
    /// # Errors
    ///
    /// Returns an error if supplied content is blank or too long.
    pub fn new(content: Option<&str>, completed: Option<bool>) -> Result<Self, TodoValidationError> {
        Ok(Self {
            content: content.map(validate_content).transpose()?,
            completed,
        })
    }

    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    #[must_use]
    pub const fn completed(&self) -> Option<bool> {
        self.completed
    }

    /// Apply the changes to a todo in place.
    pub fn apply_to(&self, todo: &mut Todo) {
        if let Some(content) = &self.content {
            todo.content.clone_from(content);
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
    }
}

fn validate_content(content: &str) -> Result<String, TodoValidationError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(TodoValidationError::BlankContent);
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(TodoValidationError::ContentTooLong {
            max: MAX_CONTENT_LENGTH,
        });
    }
    Ok(content.to_owned())
}
