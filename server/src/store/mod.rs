//! Todo persistence contract.
//!
//! # Invariants
//! - Write paths validate the title before touching storage.
//! - A missing record is `Ok(None)` / `Ok(false)`, never an error.
//! - `updated_at` strictly increases on every mutation and never precedes
//!   `created_at`.

use crate::db::DbError;
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};
use todo_shared::{Priority, Todo, TodoId};

mod sqlite;

pub use sqlite::SqliteTodoStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    TitleRequired,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TitleRequired => write!(f, "Title is required"),
        }
    }
}

impl Error for ValidationError {}

#[derive(Debug)]
pub enum StoreError {
    Validation(ValidationError),
    Db(DbError),
    InvalidData(String),
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted todo data: {message}"),
            Self::Unavailable(message) => write!(f, "store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Fields accepted by [`TodoStore::create`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
}

impl NewTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Full replacement of every mutable field, applied by [`TodoStore::update`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoChanges {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
}

/// Returns the trimmed title, or `TitleRequired` when nothing is left.
pub fn validate_title(title: &str) -> Result<&str, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::TitleRequired);
    }
    Ok(trimmed)
}

/// Storage backend for todos.
pub trait TodoStore: Send + Sync {
    /// All todos, newest `created_at` first.
    fn find_all(&self) -> StoreResult<Vec<Todo>>;
    fn find_by_id(&self, id: TodoId) -> StoreResult<Option<Todo>>;
    fn create(&self, todo: NewTodo) -> StoreResult<Todo>;
    fn update(&self, id: TodoId, changes: TodoChanges) -> StoreResult<Option<Todo>>;
    fn toggle_complete(&self, id: TodoId) -> StoreResult<Option<Todo>>;
    /// Returns whether a record was removed.
    fn delete(&self, id: TodoId) -> StoreResult<bool>;
}
