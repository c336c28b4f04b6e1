//! Errors reported by the task store.

use thiserror::Error;

use crate::id::TaskId;

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Coarse classification of a [`StoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input was rejected.
    Validation,
    /// The referenced task does not exist.
    NotFound,
}

/// Failure of a store mutation. The collection is unchanged whenever one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Input was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// No task with this id exists.
    #[error("task not found: {0}")]
    NotFound(TaskId),
}

impl StoreError {
    /// Coarse kind used by callers that only branch on the category of failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
        }
    }
}

/// Reasons a record or mutation is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The title is empty after trimming whitespace.
    #[error("task text must not be empty")]
    EmptyText,
    /// Category outside the fixed set.
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    /// Priority outside the fixed set.
    #[error("unknown priority: {0}")]
    UnknownPriority(String),
    /// A second record carries an id that was already accepted.
    #[error("duplicate task id: {0}")]
    DuplicateId(TaskId),
    /// A timestamp field could not be parsed.
    #[error("invalid {field} timestamp: {value}")]
    InvalidTimestamp {
        /// Name of the offending field.
        field: &'static str,
        /// Raw value as found in the input.
        value: String,
    },
    /// The record is not shaped like a task at all.
    #[error("malformed record: {0}")]
    Malformed(String),
}
