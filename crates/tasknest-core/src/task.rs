use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::category::{Category, Priority};
use crate::id::TaskId;

/// A single to-do record.
///
/// Values are only ever changed through [`TaskStore`](crate::store::TaskStore),
/// which keeps `completed_at` in step with `completed` and never lets
/// `updated_at` fall behind `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Stable identifier.
    pub id: TaskId,
    /// Short title, never blank.
    pub text: String,
    /// Optional longer notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the task is done.
    #[serde(default)]
    pub completed: bool,
    /// Life area.
    #[serde(default)]
    pub category: Category,
    /// Importance.
    #[serde(default)]
    pub priority: Priority,
    /// Optional deadline.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub due_date: Option<OffsetDateTime>,
    /// Free-form tags in entry order.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Creation instant.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Instant of the latest mutation.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Instant the task was last marked done; present exactly when `completed`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub completed_at: Option<OffsetDateTime>,
    /// Hidden from the active views when set.
    #[serde(default)]
    pub archived: bool,
}

impl Task {
    /// True for tasks that count towards statistics (not archived).
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.archived
    }

    /// Past its due date while still open and not archived.
    #[must_use]
    pub fn is_overdue(&self, now: OffsetDateTime) -> bool {
        !self.completed && !self.archived && self.due_date.is_some_and(|due| due < now)
    }

    pub(crate) fn touch(&mut self, now: OffsetDateTime) {
        self.updated_at = now.max(self.created_at);
    }

    pub(crate) fn set_completed(&mut self, completed: bool, now: OffsetDateTime) {
        match (self.completed, completed) {
            (false, true) => self.completed_at = Some(now),
            (true, false) => self.completed_at = None,
            _ => {}
        }
        self.completed = completed;
    }

    /// Check the per-record invariants.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        !self.text.trim().is_empty()
            && self.completed == self.completed_at.is_some()
            && self.updated_at >= self.created_at
    }
}
