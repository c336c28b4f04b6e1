//! Command objects consumed by the task store.

use time::OffsetDateTime;

use crate::category::{Category, Priority};

/// Fields for a new task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    /// Title; trimmed before storing and rejected when blank.
    pub text: String,
    /// Optional notes; blank input is treated as absent.
    pub description: Option<String>,
    /// Life area.
    pub category: Category,
    /// Importance.
    pub priority: Priority,
    /// Optional deadline.
    pub due_date: Option<OffsetDateTime>,
    /// Tags in entry order.
    pub tags: Vec<String>,
}

impl TaskDraft {
    /// Draft with the given title and default everything else.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Set the category.
    #[must_use]
    pub const fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Set the priority.
    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the due date.
    #[must_use]
    pub const fn due(mut self, due: OffsetDateTime) -> Self {
        self.due_date = Some(due);
        self
    }

    /// Replace the tag list.
    #[must_use]
    pub fn tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Patch for the description body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptionPatch {
    /// Overwrite with new text (blank text clears).
    Set(String),
    /// Remove the description.
    Clear,
}

/// Patch for the due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuePatch {
    /// Set a new deadline.
    Set(OffsetDateTime),
    /// Remove the deadline.
    Clear,
}

/// Partial update applied by [`TaskStore::update`](crate::store::TaskStore::update).
///
/// `None` leaves a field untouched. `completed_at` is not settable; the store
/// derives it from `completed`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    /// Overwrite the title.
    pub text: Option<String>,
    /// Patch applied to the description.
    pub description: Option<DescriptionPatch>,
    /// Set the completion flag.
    pub completed: Option<bool>,
    /// Move to another category.
    pub category: Option<Category>,
    /// Change importance.
    pub priority: Option<Priority>,
    /// Patch applied to the due date.
    pub due_date: Option<DuePatch>,
    /// Replace the tag list.
    pub tags: Option<Vec<String>>,
    /// Set the archive flag.
    pub archived: Option<bool>,
}

impl TaskUpdate {
    /// Returns true when the update carries no field changes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.description.is_none()
            && self.completed.is_none()
            && self.category.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.tags.is_none()
            && self.archived.is_none()
    }
}

/// Split comma separated tag input, trimming each entry and dropping blanks.
///
/// Order and duplicates are preserved.
#[must_use]
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect()
}

pub(crate) fn normalize_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}
