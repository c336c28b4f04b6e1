//! Pure derivation of the visible task list.
//!
//! Nothing here reads the clock: overdue checks take `now` explicitly so the
//! same inputs always produce the same output.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use time::OffsetDateTime;

use crate::category::Category;
use crate::task::Task;
use crate::text_matcher::TextMatcher;

/// Category narrowing applied by the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Keep every category.
    #[default]
    All,
    /// Keep a single category.
    Only(Category),
}

impl CategoryFilter {
    /// Whether `task` passes this filter.
    #[must_use]
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => task.category == category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(category) => fmt::Display::fmt(category, f),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = ParseViewParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<Category>()
            .map(Self::Only)
            .map_err(|_| ParseViewParamError::new("category", s))
    }
}

impl From<Category> for CategoryFilter {
    fn from(category: Category) -> Self {
        Self::Only(category)
    }
}

/// Completion/archive narrowing applied by the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// No narrowing.
    #[default]
    All,
    /// Open and not archived.
    Active,
    /// Done and not archived.
    Completed,
    /// Archived, done or not.
    Archived,
    /// Open, not archived, due date already passed.
    Overdue,
}

impl StatusFilter {
    /// Every status filter in menu order.
    pub const ALL: [Self; 5] = [
        Self::All,
        Self::Active,
        Self::Completed,
        Self::Archived,
        Self::Overdue,
    ];

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Archived => "archived",
            Self::Overdue => "overdue",
        }
    }

    /// Whether `task` passes this filter at instant `now`.
    #[must_use]
    pub fn matches(self, task: &Task, now: OffsetDateTime) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed && !task.archived,
            Self::Completed => task.completed && !task.archived,
            Self::Archived => task.archived,
            Self::Overdue => task.is_overdue(now),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = ParseViewParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ParseViewParamError::new("status", s))
    }
}

/// Ordering applied to the filtered tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Newest first.
    #[default]
    Created,
    /// Earliest deadline first, undated last.
    Due,
    /// Most important first.
    Priority,
    /// Category name A to Z.
    Category,
    /// Title A to Z.
    Alphabetical,
}

impl SortKey {
    /// Every sort key in menu order.
    pub const ALL: [Self; 5] = [
        Self::Created,
        Self::Due,
        Self::Priority,
        Self::Category,
        Self::Alphabetical,
    ];

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Due => "due",
            Self::Priority => "priority",
            Self::Category => "category",
            Self::Alphabetical => "alphabetical",
        }
    }

    /// Compare two tasks under this key. `Equal` leaves the input order to the stable sort.
    #[must_use]
    pub fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            Self::Created => b.created_at.cmp(&a.created_at),
            Self::Due => match (a.due_date, b.due_date) {
                (Some(left), Some(right)) => left.cmp(&right),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            Self::Priority => b.priority.rank().cmp(&a.priority.rank()),
            Self::Category => a.category.as_str().cmp(b.category.as_str()),
            Self::Alphabetical => compare_text(&a.text, &b.text),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ParseViewParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| ParseViewParamError::new("sort", s))
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Returned when a view parameter string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {param} value: {value}")]
pub struct ParseViewParamError {
    /// Which parameter failed.
    pub param: &'static str,
    /// Raw input.
    pub value: String,
}

impl ParseViewParamError {
    fn new(param: &'static str, value: &str) -> Self {
        Self {
            param,
            value: value.to_owned(),
        }
    }
}

/// Caller-supplied knobs controlling a derived view. Not persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewParams {
    /// Free-text query, matched as typed; empty disables searching.
    pub search: String,
    /// Category narrowing.
    pub category: CategoryFilter,
    /// Status narrowing.
    pub status: StatusFilter,
    /// Output order.
    pub sort: SortKey,
}

/// Apply search, category and status filters in that order, keeping input order.
#[must_use]
pub fn filter_tasks<'a>(tasks: &'a [Task], params: &ViewParams, now: OffsetDateTime) -> Vec<&'a Task> {
    let matcher = TextMatcher::new(&params.search);
    tasks
        .iter()
        .filter(|task| matcher.as_ref().is_none_or(|m| m.matches(task)))
        .filter(|task| params.category.matches(task))
        .filter(|task| params.status.matches(task, now))
        .collect()
}

/// Stable sort by `key`; equal keys keep their relative order.
pub fn sort_tasks(tasks: &mut [&Task], key: SortKey) {
    tasks.sort_by(|a, b| key.compare(a, b));
}

/// Filter then sort `tasks` according to `params`.
#[must_use]
pub fn derive_view<'a>(tasks: &'a [Task], params: &ViewParams, now: OffsetDateTime) -> Vec<&'a Task> {
    let mut visible = filter_tasks(tasks, params, now);
    sort_tasks(&mut visible, params.sort);
    visible
}
