//! Completion statistics over the active (non-archived) collection.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::category::Category;
use crate::task::Task;

/// Totals for a single category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    /// Non-archived tasks in the category.
    pub total: usize,
    /// Of those, how many are done.
    pub completed: usize,
}

impl CategoryStats {
    /// Share of completed tasks in percent; 0 when the category is empty.
    #[must_use]
    pub fn completion_percent(&self) -> f64 {
        percent(self.completed, self.total)
    }
}

/// Aggregate counts shown next to the task list.
///
/// Always computed over the whole non-archived collection, independent of
/// whatever search or filter narrows the visible list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    /// Non-archived tasks.
    pub total: usize,
    /// Non-archived tasks that are done.
    pub completed: usize,
    /// `total - completed`.
    pub remaining: usize,
    /// Per-category breakdown; every category is present.
    pub by_category: BTreeMap<Category, CategoryStats>,
}

impl Default for TaskStats {
    fn default() -> Self {
        Self {
            total: 0,
            completed: 0,
            remaining: 0,
            by_category: Category::ALL
                .into_iter()
                .map(|category| (category, CategoryStats::default()))
                .collect(),
        }
    }
}

impl TaskStats {
    /// Aggregate over `tasks`, ignoring archived ones.
    #[must_use]
    pub fn collect<'a, I>(tasks: I) -> Self
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let mut stats = Self::default();
        for task in tasks.into_iter().filter(|task| task.is_active()) {
            stats.total += 1;
            let entry = stats.by_category.entry(task.category).or_default();
            entry.total += 1;
            if task.completed {
                stats.completed += 1;
                entry.completed += 1;
            }
        }
        stats.remaining = stats.total - stats.completed;
        stats
    }

    /// Counts for one category.
    #[must_use]
    pub fn category(&self, category: Category) -> CategoryStats {
        self.by_category.get(&category).copied().unwrap_or_default()
    }

    /// Overall share of completed tasks in percent; 0 when there are none.
    #[must_use]
    pub fn completion_percent(&self) -> f64 {
        percent(self.completed, self.total)
    }
}

/// "Showing X of Y tasks" figures for a derived view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewSummary {
    /// Tasks that survived filtering.
    pub shown: usize,
    /// Size of the whole collection, archived included.
    pub total: usize,
}

#[allow(clippy::cast_precision_loss)]
fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 * 100.0 / whole as f64
}
