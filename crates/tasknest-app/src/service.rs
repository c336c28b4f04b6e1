//! Task service: store mutations kept in step with persistence.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use serde::Serialize;
use tasknest_core::{
    CategoryFilter, Clock, ImportReport, StatusFilter, SystemClock, Task, TaskDraft, TaskId, TaskStats,
    TaskStore, TaskUpdate, ViewParams, ViewSummary, derive_view,
};
use tracing::{debug, info, warn};

use crate::persistence::TaskPersistence;
use crate::transfer::{export_tasks, parse_import};

/// Service façade that keeps the store and its backing storage in step.
///
/// Every mutation is saved before it returns. When saving fails the store is
/// rolled back to the previous collection and the error is returned.
pub struct TaskService<P, C = SystemClock> {
    store: TaskStore<C>,
    persistence: P,
}

/// Result of [`TaskService::view`].
#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    /// Filtered and sorted tasks.
    pub tasks: Vec<Task>,
    /// Statistics over the whole non-archived collection.
    pub stats: TaskStats,
    /// "Showing X of Y" counts.
    pub summary: ViewSummary,
}

impl TaskView {
    /// Message to show instead of an empty list, or `None` when tasks are visible.
    pub fn empty_message(&self, params: &ViewParams) -> Option<String> {
        if !self.tasks.is_empty() {
            return None;
        }
        let message = if !params.search.is_empty() {
            "No tasks found matching your search".to_owned()
        } else if params.status != StatusFilter::All {
            format!("No {} tasks found", params.status)
        } else if let CategoryFilter::Only(category) = params.category {
            format!("No tasks in {} category", category.label())
        } else {
            "No tasks added yet".to_owned()
        };
        Some(message)
    }
}

impl<P: TaskPersistence> TaskService<P, SystemClock> {
    /// Load the stored collection using the system clock.
    ///
    /// # Errors
    /// Returns an error when the backend cannot be read.
    pub fn open(persistence: P) -> Result<Self> {
        Self::open_with_clock(persistence, SystemClock)
    }
}

impl<P: TaskPersistence, C: Clock> TaskService<P, C> {
    /// Load the stored collection.
    ///
    /// # Errors
    /// Returns an error when the backend cannot be read or holds a record
    /// that fails validation. The stored data is left untouched in that case.
    pub fn open_with_clock(persistence: P, clock: C) -> Result<Self> {
        let records = persistence
            .load()
            .map_err(Into::<anyhow::Error>::into)
            .context("failed to load tasks")?;
        let mut store = TaskStore::with_clock(clock);
        let report = store.replace_all(records);
        if let Some(first) = report.skipped.first() {
            log_skipped(&report);
            bail!(
                "failed to load tasks: {} invalid record(s), first at index {}: {}",
                report.skipped.len(),
                first.index,
                first.reason
            );
        }
        debug!(tasks = report.imported, "loaded task collection");
        Ok(Self { store, persistence })
    }

    /// Underlying store.
    pub const fn store(&self) -> &TaskStore<C> {
        &self.store
    }

    /// Backing storage.
    pub const fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Current immutable collection.
    pub fn snapshot(&self) -> Arc<Vec<Task>> {
        self.store.snapshot()
    }

    /// Look up a task by id.
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.store.get(id)
    }

    /// Resolve a full id or a unique id prefix (as printed by listings).
    ///
    /// # Errors
    /// Fails when nothing matches or the prefix is ambiguous.
    pub fn resolve(&self, reference: &str) -> Result<TaskId> {
        let needle = reference.trim().to_ascii_lowercase();
        if let Ok(id) = needle.parse::<TaskId>() {
            if self.store.get(id).is_some() {
                return Ok(id);
            }
            bail!("task not found: {id}");
        }
        let compact = needle.replace('-', "");
        if compact.is_empty() {
            bail!("task id must not be empty");
        }
        let mut matches = self
            .store
            .tasks()
            .iter()
            .filter(|task| task.id.0.simple().to_string().starts_with(&compact));
        let first = matches.next().ok_or_else(|| anyhow!("task not found: {reference}"))?;
        if matches.next().is_some() {
            bail!("task id prefix '{reference}' is ambiguous");
        }
        Ok(first.id)
    }

    /// Create a task and save.
    ///
    /// # Errors
    /// Returns an error if validation or saving fails.
    pub fn create(&mut self, draft: TaskDraft) -> Result<TaskId> {
        let before = self.store.snapshot();
        let id = self.store.create(draft)?;
        self.commit(before)?;
        info!(task = %id, "created task");
        Ok(id)
    }

    /// Apply a partial update and save.
    ///
    /// # Errors
    /// Returns an error if the task is unknown, validation fails or saving fails.
    pub fn update(&mut self, id: TaskId, update: TaskUpdate) -> Result<()> {
        let before = self.store.snapshot();
        self.store.update(id, update)?;
        self.commit(before)?;
        info!(task = %id, "updated task");
        Ok(())
    }

    /// Flip completion and save. Returns the new state.
    ///
    /// # Errors
    /// Returns an error if the task is unknown or saving fails.
    pub fn toggle_complete(&mut self, id: TaskId) -> Result<bool> {
        let before = self.store.snapshot();
        let completed = self.store.toggle_complete(id)?;
        self.commit(before)?;
        info!(task = %id, completed, "toggled completion");
        Ok(completed)
    }

    /// Flip the archive flag and save. Returns the new state.
    ///
    /// # Errors
    /// Returns an error if the task is unknown or saving fails.
    pub fn toggle_archive(&mut self, id: TaskId) -> Result<bool> {
        let before = self.store.snapshot();
        let archived = self.store.toggle_archive(id)?;
        self.commit(before)?;
        info!(task = %id, archived, "toggled archive");
        Ok(archived)
    }

    /// Delete a task and save.
    ///
    /// # Errors
    /// Returns an error if the task is unknown or saving fails.
    pub fn delete(&mut self, id: TaskId) -> Result<Task> {
        let before = self.store.snapshot();
        let removed = self.store.delete(id)?;
        self.commit(before)?;
        info!(task = %id, "deleted task");
        Ok(removed)
    }

    /// Remove all completed tasks and save. Returns how many were removed.
    ///
    /// # Errors
    /// Returns an error if saving fails.
    pub fn clear_completed(&mut self) -> Result<usize> {
        let before = self.store.snapshot();
        let removed = self.store.clear_completed();
        if removed > 0 {
            self.commit(before)?;
        }
        info!(removed, "cleared completed tasks");
        Ok(removed)
    }

    /// Replace the collection with the tasks in `json` and save.
    ///
    /// # Errors
    /// Returns an error if the payload is not a task list or saving fails.
    /// Individual invalid records are skipped and reported instead.
    pub fn import_json(&mut self, json: &str) -> Result<ImportReport> {
        let records = parse_import(json).context("failed to parse import")?;
        let before = self.store.snapshot();
        let report = self.store.replace_all(records);
        self.commit(before)?;
        log_skipped(&report);
        info!(imported = report.imported, skipped = report.skipped.len(), "imported tasks");
        Ok(report)
    }

    /// Render the whole collection as an export document.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn export_json(&self) -> Result<String> {
        export_tasks(self.store.tasks()).context("failed to export tasks")
    }

    /// Derive the visible list plus statistics for `params`.
    pub fn view(&self, params: &ViewParams) -> TaskView {
        let now = self.store.clock().now();
        let tasks = self.store.tasks();
        let visible: Vec<Task> = derive_view(tasks, params, now).into_iter().cloned().collect();
        let summary = ViewSummary {
            shown: visible.len(),
            total: tasks.len(),
        };
        debug!(
            shown = summary.shown,
            total = summary.total,
            sort = %params.sort,
            status = %params.status,
            "derived view"
        );
        TaskView {
            tasks: visible,
            stats: TaskStats::collect(tasks),
            summary,
        }
    }

    fn commit(&mut self, before: Arc<Vec<Task>>) -> Result<()> {
        let saved = self
            .persistence
            .save(self.store.tasks())
            .map_err(Into::<anyhow::Error>::into)
            .context("failed to save tasks");
        if saved.is_err() {
            self.store.replace_all(before.iter().cloned());
        }
        saved
    }
}

fn log_skipped(report: &ImportReport) {
    for skipped in &report.skipped {
        warn!(index = skipped.index, reason = %skipped.reason, "skipped invalid task record");
    }
}
