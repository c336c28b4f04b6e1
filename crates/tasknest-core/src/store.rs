//! Authoritative in-memory task collection.

use std::collections::HashSet;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::error::{StoreError, StoreResult, ValidationError};
use crate::id::TaskId;
use crate::import::{ImportRecord, ImportReport, SkippedRecord};
use crate::patch::{DescriptionPatch, DuePatch, TaskDraft, TaskUpdate, normalize_text};
use crate::task::Task;

/// Ordered task collection plus the mutations allowed on it.
///
/// The collection lives behind an [`Arc`]; [`snapshot`](Self::snapshot) hands
/// out the current version and later mutations never touch a snapshot that
/// is still held elsewhere. Every mutation either applies completely or
/// returns an error with the collection unchanged.
#[derive(Debug, Clone)]
pub struct TaskStore<C = SystemClock> {
    tasks: Arc<Vec<Task>>,
    clock: C,
}

impl TaskStore<SystemClock> {
    /// Empty store using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for TaskStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> TaskStore<C> {
    /// Empty store reading time from `clock`.
    #[must_use]
    pub fn with_clock(clock: C) -> Self {
        Self {
            tasks: Arc::new(Vec::new()),
            clock,
        }
    }

    /// Current immutable collection, in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Vec<Task>> {
        Arc::clone(&self.tasks)
    }

    /// Borrow the current collection.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Iterate over tasks in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    /// Look up a task by id.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Number of tasks, archived included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True when the collection holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Clock used to stamp mutations.
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Append a new open, unarchived task.
    ///
    /// # Errors
    /// [`ValidationError::EmptyText`] when the title is blank.
    pub fn create(&mut self, draft: TaskDraft) -> StoreResult<TaskId> {
        let text = normalize_text(&draft.text).ok_or(ValidationError::EmptyText)?;
        let now = self.clock.now();
        let id = self.fresh_id();
        let task = Task {
            id,
            text,
            description: draft.description.as_deref().and_then(normalize_text),
            completed: false,
            category: draft.category,
            priority: draft.priority,
            due_date: draft.due_date,
            tags: draft.tags,
            created_at: now,
            updated_at: now,
            completed_at: None,
            archived: false,
        };
        Arc::make_mut(&mut self.tasks).push(task);
        Ok(id)
    }

    /// Merge `update` into the task and refresh `updated_at`.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] for an unknown id, [`ValidationError::EmptyText`]
    /// when the resulting title would be blank.
    pub fn update(&mut self, id: TaskId, update: TaskUpdate) -> StoreResult<()> {
        let idx = self.position(id)?;
        let now = self.clock.now();
        let mut next = self.tasks[idx].clone();

        if let Some(text) = update.text {
            next.text = normalize_text(&text).ok_or(ValidationError::EmptyText)?;
        }
        match update.description {
            Some(DescriptionPatch::Set(description)) => {
                next.description = normalize_text(&description);
            }
            Some(DescriptionPatch::Clear) => next.description = None,
            None => {}
        }
        match update.due_date {
            Some(DuePatch::Set(due)) => next.due_date = Some(due),
            Some(DuePatch::Clear) => next.due_date = None,
            None => {}
        }
        if let Some(category) = update.category {
            next.category = category;
        }
        if let Some(priority) = update.priority {
            next.priority = priority;
        }
        if let Some(tags) = update.tags {
            next.tags = tags;
        }
        if let Some(archived) = update.archived {
            next.archived = archived;
        }
        if let Some(completed) = update.completed {
            next.set_completed(completed, now);
        }
        next.touch(now);

        Arc::make_mut(&mut self.tasks)[idx] = next;
        Ok(())
    }

    /// Flip the completion flag and return the new value.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] for an unknown id.
    pub fn toggle_complete(&mut self, id: TaskId) -> StoreResult<bool> {
        let idx = self.position(id)?;
        let now = self.clock.now();
        let task = &mut Arc::make_mut(&mut self.tasks)[idx];
        let completed = !task.completed;
        task.set_completed(completed, now);
        task.touch(now);
        Ok(completed)
    }

    /// Flip the archive flag and return the new value.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] for an unknown id.
    pub fn toggle_archive(&mut self, id: TaskId) -> StoreResult<bool> {
        let idx = self.position(id)?;
        let now = self.clock.now();
        let task = &mut Arc::make_mut(&mut self.tasks)[idx];
        task.archived = !task.archived;
        task.touch(now);
        Ok(task.archived)
    }

    /// Remove a task permanently and return it.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] for an unknown id.
    pub fn delete(&mut self, id: TaskId) -> StoreResult<Task> {
        let idx = self.position(id)?;
        Ok(Arc::make_mut(&mut self.tasks).remove(idx))
    }

    /// Remove every completed task, archived or not. Returns how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let removed = self.tasks.iter().filter(|task| task.completed).count();
        if removed > 0 {
            Arc::make_mut(&mut self.tasks).retain(|task| !task.completed);
        }
        removed
    }

    /// Replace the whole collection with the valid subset of `records`.
    ///
    /// Records are validated one by one; invalid ones (blank title, unknown
    /// category or priority, unparsable timestamps, an id already taken by an
    /// earlier record) are skipped and listed in the report instead of
    /// aborting the import. The accepted records then replace the collection
    /// in a single step, keeping their input order.
    pub fn replace_all<I>(&mut self, records: I) -> ImportReport
    where
        I: IntoIterator,
        I::Item: Into<ImportRecord>,
    {
        let now = self.clock.now();
        let mut accepted: Vec<Task> = Vec::new();
        let mut seen = HashSet::new();
        let mut skipped = Vec::new();

        for (index, record) in records.into_iter().enumerate() {
            let outcome = record.into().into_task(now).and_then(|task| {
                if seen.insert(task.id) {
                    Ok(task)
                } else {
                    Err(ValidationError::DuplicateId(task.id))
                }
            });
            match outcome {
                Ok(task) => accepted.push(task),
                Err(reason) => skipped.push(SkippedRecord { index, reason }),
            }
        }

        let imported = accepted.len();
        self.tasks = Arc::new(accepted);
        ImportReport { imported, skipped }
    }

    fn position(&self, id: TaskId) -> StoreResult<usize> {
        self.tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    fn fresh_id(&self) -> TaskId {
        loop {
            let id = TaskId::new();
            if self.get(id).is_none() {
                return id;
            }
        }
    }
}
