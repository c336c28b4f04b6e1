//! Task model, store and view engine for tasknest.
//!
//! [`TaskStore`] owns the task collection and applies every mutation under
//! its invariants. The view engine ([`derive_view`], [`TaskStats`]) is a set
//! of pure functions over a borrowed slice of tasks.

/// Category and priority enums.
pub mod category;
/// Time source abstraction.
pub mod clock;
/// Store error types.
pub mod error;
/// Identifier types.
pub mod id;
/// Normalization of externally supplied task records.
pub mod import;
/// Drafts and partial updates.
pub mod patch;
/// Completion statistics.
pub mod stats;
/// The task store.
pub mod store;
/// The task record.
pub mod task;
/// Free-text search.
pub mod text_matcher;
/// Filtering and sorting.
pub mod view;

pub use category::{Category, Priority};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ErrorKind, StoreError, StoreResult, ValidationError};
pub use id::TaskId;
pub use import::{ImportRecord, ImportReport, SkippedRecord};
pub use patch::{DescriptionPatch, DuePatch, TaskDraft, TaskUpdate, parse_tags};
pub use stats::{CategoryStats, TaskStats, ViewSummary};
pub use store::TaskStore;
pub use task::Task;
pub use view::{CategoryFilter, SortKey, StatusFilter, ViewParams, derive_view, filter_tasks, sort_tasks};
