//! Lenient records accepted by [`TaskStore::replace_all`](crate::store::TaskStore::replace_all).
//!
//! Bulk import has to cope with files written by older releases, by hand, or by
//! the browser app this tool replaces: string ids that are not UUIDs, missing
//! priorities, date-only deadlines. Every record is decoded on its own so one
//! bad entry never spoils the rest of the file.

use serde::Deserialize;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

use crate::category::{Category, Priority};
use crate::error::ValidationError;
use crate::id::TaskId;
use crate::patch::normalize_text;
use crate::task::Task;

/// One incoming record, not yet validated.
#[derive(Debug, Clone)]
pub struct ImportRecord {
    source: Source,
}

#[derive(Debug, Clone)]
enum Source {
    Task(Task),
    Raw(RawRecord),
    Malformed(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    completed: Option<bool>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    due_date: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    completed_at: Option<String>,
    #[serde(default)]
    archived: Option<bool>,
}

impl ImportRecord {
    /// Decode a JSON value. Values that are not task-shaped still produce a
    /// record; it is rejected with [`ValidationError::Malformed`] on import.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        let source = if value.is_object() {
            match serde_json::from_value::<RawRecord>(value) {
                Ok(raw) => Source::Raw(raw),
                Err(err) => Source::Malformed(err.to_string()),
            }
        } else {
            Source::Malformed(format!("expected an object, found {}", json_kind(&value)))
        };
        Self { source }
    }

    /// Validate and normalize into a [`Task`].
    ///
    /// Missing timestamps default to `now`, a missing or non-UUID id is
    /// replaced by a fresh one, missing category/priority take their defaults
    /// and `completed_at` is made consistent with `completed`.
    ///
    /// # Errors
    /// Returns the first validation failure found in the record.
    pub fn into_task(self, now: OffsetDateTime) -> Result<Task, ValidationError> {
        match self.source {
            Source::Task(task) => normalize_task(task),
            Source::Raw(raw) => raw.into_task(now),
            Source::Malformed(reason) => Err(ValidationError::Malformed(reason)),
        }
    }
}

impl From<Task> for ImportRecord {
    fn from(task: Task) -> Self {
        Self {
            source: Source::Task(task),
        }
    }
}

impl From<Value> for ImportRecord {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl RawRecord {
    fn into_task(self, now: OffsetDateTime) -> Result<Task, ValidationError> {
        let text = self
            .text
            .as_deref()
            .and_then(normalize_text)
            .ok_or(ValidationError::EmptyText)?;
        let category = match self.category {
            Some(raw) => raw
                .parse::<Category>()
                .map_err(|_| ValidationError::UnknownCategory(raw))?,
            None => Category::default(),
        };
        let priority = match self.priority {
            Some(raw) => raw
                .parse::<Priority>()
                .map_err(|_| ValidationError::UnknownPriority(raw))?,
            None => Priority::default(),
        };

        let created_at = timestamp_field("createdAt", self.created_at.as_deref())?.unwrap_or(now);
        let updated_at = timestamp_field("updatedAt", self.updated_at.as_deref())?
            .unwrap_or(created_at)
            .max(created_at);
        let due_date = timestamp_field("dueDate", self.due_date.as_deref())?;
        let completed = self.completed.unwrap_or(false);
        let completed_at = if completed {
            Some(timestamp_field("completedAt", self.completed_at.as_deref())?.unwrap_or(updated_at))
        } else {
            None
        };

        let id = self
            .id
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|raw| raw.parse::<TaskId>().ok())
            .unwrap_or_else(TaskId::new);

        Ok(Task {
            id,
            text,
            description: self.description.as_deref().and_then(normalize_text),
            completed,
            category,
            priority,
            due_date,
            tags: self.tags.unwrap_or_default(),
            created_at,
            updated_at,
            completed_at,
            archived: self.archived.unwrap_or(false),
        })
    }
}

fn normalize_task(mut task: Task) -> Result<Task, ValidationError> {
    task.text = normalize_text(&task.text).ok_or(ValidationError::EmptyText)?;
    task.description = task.description.as_deref().and_then(normalize_text);
    task.updated_at = task.updated_at.max(task.created_at);
    task.completed_at = if task.completed {
        Some(task.completed_at.unwrap_or(task.updated_at))
    } else {
        None
    };
    Ok(task)
}

fn timestamp_field(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<OffsetDateTime>, ValidationError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_instant(raw)
        .map(Some)
        .ok_or_else(|| ValidationError::InvalidTimestamp {
            field,
            value: raw.to_owned(),
        })
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC),
/// normalized to UTC.
#[must_use]
pub fn parse_instant(raw: &str) -> Option<OffsetDateTime> {
    let trimmed = raw.trim();
    if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Some(parsed.to_offset(UtcOffset::UTC));
    }
    Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_utc())
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A record dropped during import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Zero-based position in the input.
    pub index: usize,
    /// Why it was rejected.
    pub reason: ValidationError,
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Number of records now in the collection.
    pub imported: usize,
    /// Records that failed validation, in input order.
    pub skipped: Vec<SkippedRecord>,
}

impl ImportReport {
    /// True when every record was accepted.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}
