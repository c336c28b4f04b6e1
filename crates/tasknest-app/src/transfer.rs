//! JSON document format shared by the data file and export/import.

use serde::Serialize;
use serde_json::Value;
use tasknest_core::{ImportRecord, Task};
use thiserror::Error;

/// Version written into every document.
pub const FORMAT_VERSION: u64 = 1;

/// Failure to decode or encode a task document.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Not valid JSON, or serialization failed.
    #[error("invalid task document: {0}")]
    Json(#[from] serde_json::Error),
    /// Written by a newer (or unknown) format revision.
    #[error("unsupported task document version {0}")]
    UnsupportedVersion(u64),
    /// Valid JSON, but neither a document object nor an array.
    #[error("expected a task document or an array of tasks, found {0}")]
    UnexpectedShape(&'static str),
}

#[derive(Serialize)]
struct Document<'a> {
    version: u64,
    tasks: &'a [Task],
}

/// Render `tasks` as a pretty-printed `{ "version": 1, "tasks": [...] }` document.
///
/// # Errors
/// Returns [`TransferError::Json`] if serialization fails.
pub fn export_tasks(tasks: &[Task]) -> Result<String, TransferError> {
    let document = Document {
        version: FORMAT_VERSION,
        tasks,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Split a JSON payload into per-task records.
///
/// Accepts the document form written by [`export_tasks`] as well as a bare
/// array of task objects, the shape older browser exports used. Elements are
/// not validated here; that happens when the records reach the store.
///
/// # Errors
/// Fails when the payload is not JSON, has an unsupported version or is not
/// shaped like a task list at all.
pub fn parse_import(json: &str) -> Result<Vec<ImportRecord>, TransferError> {
    let value: Value = serde_json::from_str(json)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            if let Some(version) = map.get("version") {
                let version = version
                    .as_u64()
                    .ok_or(TransferError::UnexpectedShape("a non-numeric version"))?;
                if version != FORMAT_VERSION {
                    return Err(TransferError::UnsupportedVersion(version));
                }
            }
            match map.remove("tasks") {
                Some(Value::Array(items)) => items,
                Some(_) => return Err(TransferError::UnexpectedShape("a non-array `tasks` field")),
                None => return Err(TransferError::UnexpectedShape("an object without `tasks`")),
            }
        }
        Value::Null => return Err(TransferError::UnexpectedShape("null")),
        Value::Bool(_) => return Err(TransferError::UnexpectedShape("a boolean")),
        Value::Number(_) => return Err(TransferError::UnexpectedShape("a number")),
        Value::String(_) => return Err(TransferError::UnexpectedShape("a string")),
    };
    Ok(items.into_iter().map(ImportRecord::from_value).collect())
}
