//! Storage backends for the task collection.

use std::cell::{Cell, RefCell};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tasknest_core::{ImportRecord, Task};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::transfer::{TransferError, export_tasks, parse_import};

/// Minimal storage abstraction required by [`TaskService`](crate::service::TaskService).
pub trait TaskPersistence {
    /// Error type bubbled up from the backing store.
    type Error: Into<anyhow::Error>;

    /// Load every stored record. Records are validated by the store, so a
    /// backend may hand back entries it could not interpret.
    ///
    /// # Errors
    /// Returns a backend-specific error when the data cannot be read at all.
    fn load(&self) -> Result<Vec<ImportRecord>, Self::Error>;

    /// Replace the stored collection with `tasks`.
    ///
    /// # Errors
    /// Returns a backend-specific error when writing fails.
    fn save(&self, tasks: &[Task]) -> Result<(), Self::Error>;
}

/// Errors raised by [`JsonFileStore`].
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Filesystem access failed.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The file exists but does not hold a readable task document.
    #[error("failed to decode {}: {source}", path.display())]
    Format {
        /// Offending file.
        path: PathBuf,
        /// Decoding error.
        #[source]
        source: TransferError,
    },
}

/// Collection stored as one JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by the file at `path`. Nothing is touched until the first load or save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the data file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn parent_dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }
}

impl TaskPersistence for JsonFileStore {
    type Error = PersistenceError;

    fn load(&self) -> Result<Vec<ImportRecord>, Self::Error> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(self.io_error(err)),
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        parse_import(&contents).map_err(|source| PersistenceError::Format {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, tasks: &[Task]) -> Result<(), Self::Error> {
        let dir = self.parent_dir();
        fs::create_dir_all(dir).map_err(|source| PersistenceError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut body = export_tasks(tasks).map_err(|source| PersistenceError::Format {
            path: self.path.clone(),
            source,
        })?;
        body.push('\n');

        // Write next to the target so the final rename stays on one filesystem.
        let mut tmp = NamedTempFile::new_in(dir).map_err(|err| self.io_error(err))?;
        tmp.write_all(body.as_bytes()).map_err(|err| self.io_error(err))?;
        tmp.as_file().sync_all().map_err(|err| self.io_error(err))?;
        tmp.persist(&self.path).map_err(|err| self.io_error(err.error))?;
        Ok(())
    }
}

/// In-process backend used by tests.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    tasks: RefCell<Vec<Task>>,
    saves: Cell<usize>,
    read_only: bool,
}

impl MemoryPersistence {
    /// Empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-populated with `tasks`.
    pub fn seeded(tasks: Vec<Task>) -> Self {
        Self {
            tasks: RefCell::new(tasks),
            ..Self::default()
        }
    }

    /// Backend that loads `tasks` but refuses every save.
    pub fn read_only(tasks: Vec<Task>) -> Self {
        Self {
            tasks: RefCell::new(tasks),
            saves: Cell::new(0),
            read_only: true,
        }
    }

    /// Last saved collection.
    pub fn stored(&self) -> Vec<Task> {
        self.tasks.borrow().clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl TaskPersistence for MemoryPersistence {
    type Error = PersistenceError;

    fn load(&self) -> Result<Vec<ImportRecord>, Self::Error> {
        Ok(self.tasks.borrow().iter().cloned().map(ImportRecord::from).collect())
    }

    fn save(&self, tasks: &[Task]) -> Result<(), Self::Error> {
        if self.read_only {
            return Err(PersistenceError::Io {
                path: PathBuf::from("<memory>"),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "backend is read-only"),
            });
        }
        *self.tasks.borrow_mut() = tasks.to_vec();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
