//! Application layer for tasknest.
//!
//! Wires the core [`TaskStore`](tasknest_core::TaskStore) to on-disk
//! persistence, configuration and JSON import/export, and exposes the result
//! through [`TaskService`].

pub mod config;
pub mod persistence;
pub mod service;
pub mod transfer;

// Re-exports for convenience
pub use config::{AppConfig, DefaultsConfig};
pub use persistence::{JsonFileStore, MemoryPersistence, PersistenceError, TaskPersistence};
pub use service::{TaskService, TaskView};
pub use transfer::{FORMAT_VERSION, TransferError, export_tasks, parse_import};
