//! This module contains the error types for the persistence layer.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that prevent the persisted status from being durably committed.
///
/// Any of these is fatal for a run: silently losing state would cause
/// duplicate notifications on the next run.
#[derive(Error, Debug)]
pub enum PersistError {
    /// A filesystem operation on the status file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The status could not be serialized.
    #[error("Failed to serialize status: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A database operation failed.
    #[error("A data store operation failed: {0}")]
    Database(#[from] sqlx::Error),

    /// The database schema could not be brought up to date.
    #[error("Failed to run database migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A blocking write task failed to complete.
    #[error("Background write task failed: {0}")]
    Task(String),
}
