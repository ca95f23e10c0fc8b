//! A [`StateStore`] backed by a single JSON file.

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tempfile::NamedTempFile;

use super::{codec, error::PersistError, traits::StateStore};
use crate::models::PersistedStatus;

/// Stores the status blob in one JSON file, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store for the file at `path`. The file need not exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The status file location.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Writes `contents` next to `path`, fsyncs, then renames over `path`.
fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), PersistError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let io_err = |source: io::Error| PersistError::Io { path: path.to_path_buf(), source };

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|source| PersistError::Io { path: dir.to_path_buf(), source })?;
    tmp.write_all(contents).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    Ok(())
}

#[async_trait]
impl StateStore for JsonFileStore {
    #[tracing::instrument(skip(self), fields(path = %self.path.display()), level = "debug")]
    async fn load(&self) -> PersistedStatus {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => {
                let status = codec::decode(&raw);
                tracing::debug!(entries = status.len(), "Loaded persisted status.");
                status
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!("No persisted status found; this run establishes the baseline.");
                PersistedStatus::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted status; treating all targets as unseen.");
                PersistedStatus::new()
            }
        }
    }

    #[tracing::instrument(skip(self, status), fields(path = %self.path.display()), level = "debug")]
    async fn save(&self, status: &PersistedStatus) -> Result<(), PersistError> {
        let blob = codec::encode(status)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomically(&path, blob.as_bytes()))
            .await
            .map_err(|e| PersistError::Task(e.to_string()))??;

        tracing::debug!(entries = status.len(), "Persisted status saved.");
        Ok(())
    }
}
