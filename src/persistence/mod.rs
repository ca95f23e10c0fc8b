//! This module contains the status persistence logic for stockwatch.

pub mod codec;
pub mod error;
pub mod json_file;
pub mod sqlite;
pub mod traits;

pub use error::PersistError;
pub use json_file::JsonFileStore;
pub use sqlite::SqliteStore;
pub use traits::StateStore;

use crate::config::{AppConfig, StateBackend};

/// Opens the state store selected by `config.state_backend`.
pub async fn create_store(config: &AppConfig) -> Result<Box<dyn StateStore>, PersistError> {
    match config.state_backend {
        StateBackend::File => {
            tracing::debug!(path = %config.state_path.display(), "Using JSON file state store.");
            Ok(Box::new(JsonFileStore::new(&config.state_path)))
        }
        StateBackend::Sqlite => {
            tracing::debug!(database_url = %config.database_url, "Using SQLite state store.");
            let store = SqliteStore::new(&config.database_url).await?;
            store.run_migrations().await?;
            Ok(Box::new(store))
        }
    }
}
