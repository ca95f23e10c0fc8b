//! A [`StateStore`] backed by a key/value table in SQLite.

use async_trait::async_trait;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

use super::{codec, error::PersistError, traits::StateStore};
use crate::models::PersistedStatus;

/// The fixed key under which the status blob is stored.
pub const STATUS_KEY: &str = "persisted_status";

/// Stores the status blob as one row of the `application_state` table.
pub struct SqliteStore {
    /// The SQLite connection pool used for database operations.
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connects to the database at `database_url`.
    ///
    /// A single connection is used; a run is the only writer.
    pub async fn new(database_url: &str) -> Result<Self, PersistError> {
        let pool = SqlitePoolOptions::new().max_connections(1).connect(database_url).await?;
        Ok(Self { pool })
    }

    /// Applies the embedded schema migrations.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn run_migrations(&self) -> Result<(), PersistError> {
        sqlx::migrate!("./migrations").run(&self.pool).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run database migrations.");
            e
        })?;
        Ok(())
    }
}

#[async_trait]
impl StateStore for SqliteStore {
    #[tracing::instrument(skip(self), level = "debug")]
    async fn load(&self) -> PersistedStatus {
        let result = sqlx::query_scalar::<_, String>(
            "SELECT value FROM application_state WHERE key = ?",
        )
        .bind(STATUS_KEY)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(Some(raw)) => codec::decode(&raw),
            Ok(None) => {
                tracing::info!("No persisted status found; this run establishes the baseline.");
                PersistedStatus::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted status; treating all targets as unseen.");
                PersistedStatus::new()
            }
        }
    }

    #[tracing::instrument(skip(self, status), level = "debug")]
    async fn save(&self, status: &PersistedStatus) -> Result<(), PersistError> {
        let blob = codec::encode(status)?;

        sqlx::query(
            "INSERT INTO application_state (key, value, updated_at)
             VALUES (?, ?, CURRENT_TIMESTAMP)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(STATUS_KEY)
        .bind(blob)
        .execute(&self.pool)
        .await?;

        tracing::debug!(entries = status.len(), "Persisted status saved.");
        Ok(())
    }
}
