//! This module defines the state store interface.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::error::PersistError;
use crate::models::PersistedStatus;

/// Durable storage for the [`PersistedStatus`] of all targets.
///
/// Backends store one opaque blob under a fixed identifier. Concurrent
/// writers are not supported; at most one run may use a store at a time.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Loads the last committed status.
    ///
    /// Never fails: missing or corrupt storage is logged and yields an empty
    /// status, so every target is treated as never observed.
    async fn load(&self) -> PersistedStatus;

    /// Durably replaces the stored status with `status`.
    async fn save(&self, status: &PersistedStatus) -> Result<(), PersistError>;
}
