use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;

use crate::{
    models::PersistedStatus,
    persistence::{PersistError, StateStore},
};

/// A `StateStore` kept in memory that counts saves.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    status: Mutex<PersistedStatus>,
    saves: AtomicUsize,
}

impl InMemoryStore {
    /// Creates a store pre-filled with `status`.
    pub fn with_status(status: PersistedStatus) -> Self {
        Self { status: Mutex::new(status), saves: AtomicUsize::new(0) }
    }

    /// Returns a copy of the stored status.
    pub fn snapshot(&self) -> PersistedStatus {
        self.status.lock().unwrap().clone()
    }

    /// Number of successful saves.
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StateStore for InMemoryStore {
    async fn load(&self) -> PersistedStatus {
        self.snapshot()
    }

    async fn save(&self, status: &PersistedStatus) -> Result<(), PersistError> {
        *self.status.lock().unwrap() = status.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
