//! This module provides the `MonitorRunnerBuilder` for constructing a
//! `MonitorRunner`.

use std::sync::Arc;

use super::{MonitorRunner, RunError};
use crate::{
    fetcher::Fetcher, models::MonitoredTarget, notification::Notifier, persistence::StateStore,
};

const DEFAULT_FETCH_CONCURRENCY: usize = 4;

/// A builder for creating a `MonitorRunner` instance.
#[derive(Default)]
pub struct MonitorRunnerBuilder {
    targets: Option<Vec<MonitoredTarget>>,
    fetcher: Option<Arc<dyn Fetcher>>,
    notifier: Option<Arc<dyn Notifier>>,
    store: Option<Arc<dyn StateStore>>,
    fetch_concurrency: Option<usize>,
}

impl MonitorRunnerBuilder {
    /// Creates a new, empty `MonitorRunnerBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the targets to monitor, in configuration order.
    pub fn targets(mut self, targets: Vec<MonitoredTarget>) -> Self {
        self.targets = Some(targets);
        self
    }

    /// Sets the fetcher used to observe targets.
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Sets the notifier that receives change notifications.
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Sets the store holding the persisted status.
    pub fn store(mut self, store: Arc<dyn StateStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the maximum number of concurrent fetches. Defaults to 4.
    pub fn fetch_concurrency(mut self, fetch_concurrency: usize) -> Self {
        self.fetch_concurrency = Some(fetch_concurrency);
        self
    }

    /// Validates the provided components and builds the `MonitorRunner`.
    pub fn build(self) -> Result<MonitorRunner, RunError> {
        let targets = self.targets.filter(|t| !t.is_empty()).ok_or(RunError::MissingTargets)?;
        let fetcher = self.fetcher.ok_or(RunError::MissingFetcher)?;
        let notifier = self.notifier.ok_or(RunError::MissingNotifier)?;
        let store = self.store.ok_or(RunError::MissingStateStore)?;
        let fetch_concurrency = self.fetch_concurrency.unwrap_or(DEFAULT_FETCH_CONCURRENCY);
        if fetch_concurrency == 0 {
            return Err(RunError::InvalidConcurrency(fetch_concurrency));
        }

        tracing::debug!(targets = targets.len(), fetch_concurrency, "Monitor runner assembled.");

        Ok(MonitorRunner { targets, fetcher, notifier, store, fetch_concurrency })
    }
}
