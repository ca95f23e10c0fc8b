//! The runner performs one monitoring run.
//!
//! A run is a single pass of load → fetch → diff → notify → save:
//!
//! 1. The last committed [`PersistedStatus`] is loaded from the state store.
//!    Loading fails open, so a missing or corrupt store makes every target
//!    `FirstSeen`.
//! 2. All targets are fetched with a bounded fan-out. Fetch results are only
//!    collected here; nothing is merged while fetches are in flight.
//! 3. Results are merged in target configuration order. A target whose
//!    configured rules match is notified exactly once. Notification failures
//!    are counted but never block the state update (at-most-once delivery).
//! 4. The merged status is saved. A failed save aborts the run.
//!
//! The runner implements no cross-run locking. Two runs against the same
//! store may both see the same stale state and notify twice, so the scheduler
//! must not start overlapping runs.

mod builder;

use std::{collections::HashSet, sync::Arc};

pub use builder::MonitorRunnerBuilder;
use futures::{StreamExt, stream};
use thiserror::Error;

use crate::{
    engine::{Decision, RunReport, diff},
    fetcher::{FetchError, Fetcher},
    models::{ChangeNotification, MonitoredTarget, ObservedState, PersistedStatus},
    notification::Notifier,
    persistence::{PersistError, StateStore},
};

/// Represents the set of errors that abort a run.
#[derive(Debug, Error)]
pub enum RunError {
    /// A fetcher was not provided to the `MonitorRunnerBuilder`.
    #[error("Missing fetcher for MonitorRunner")]
    MissingFetcher,

    /// A notifier was not provided to the `MonitorRunnerBuilder`.
    #[error("Missing notifier for MonitorRunner")]
    MissingNotifier,

    /// A state store was not provided to the `MonitorRunnerBuilder`.
    #[error("Missing state store for MonitorRunner")]
    MissingStateStore,

    /// No targets were provided to the `MonitorRunnerBuilder`.
    #[error("No targets configured for MonitorRunner")]
    MissingTargets,

    /// The fetch concurrency must be at least one.
    #[error("Invalid fetch concurrency: {0}")]
    InvalidConcurrency(usize),

    /// The updated status could not be saved.
    #[error("Failed to save persisted status: {0}")]
    Persist(#[from] PersistError),
}

/// Runs the fetch, diff and notify cycle over a fixed set of targets.
pub struct MonitorRunner {
    targets: Vec<MonitoredTarget>,
    fetcher: Arc<dyn Fetcher>,
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn StateStore>,
    fetch_concurrency: usize,
}

impl MonitorRunner {
    /// Creates a new `MonitorRunnerBuilder`.
    pub fn builder() -> MonitorRunnerBuilder {
        MonitorRunnerBuilder::new()
    }

    /// The configured targets, in configuration order.
    pub fn targets(&self) -> &[MonitoredTarget] {
        &self.targets
    }

    /// Performs one complete run: load, process and save.
    ///
    /// Returns the run report once the new status is durably saved.
    #[tracing::instrument(skip(self), fields(targets = self.targets.len()))]
    pub async fn execute(&self) -> Result<RunReport, RunError> {
        let previous = self.store.load().await;
        tracing::debug!(entries = previous.len(), "Loaded previous status.");

        let (next, report) = self.run_once(previous).await;

        self.store.save(&next).await?;
        tracing::debug!(entries = next.len(), "Saved updated status.");

        Ok(report)
    }

    /// Processes every target against `previous` and returns the status to
    /// persist together with the run report.
    ///
    /// Performs network I/O and notifications but never touches the store.
    pub async fn run_once(&self, previous: PersistedStatus) -> (PersistedStatus, RunReport) {
        let results = self.fetch_all().await;

        let mut status = previous;
        let mut report = RunReport::default();

        for (target, result) in self.targets.iter().zip(results) {
            report.checked += 1;
            let id = target.id();

            let current = match result {
                Ok(current) => current,
                Err(error) => {
                    tracing::warn!(target_id = %id, error = %error, "Failed to fetch target; keeping previous state.");
                    report.fetch_failures.push((id, error));
                    continue;
                }
            };

            match diff(status.get(&id), &current, &target.notify_on) {
                Decision::FirstSeen => {
                    tracing::info!(
                        target_id = %id,
                        available = current.available,
                        status = %current.status,
                        "First observation; recording baseline."
                    );
                    report.first_seen += 1;
                    status.insert(id, current);
                }
                Decision::NoChange => {
                    report.unchanged += 1;
                    let drifted =
                        status.get(&id).is_some_and(|stored| !stored.same_observation(&current));
                    if drifted {
                        tracing::info!(
                            target_id = %id,
                            available = current.available,
                            "State changed without matching a notify rule; recording it."
                        );
                        status.insert(id, current);
                    } else {
                        tracing::debug!(target_id = %id, "No change.");
                    }
                }
                Decision::Changed { matched } => {
                    report.changed += 1;
                    let previous = status.insert(id.clone(), current.clone()).unwrap_or_default();
                    let notification = ChangeNotification {
                        target: target.clone(),
                        previous,
                        current,
                        matched,
                    };
                    tracing::info!(target_id = %id, headline = %notification.headline(), "Change detected.");

                    match self.notifier.notify(&notification).await {
                        Ok(()) => report.notified += 1,
                        Err(e) => {
                            tracing::error!(target_id = %id, error = %e, "Failed to send notification; it will not be retried.");
                            report.notify_failures += 1;
                        }
                    }
                }
            }
        }

        let configured: HashSet<String> = self.targets.iter().map(MonitoredTarget::id).collect();
        let before = status.len();
        status.retain(|id| configured.contains(id));
        if status.len() < before {
            tracing::info!(dropped = before - status.len(), "Dropped status of unconfigured targets.");
        }

        (status, report)
    }

    /// Fetches every target with bounded concurrency. The results are
    /// returned in target configuration order.
    async fn fetch_all(&self) -> Vec<Result<ObservedState, FetchError>> {
        let mut indexed: Vec<(usize, Result<ObservedState, FetchError>)> =
            stream::iter(self.targets.iter().enumerate())
                .map(|(index, target)| async move { (index, self.fetcher.fetch(target).await) })
                .buffer_unordered(self.fetch_concurrency)
                .collect()
                .await;

        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, result)| result).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{
        fetcher::MockFetcher,
        models::ChangeRule,
        notification::{MockNotifier, NotifyError},
        persistence::traits::MockStateStore,
        test_helpers::TargetBuilder,
    };

    fn state(available: bool) -> ObservedState {
        ObservedState::new(available, None, if available { "Found: buy" } else { "sold out" })
    }

    fn runner(
        targets: Vec<MonitoredTarget>,
        fetcher: MockFetcher,
        notifier: MockNotifier,
    ) -> MonitorRunner {
        MonitorRunner::builder()
            .targets(targets)
            .fetcher(Arc::new(fetcher))
            .notifier(Arc::new(notifier))
            .store(Arc::new(MockStateStore::new()))
            .build()
            .unwrap()
    }

    /// A fetcher that returns availability values from `script`, one per
    /// call, for the single target it serves.
    fn scripted_fetcher(script: Vec<bool>) -> MockFetcher {
        let mut script = script.into_iter();
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .returning(move |_| Ok(state(script.next().expect("script exhausted"))));
        fetcher
    }

    #[tokio::test]
    async fn test_sku_123_across_three_runs() {
        let target = TargetBuilder::new("PS5").id("sku-123").build();
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|n| {
                n.target.id() == "sku-123"
                    && !n.previous.available
                    && n.current.available
                    && n.matched == vec![ChangeRule::BecameAvailable]
            })
            .times(1)
            .returning(|_| Ok(()));
        let runner = runner(vec![target], scripted_fetcher(vec![false, true, true]), notifier);

        let (status, report) = runner.run_once(PersistedStatus::new()).await;
        assert_eq!(report.first_seen, 1);
        assert!(!status.get("sku-123").unwrap().available);

        let (status, report) = runner.run_once(status).await;
        assert_eq!(report.changed, 1);
        assert_eq!(report.notified, 1);
        assert!(status.get("sku-123").unwrap().available);

        let stored = status.get("sku-123").unwrap().clone();
        let (status, report) = runner.run_once(status).await;
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.notified, 0);
        // Content is untouched, including the observation time.
        assert_eq!(status.get("sku-123"), Some(&stored));
    }

    #[tokio::test]
    async fn test_fetch_failure_does_not_block_other_targets() {
        let ok = TargetBuilder::new("PS5").id("sku-123").build();
        let broken = TargetBuilder::new("Switch").id("sku-456").build();

        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch().returning(|target| {
            if target.id() == "sku-456" {
                Err(FetchError::Network("connection reset".into()))
            } else {
                Ok(state(true))
            }
        });
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(1).returning(|_| Ok(()));

        let mut previous = PersistedStatus::new();
        previous.insert("sku-123", state(false));
        previous.insert("sku-456", state(false));
        let stale = previous.get("sku-456").unwrap().clone();

        let runner = runner(vec![broken, ok], fetcher, notifier);
        let (status, report) = runner.run_once(previous).await;

        assert_eq!(report.notified, 1);
        assert_eq!(report.fetch_failures.len(), 1);
        assert_eq!(report.fetch_failures[0].0, "sku-456");
        assert!(status.get("sku-123").unwrap().available);
        assert_eq!(status.get("sku-456"), Some(&stale));
        assert_eq!(report.exit_status(), 2);
    }

    #[tokio::test]
    async fn test_notify_failure_still_commits_new_state() {
        let target = TargetBuilder::new("PS5").id("sku-123").build();
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(1).returning(|_| {
            Err(NotifyError::NotifyFailed { attempts: 3, reason: "relay down".into() })
        });

        let mut previous = PersistedStatus::new();
        previous.insert("sku-123", state(false));

        let runner = runner(vec![target], scripted_fetcher(vec![true]), notifier);
        let (status, report) = runner.run_once(previous).await;

        assert_eq!(report.notify_failures, 1);
        assert!(status.get("sku-123").unwrap().available);
    }

    #[tokio::test]
    async fn test_unmatched_difference_is_recorded_silently() {
        // Default rule only reports restocks; selling out is recorded so the
        // next restock is detected.
        let target = TargetBuilder::new("PS5").id("sku-123").build();
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(1).returning(|_| Ok(()));

        let mut previous = PersistedStatus::new();
        previous.insert("sku-123", state(true));

        let runner = runner(vec![target], scripted_fetcher(vec![false, true]), notifier);

        let (status, report) = runner.run_once(previous).await;
        assert_eq!(report.unchanged, 1);
        assert!(!status.get("sku-123").unwrap().available);

        let (_, report) = runner.run_once(status).await;
        assert_eq!(report.notified, 1);
    }

    #[tokio::test]
    async fn test_unconfigured_targets_are_pruned() {
        let target = TargetBuilder::new("PS5").id("sku-123").build();
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();

        let mut previous = PersistedStatus::new();
        previous.insert("sku-123", state(false));
        previous.insert("discontinued", state(true));

        let runner = runner(vec![target], scripted_fetcher(vec![false]), notifier);
        let (status, _) = runner.run_once(previous).await;

        assert_eq!(status.len(), 1);
        assert!(status.get("discontinued").is_none());
    }

    #[tokio::test]
    async fn test_notifications_follow_configuration_order() {
        let targets: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|id| TargetBuilder::new(id).id(id).build())
            .collect();

        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch().returning(|_| Ok(state(true)));

        let order = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&order);
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(3).returning(move |n| {
            seen.lock().unwrap().push(n.target.id());
            Ok(())
        });

        let previous: PersistedStatus =
            ["a", "b", "c"].iter().map(|id| (id.to_string(), state(false))).collect();

        let runner = runner(targets, fetcher, notifier);
        runner.run_once(previous).await;

        assert_eq!(*order.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_execute_saves_after_processing() {
        let target = TargetBuilder::new("PS5").id("sku-123").build();

        let mut store = MockStateStore::new();
        store.expect_load().times(1).returning(PersistedStatus::new);
        store
            .expect_save()
            .withf(|status| status.get("sku-123").is_some_and(|s| !s.available))
            .times(1)
            .returning(|_| Ok(()));

        let runner = MonitorRunner::builder()
            .targets(vec![target])
            .fetcher(Arc::new(scripted_fetcher(vec![false])))
            .notifier(Arc::new(MockNotifier::new()))
            .store(Arc::new(store))
            .build()
            .unwrap();

        let report = runner.execute().await.unwrap();
        assert_eq!(report.first_seen, 1);
    }

    #[tokio::test]
    async fn test_execute_fails_when_save_fails() {
        let target = TargetBuilder::new("PS5").id("sku-123").build();

        let mut store = MockStateStore::new();
        store.expect_load().returning(PersistedStatus::new);
        store
            .expect_save()
            .returning(|_| Err(PersistError::Task("disk full".to_string())));

        let runner = MonitorRunner::builder()
            .targets(vec![target])
            .fetcher(Arc::new(scripted_fetcher(vec![false])))
            .notifier(Arc::new(MockNotifier::new()))
            .store(Arc::new(store))
            .build()
            .unwrap();

        assert!(matches!(runner.execute().await, Err(RunError::Persist(_))));
    }
}
