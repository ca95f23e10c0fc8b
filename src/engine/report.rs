//! The outcome of one monitoring run.

use std::process::ExitCode;

use crate::fetcher::FetchError;

/// Counters and failures collected during a run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunReport {
    /// Targets processed.
    pub checked: usize,
    /// Targets observed for the first time.
    pub first_seen: usize,
    /// Targets whose fresh state matched no configured rule.
    pub unchanged: usize,
    /// Targets with a reportable transition.
    pub changed: usize,
    /// Notifications delivered.
    pub notified: usize,
    /// Notifications that failed to deliver.
    pub notify_failures: usize,
    /// Targets that could not be fetched, with the reason.
    pub fetch_failures: Vec<(String, FetchError)>,
}

impl RunReport {
    /// Returns `true` when a fetch or a notification failed.
    pub fn has_failures(&self) -> bool {
        !self.fetch_failures.is_empty() || self.notify_failures > 0
    }

    /// Process exit status for a run whose state was saved: `0` when
    /// everything succeeded, `2` when some targets or notifications failed.
    pub fn exit_status(&self) -> u8 {
        if self.has_failures() { 2 } else { 0 }
    }

    /// [`RunReport::exit_status`] as a process exit code.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }

    /// Logs the summary line of the run.
    pub fn log_summary(&self) {
        for (id, error) in &self.fetch_failures {
            tracing::warn!(target_id = %id, error = %error, retryable = error.is_retryable(), "Target failed.");
        }

        if self.has_failures() {
            tracing::warn!(
                checked = self.checked,
                first_seen = self.first_seen,
                unchanged = self.unchanged,
                changed = self.changed,
                notified = self.notified,
                notify_failures = self.notify_failures,
                fetch_failures = self.fetch_failures.len(),
                "Run completed with failures."
            );
        } else {
            tracing::info!(
                checked = self.checked,
                first_seen = self.first_seen,
                unchanged = self.unchanged,
                changed = self.changed,
                notified = self.notified,
                "Run completed."
            );
        }
    }
}
