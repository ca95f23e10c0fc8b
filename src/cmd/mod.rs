//! Command implementations behind the `stockwatch` binary.

pub mod check;
pub mod run;
pub mod test_email;

use thiserror::Error;

pub use check::CheckArgs;

use crate::{
    config::ConfigError, fetcher::HttpClientError, models::target::TargetError,
    notification::NotifyError, persistence::PersistError, runner::RunError,
};

/// Errors that abort a command before it produces a result.
#[derive(Debug, Error)]
pub enum CmdError {
    /// Application configuration or credentials are invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The target file could not be loaded.
    #[error("Target loading error: {0}")]
    Targets(#[from] TargetError),

    /// The HTTP client could not be created.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] HttpClientError),

    /// The notifier could not be created or failed to send.
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// The state store could not be opened.
    #[error("State store error: {0}")]
    Persist(#[from] PersistError),

    /// The monitoring run failed.
    #[error("Run error: {0}")]
    Run(#[from] RunError),

    /// `--target` names no configured target.
    #[error("No configured target has id '{0}'")]
    UnknownTarget(String),
}
