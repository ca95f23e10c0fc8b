//! Error types for the notification service.

use thiserror::Error;

use super::template::TemplateServiceError;

/// Defines the possible errors that can occur while delivering a
/// notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// An error related to invalid or missing notifier configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An error related to the template rendering process.
    #[error("Template rendering error: {0}")]
    TemplateError(#[from] TemplateServiceError),

    /// The rendered message could not be assembled into an email.
    #[error("Failed to build message: {0}")]
    MessageError(#[from] lettre::error::Error),

    /// Every delivery attempt failed.
    #[error("Notification failed after {attempts} attempt(s): {reason}")]
    NotifyFailed {
        /// Number of attempts made, including the first.
        attempts: u32,
        /// The error of the last attempt.
        reason: String,
    },

    /// Writing the message to its output failed.
    #[error("Failed to write notification: {0}")]
    Io(#[from] std::io::Error),
}
