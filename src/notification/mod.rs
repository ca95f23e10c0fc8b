//! # Notification Service
//!
//! This module delivers [`ChangeNotification`]s produced by a monitoring run.
//!
//! ## Core Components
//!
//! - **`Notifier` Trait**: the seam between the run and a delivery channel. A
//!   run calls `notify` at most once per detected change and never retries a
//!   failed call.
//! - **`EmailNotifier`**: renders the configured templates and sends a plain
//!   text email over SMTP. Delivery retries are internal to a single call.
//! - **`StdoutNotifier`**: prints the rendered message instead.
//! - **`TemplateService`**: minijinja rendering shared by both notifiers.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{
    config::{AppConfig, Credentials, NotifierKind},
    models::ChangeNotification,
};

pub mod email;
pub mod error;
pub mod stdout;
pub mod template;

pub use email::EmailNotifier;
pub use error::NotifyError;
pub use stdout::StdoutNotifier;
pub use template::{RenderedMessage, TemplateService, TemplateServiceError};

/// Delivers change notifications to the user.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers one notification. Errors are reported to the caller, which
    /// logs them; the transition is not notified again.
    async fn notify(&self, notification: &ChangeNotification) -> Result<(), NotifyError>;
}

/// Builds the notifier selected by `config.notifier`.
///
/// The email notifier requires `credentials`.
pub fn create_notifier(
    config: &AppConfig,
    credentials: Option<&Credentials>,
) -> Result<Box<dyn Notifier>, NotifyError> {
    match config.notifier {
        NotifierKind::Email => {
            let credentials = credentials.ok_or_else(|| {
                NotifyError::ConfigError("email notifier requires mail credentials".into())
            })?;
            Ok(Box::new(EmailNotifier::smtp(&config.smtp, credentials, config.message.clone())?))
        }
        NotifierKind::Stdout => Ok(Box::new(StdoutNotifier::new(config.message.clone()))),
    }
}
