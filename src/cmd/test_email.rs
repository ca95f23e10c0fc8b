//! The `test-email` command: verify SMTP settings and credentials.

use std::path::Path;

use super::CmdError;
use crate::{
    config::{AppConfig, Credentials},
    notification::EmailNotifier,
};

/// Sends a single test message to the configured destination address.
pub async fn execute(config_dir: &Path) -> Result<(), CmdError> {
    let config = AppConfig::new(Some(config_dir))?;
    let credentials = Credentials::from_env()?;
    tracing::debug!(?credentials, host = %config.smtp.host, port = config.smtp.port, "Using SMTP relay.");

    let notifier = EmailNotifier::smtp(&config.smtp, &credentials, config.message.clone())?;
    notifier.send_test_email().await?;

    tracing::info!(to = %credentials.to, "Test email sent successfully.");
    Ok(())
}
