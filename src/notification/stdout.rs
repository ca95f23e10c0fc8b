//! A notifier that prints rendered messages to standard output.

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::{Notifier, error::NotifyError, template::TemplateService};
use crate::{config::MessageTemplate, models::ChangeNotification};

/// Prints each change notification instead of sending it. Used for local
/// runs where no mail account is configured.
pub struct StdoutNotifier {
    templates: MessageTemplate,
    template_service: TemplateService,
}

impl StdoutNotifier {
    /// Creates a new `StdoutNotifier` rendering with `templates`.
    pub fn new(templates: MessageTemplate) -> Self {
        Self { templates, template_service: TemplateService::new() }
    }

    fn format(&self, notification: &ChangeNotification) -> Result<String, NotifyError> {
        let message = self.template_service.render_message(&self.templates, notification)?;
        Ok(format!("Subject: {}\n\n{}\n", message.subject, message.body.trim_end()))
    }
}

#[async_trait]
impl Notifier for StdoutNotifier {
    async fn notify(&self, notification: &ChangeNotification) -> Result<(), NotifyError> {
        let output = self.format(notification)?;

        let mut stdout = tokio::io::stdout();
        stdout.write_all(output.as_bytes()).await?;
        stdout.flush().await?;

        tracing::info!(target_id = %notification.target.id(), "Notification printed to stdout.");
        Ok(())
    }
}
