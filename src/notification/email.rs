//! Email notification implementation.
//!
//! Renders a [`ChangeNotification`] into a plain text message and delivers it
//! through an SMTP relay, retrying failed attempts under an exponential
//! backoff policy. Retries stay within the current run; an undelivered
//! message is reported and dropped.

use std::{fmt::Display, time::SystemTime};

use async_trait::async_trait;
use chrono::Utc;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials as SmtpCredentials,
};
use retry_policies::{RetryDecision, RetryPolicy, policies::ExponentialBackoff};

use super::{
    Notifier,
    error::NotifyError,
    template::{RenderedMessage, TemplateService},
};
use crate::{
    config::{Credentials, MessageTemplate, NotifyRetryConfig, SmtpConfig, SmtpTls},
    models::ChangeNotification,
};

/// The production SMTP transport.
pub type TokioSmtpTransport = AsyncSmtpTransport<Tokio1Executor>;

/// Sends change notifications as plain text email.
pub struct EmailNotifier<T = TokioSmtpTransport> {
    /// Mail transport used for delivery
    transport: T,
    /// Sending mailbox
    from: Mailbox,
    /// Destination mailbox
    to: Mailbox,
    /// Subject and body templates
    templates: MessageTemplate,
    /// Per-message retry policy
    retry_policy: ExponentialBackoff,
    template_service: TemplateService,
}

impl EmailNotifier<TokioSmtpTransport> {
    /// Creates a notifier that talks to the relay described by `config`,
    /// authenticating with `credentials`.
    pub fn smtp(
        config: &SmtpConfig,
        credentials: &Credentials,
        templates: MessageTemplate,
    ) -> Result<Self, NotifyError> {
        let builder = match config.tls {
            SmtpTls::Starttls => TokioSmtpTransport::starttls_relay(&config.host),
            SmtpTls::Tls => TokioSmtpTransport::relay(&config.host),
            SmtpTls::None => Ok(TokioSmtpTransport::builder_dangerous(&config.host)),
        }
        .map_err(|e| NotifyError::ConfigError(format!("Invalid SMTP relay: {e}")))?;

        let transport = builder
            .port(config.port)
            .credentials(SmtpCredentials::new(
                credentials.username.clone(),
                credentials.password.clone(),
            ))
            .timeout(Some(config.timeout))
            .build();

        tracing::debug!(
            host = %config.host,
            port = config.port,
            tls = ?config.tls,
            "SMTP transport configured."
        );

        Ok(Self::with_transport(transport, credentials, templates, config.retry.clone()))
    }
}

impl<T> EmailNotifier<T>
where
    T: AsyncTransport + Send + Sync,
    T::Ok: Send,
    T::Error: Display + Send,
{
    /// Creates a notifier on top of an arbitrary mail transport.
    pub fn with_transport(
        transport: T,
        credentials: &Credentials,
        templates: MessageTemplate,
        retry: NotifyRetryConfig,
    ) -> Self {
        Self {
            transport,
            from: credentials.from.clone(),
            to: credentials.to.clone(),
            templates,
            retry_policy: retry.policy(),
            template_service: TemplateService::new(),
        }
    }

    fn build_email(&self, message: RenderedMessage) -> Result<Message, NotifyError> {
        Ok(Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(message.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.body)?)
    }

    /// Sends `email`, retrying failed attempts while the policy allows it.
    async fn deliver(&self, email: Message) -> Result<(), NotifyError> {
        let started = SystemTime::now();
        let mut past_retries = 0;
        loop {
            let attempt = past_retries + 1;
            let error = match self.transport.send(email.clone()).await {
                Ok(_) => {
                    tracing::debug!(attempt, "Email delivered.");
                    return Ok(());
                }
                Err(e) => e.to_string(),
            };

            match self.retry_policy.should_retry(started, past_retries) {
                RetryDecision::Retry { execute_after } => {
                    let delay =
                        execute_after.duration_since(SystemTime::now()).unwrap_or_default();
                    tracing::warn!(attempt, error = %error, retry_in = ?delay, "Email delivery failed; retrying.");
                    tokio::time::sleep(delay).await;
                    past_retries += 1;
                }
                RetryDecision::DoNotRetry => {
                    return Err(NotifyError::NotifyFailed { attempts: attempt, reason: error });
                }
            }
        }
    }

    /// Sends a fixed message that verifies the relay and credentials work.
    pub async fn send_test_email(&self) -> Result<(), NotifyError> {
        let message = RenderedMessage {
            subject: "stockwatch test email".to_string(),
            body: format!(
                "This is a test email from stockwatch.\n\n\
                 If you can read this, notifications are configured correctly.\n\n\
                 Sent at {}\n",
                Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
            ),
        };
        let email = self.build_email(message)?;

        tracing::info!(to = %self.to, "Sending test email.");
        self.deliver(email).await
    }
}

#[async_trait]
impl<T> Notifier for EmailNotifier<T>
where
    T: AsyncTransport + Send + Sync,
    T::Ok: Send,
    T::Error: Display + Send,
{
    #[tracing::instrument(skip(self, notification), fields(target_id = %notification.target.id()))]
    async fn notify(&self, notification: &ChangeNotification) -> Result<(), NotifyError> {
        let message = self.template_service.render_message(&self.templates, notification)?;
        let subject = message.subject.clone();
        let email = self.build_email(message)?;

        self.deliver(email).await?;

        tracing::info!(subject = %subject, to = %self.to, "Notification email sent.");
        Ok(())
    }
}
