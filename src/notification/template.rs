//! Rendering of notification subjects and bodies with minijinja.

use std::fmt::Write;

use minijinja::{
    Environment, ErrorKind, Output, State, UndefinedBehavior, Value, value::ValueKind,
};
use serde::Serialize;
use thiserror::Error;

use crate::{config::MessageTemplate, models::ChangeNotification};

/// Renders message templates against a notification context.
pub struct TemplateService {
    env: Environment<'static>,
}

/// Failure to turn a template into text.
#[derive(Debug, Error)]
pub enum TemplateServiceError {
    /// The template failed to parse or referenced an undefined variable.
    #[error("Failed to render template: {0}")]
    RenderError(#[from] minijinja::Error),
}

/// A notification rendered to plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    /// Single-line subject.
    pub subject: String,
    /// Plain text body.
    pub body: String,
}

impl Default for TemplateService {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateService {
    /// Creates a service in which undefined variables are errors, so a typo
    /// in a template surfaces on the first notification instead of
    /// producing an empty message.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_formatter(format_value);
        Self { env }
    }

    /// Renders a one-off template source against `context`.
    pub fn render<C: Serialize>(
        &self,
        source: &str,
        context: C,
    ) -> Result<String, TemplateServiceError> {
        self.env.render_str(source, context).map_err(|error| {
            tracing::warn!(template = source, error = %error, "Template rendering failed.");
            TemplateServiceError::from(error)
        })
    }

    /// Renders the subject and body of `notification` with `templates`.
    pub fn render_message(
        &self,
        templates: &MessageTemplate,
        notification: &ChangeNotification,
    ) -> Result<RenderedMessage, TemplateServiceError> {
        let context = notification.template_context();
        let subject = self.render(&templates.subject, &context)?;
        let body = self.render(&templates.body, &context)?;

        // Header folding is the mail library's job, but a newline in a
        // subject would still end up as a broken header.
        let subject = subject.split_whitespace().collect::<Vec<_>>().join(" ");

        Ok(RenderedMessage { subject, body })
    }
}

/// Writes booleans as `true`/`false`; everything else formats as usual.
fn format_value(
    out: &mut Output<'_>,
    state: &State<'_, '_>,
    value: &Value,
) -> Result<(), minijinja::Error> {
    if value.kind() == ValueKind::Bool {
        let text = if value.is_true() { "true" } else { "false" };
        return out.write_str(text).map_err(|e| {
            minijinja::Error::new(ErrorKind::WriteFailure, "failed to write output").with_source(e)
        });
    }
    minijinja::escape_formatter(out, state, value)
}
