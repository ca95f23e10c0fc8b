use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File};
use serde::Deserialize;

use super::{ConfigError, HttpClientConfig, SmtpConfig};

/// Default configuration directory, relative to the working directory.
pub const DEFAULT_CONFIG_DIR: &str = "configs";

/// Provides the default value for state_path.
fn default_state_path() -> PathBuf {
    PathBuf::from("status.json")
}

/// Provides the default value for database_url.
fn default_database_url() -> String {
    "sqlite:status.db?mode=rwc".to_string()
}

/// Provides the default value for fetch_concurrency.
fn default_fetch_concurrency() -> usize {
    4
}

/// Where the persisted status blob lives.
#[derive(Default, Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StateBackend {
    /// A JSON file at `state_path`.
    #[default]
    File,
    /// A key/value row in the SQLite database at `database_url`.
    Sqlite,
}

/// Which notifier receives change notifications.
#[derive(Default, Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    /// Send an email through the configured SMTP relay.
    #[default]
    Email,
    /// Print the rendered message to standard output.
    Stdout,
}

/// Subject and body templates for change notifications.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MessageTemplate {
    /// Subject line template.
    pub subject: String,
    /// Plain text body template.
    pub body: String,
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self {
            subject: "{{ target.name }}: {{ headline }}".to_string(),
            body: "\
{{ headline }}

Product: {{ target.name }}
Status: {{ current.status }}
Available: {{ previous.available }} -> {{ current.available }}
{%- if previous.price or current.price %}
Price: {{ previous.price or \"n/a\" }} -> {{ current.price or \"n/a\" }}
{%- endif %}
Matched: {{ matched | join(\", \") }}
URL: {{ target.url }}
Time: {{ observed_at }}

---
Sent by stockwatch
"
            .to_string(),
        }
    }
}

/// Application configuration for stockwatch.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Storage backend for the persisted status.
    #[serde(default)]
    pub state_backend: StateBackend,

    /// Path of the JSON status file when `state_backend` is `file`.
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,

    /// SQLite connection URL when `state_backend` is `sqlite`.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Maximum number of pages fetched at the same time.
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,

    /// Page fetching client settings.
    #[serde(default)]
    pub http: HttpClientConfig,

    /// Outgoing mail server settings.
    #[serde(default)]
    pub smtp: SmtpConfig,

    /// Notifier used for change notifications.
    #[serde(default)]
    pub notifier: NotifierKind,

    /// Notification templates.
    #[serde(default)]
    pub message: MessageTemplate,

    /// Path to the target configuration file.
    #[serde(skip_deserializing)]
    pub targets_config_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            state_backend: StateBackend::default(),
            state_path: default_state_path(),
            database_url: default_database_url(),
            fetch_concurrency: default_fetch_concurrency(),
            http: HttpClientConfig::default(),
            smtp: SmtpConfig::default(),
            notifier: NotifierKind::default(),
            message: MessageTemplate::default(),
            targets_config_path: Path::new(DEFAULT_CONFIG_DIR).join("targets.yaml"),
        }
    }
}

impl AppConfig {
    /// Creates a new `AppConfig` from `<config_dir>/app.yaml` (optional)
    /// overlaid with `STOCKWATCH__*` environment variables.
    pub fn new(config_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let config_dir = config_dir.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_DIR));
        let app_file = config_dir.join("app.yaml");

        let s = Config::builder()
            .add_source(File::with_name(&app_file.to_string_lossy()).required(false))
            .add_source(
                Environment::with_prefix("STOCKWATCH").separator("__").try_parsing(true),
            )
            .build()?;
        let mut config: Self = s.try_deserialize()?;

        config.targets_config_path = config_dir.join("targets.yaml");
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch_concurrency == 0 {
            return Err(ConfigError::Invalid("fetch_concurrency must be at least 1".into()));
        }
        if self.http.timeout.is_zero() {
            return Err(ConfigError::Invalid("http.timeout_secs must be at least 1".into()));
        }
        Ok(())
    }
}
