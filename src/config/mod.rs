//! Configuration module for stockwatch.

mod app_config;
mod credentials;
mod error;
mod helpers;
mod http;
mod smtp;

pub use app_config::{AppConfig, DEFAULT_CONFIG_DIR, MessageTemplate, NotifierKind, StateBackend};
pub use credentials::{Credentials, EMAIL_ADDRESS_VAR, EMAIL_PASSWORD_VAR, TO_EMAIL_VAR};
pub use error::ConfigError;
pub use http::{DEFAULT_USER_AGENT, HttpClientConfig};
pub use smtp::{JitterSetting, NotifyRetryConfig, SmtpConfig, SmtpTls};
