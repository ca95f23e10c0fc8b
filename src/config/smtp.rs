use std::time::Duration;

use retry_policies::{Jitter, policies::ExponentialBackoff};
use serde::{Deserialize, Serialize};

fn default_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_port() -> u16 {
    587
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_retries() -> u32 {
    2
}

fn default_initial_backoff() -> Duration {
    Duration::from_millis(500)
}

fn default_max_backoff() -> Duration {
    Duration::from_secs(10)
}

fn default_backoff_base() -> u32 {
    2
}

/// Randomisation applied to each retry delay.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JitterSetting {
    /// Wait exactly the computed backoff.
    None,
    /// Wait a random delay between zero and the computed backoff.
    #[default]
    Full,
}

/// How the SMTP connection is secured.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SmtpTls {
    /// Plain connection upgraded with STARTTLS (port 587).
    #[default]
    Starttls,
    /// Implicit TLS from the first byte (port 465).
    Tls,
    /// No encryption. Only meant for local relays and test servers.
    None,
}

/// Retry policy for a single notification delivery within one run.
///
/// Retries never outlive the run: a message that is still undelivered after
/// the last attempt is dropped and reported.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotifyRetryConfig {
    /// Maximum number of retries after the first failed attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Growth factor of the delay between two retries.
    #[serde(rename = "backoff_base", default = "default_backoff_base")]
    pub base: u32,

    /// Delay before the first retry.
    #[serde(
        rename = "initial_backoff_ms",
        default = "default_initial_backoff",
        with = "super::helpers::duration_ms"
    )]
    pub initial_backoff: Duration,

    /// Upper bound for the delay between two attempts.
    #[serde(
        rename = "max_backoff_secs",
        default = "default_max_backoff",
        with = "super::helpers::duration_secs"
    )]
    pub max_backoff: Duration,

    /// Jitter applied to every delay.
    #[serde(default)]
    pub jitter: JitterSetting,
}

impl Default for NotifyRetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base: default_backoff_base(),
            initial_backoff: default_initial_backoff(),
            max_backoff: default_max_backoff(),
            jitter: JitterSetting::default(),
        }
    }
}

impl NotifyRetryConfig {
    /// Builds the exponential backoff policy described by this config.
    ///
    /// The lower bound is at least one millisecond, and `max_backoff` is
    /// raised to it when configured lower.
    pub fn policy(&self) -> ExponentialBackoff {
        let min = self.initial_backoff.max(Duration::from_millis(1));
        let jitter = match self.jitter {
            JitterSetting::None => Jitter::None,
            JitterSetting::Full => Jitter::Full,
        };

        ExponentialBackoff::builder()
            .jitter(jitter)
            .base(self.base)
            .retry_bounds(min, self.max_backoff.max(min))
            .build_with_max_retries(self.max_retries)
    }
}

/// Outgoing mail server settings. Account credentials are not part of this
/// struct; they come from the environment (see `Credentials`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SmtpConfig {
    /// SMTP relay host name.
    #[serde(default = "default_host")]
    pub host: String,

    /// SMTP relay port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Transport security mode.
    #[serde(default)]
    pub tls: SmtpTls,

    /// Timeout for each SMTP command.
    #[serde(
        rename = "timeout_secs",
        default = "default_timeout",
        with = "super::helpers::duration_secs"
    )]
    pub timeout: Duration,

    /// Retry policy for delivering one message.
    #[serde(default)]
    pub retry: NotifyRetryConfig,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            tls: SmtpTls::default(),
            timeout: default_timeout(),
            retry: NotifyRetryConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use retry_policies::{RetryDecision, RetryPolicy};

    use super::*;

    fn retry_delay(policy: &ExponentialBackoff, past_retries: u32) -> Option<Duration> {
        let now = SystemTime::now();
        match policy.should_retry(now, past_retries) {
            RetryDecision::Retry { execute_after } => {
                Some(execute_after.duration_since(now).unwrap_or_default())
            }
            RetryDecision::DoNotRetry => None,
        }
    }

    #[test]
    fn test_policy_stops_after_max_retries() {
        let retry = NotifyRetryConfig { max_retries: 2, ..Default::default() };
        let policy = retry.policy();

        assert!(retry_delay(&policy, 0).is_some());
        assert!(retry_delay(&policy, 1).is_some());
        assert_eq!(retry_delay(&policy, 2), None);
    }

    #[test]
    fn test_policy_delay_is_capped() {
        let retry = NotifyRetryConfig {
            max_retries: 10,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(2),
            jitter: JitterSetting::None,
            ..Default::default()
        };

        let delay = retry_delay(&retry.policy(), 8).unwrap();

        assert!(delay < Duration::from_millis(2100), "delay {delay:?} exceeds the cap");
        assert!(delay >= Duration::from_millis(1500), "delay {delay:?} was not capped upwards");
    }

    #[test]
    fn test_zero_backoff_retries_immediately() {
        let retry = NotifyRetryConfig {
            max_retries: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            jitter: JitterSetting::None,
            ..Default::default()
        };

        assert!(retry_delay(&retry.policy(), 0).unwrap() < Duration::from_millis(50));
    }

    #[test]
    fn test_smtp_config_defaults_from_partial_yaml_values() {
        let config: SmtpConfig =
            serde_json::from_str(r#"{"port": 465, "tls": "tls", "retry": {"max_retries": 0}}"#)
                .unwrap();

        assert_eq!(config.host, "smtp.gmail.com");
        assert_eq!(config.port, 465);
        assert_eq!(config.tls, SmtpTls::Tls);
        assert_eq!(config.retry.max_retries, 0);
        assert_eq!(config.retry.initial_backoff, Duration::from_millis(500));
        assert_eq!(config.retry.jitter, JitterSetting::Full);
    }
}
