use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Browser-like user agent; several retailers reject the default reqwest one.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                                      AppleWebKit/537.36 (KHTML, like Gecko) \
                                      Chrome/124.0.0.0 Safari/537.36";

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

/// Configuration for the HTTP client used to fetch product pages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// The `User-Agent` header sent with every page request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Total time allowed for a single page request, body included.
    #[serde(
        rename = "timeout_secs",
        default = "default_timeout",
        with = "super::helpers::duration_secs"
    )]
    pub timeout: Duration,

    /// Time allowed to establish the TCP/TLS connection.
    #[serde(
        rename = "connect_timeout_secs",
        default = "default_connect_timeout",
        with = "super::helpers::duration_secs"
    )]
    pub connect_timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}
