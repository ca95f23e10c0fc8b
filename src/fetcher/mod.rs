//! This module defines how the current state of a target is obtained.
//!
//! A [`Fetcher`] turns a [`MonitoredTarget`] into an [`ObservedState`]. The
//! HTTP implementation downloads the page and hands the body to the pure
//! functions in [`extract`], which can be exercised against saved HTML.

pub mod extract;
mod http;

use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

pub use self::http::{HttpClientError, HttpFetcher};
use crate::models::{MonitoredTarget, ObservedState};

/// Failure to observe one target. Always isolated to that target.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The request did not complete within the configured timeout.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection, DNS or TLS failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("Unexpected HTTP status {status}")]
    HttpStatus {
        /// The numeric HTTP status code.
        status: u16,
    },

    /// The response body could not be read or decoded.
    #[error("Failed to read response body: {0}")]
    Body(String),

    /// The availability element is absent and the target treats that as an
    /// error.
    #[error("No element matches selector '{0}'")]
    ElementNotFound(String),

    /// A selector does not parse as CSS.
    #[error("Invalid CSS selector '{selector}': {reason}")]
    InvalidSelector {
        /// The offending selector.
        selector: String,
        /// Parser message.
        reason: String,
    },

    /// The price element holds no recognisable number.
    #[error("Could not parse a price from '{0}'")]
    InvalidPrice(String),
}

impl FetchError {
    /// Whether a later attempt could plausibly succeed.
    ///
    /// Fetches are never retried within a run; this only informs the report
    /// and the logs so an operator can tell outages from broken selectors.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Timeout(_) | FetchError::Network(_) | FetchError::Body(_) => true,
            FetchError::HttpStatus { status } => *status == 429 || *status >= 500,
            FetchError::ElementNotFound(_)
            | FetchError::InvalidSelector { .. }
            | FetchError::InvalidPrice(_) => false,
        }
    }
}

/// Obtains the current observable state of a target.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches and extracts the state of `target`.
    ///
    /// Calling this repeatedly against an unchanged page yields observations
    /// that compare equal.
    async fn fetch(&self, target: &MonitoredTarget) -> Result<ObservedState, FetchError>;
}
