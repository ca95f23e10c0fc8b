//! HTTP implementation of the [`Fetcher`] trait.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use super::{FetchError, Fetcher, extract::extract_state};
use crate::{
    config::HttpClientConfig,
    models::{MonitoredTarget, ObservedState},
};

/// Errors that can occur while building the HTTP client.
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// An error occurred while building the underlying `reqwest::Client`.
    #[error("Failed to create HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Downloads product pages and extracts their state.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Creates a fetcher whose requests use the given client settings.
    pub fn new(config: &HttpClientConfig) -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self { client, timeout: config.timeout })
    }

    fn classify(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else if error.is_body() || error.is_decode() {
            FetchError::Body(error.to_string())
        } else {
            FetchError::Network(error.to_string())
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[tracing::instrument(skip(self, target), fields(target_id = %target.id(), url = %target.url))]
    async fn fetch(&self, target: &MonitoredTarget) -> Result<ObservedState, FetchError> {
        tracing::debug!("Fetching page.");

        let response =
            self.client.get(target.url.as_str()).send().await.map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus { status: status.as_u16() });
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        tracing::debug!(bytes = body.len(), "Page downloaded.");

        extract_state(target, &body)
    }
}
