//! This module defines the configuration of a monitored target.

use std::{collections::HashSet, path::Path};

use scraper::Selector;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use super::change_rule::{ChangeRule, default_notify_on};
use crate::loader::{Loadable, LoaderError, load_config};

/// What the absence of the availability element on a page means.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MissingElementPolicy {
    /// The product is reported as unavailable. Retailers commonly drop the
    /// buy button entirely when out of stock.
    #[default]
    Unavailable,
    /// The fetch fails with `FetchError::ElementNotFound`.
    Error,
}

/// A single monitored product page. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonitoredTarget {
    /// Optional explicit stable key. See [`MonitoredTarget::id`].
    #[serde(default, rename = "id", skip_serializing_if = "Option::is_none")]
    pub explicit_id: Option<String>,

    /// Human readable product name.
    pub name: String,

    /// Page to fetch, exactly as configured. It is part of the default id,
    /// so it is kept unnormalised.
    pub url: String,

    /// CSS selector of the element whose text decides availability.
    pub selector: String,

    /// Case-insensitive substrings that mark the product as available.
    pub keywords: Vec<String>,

    /// Optional CSS selector of the element holding the price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_selector: Option<String>,

    /// Transitions that trigger a notification; any match is enough.
    #[serde(default = "default_notify_on")]
    pub notify_on: Vec<ChangeRule>,

    /// How a missing availability element is interpreted.
    #[serde(default)]
    pub missing_element: MissingElementPolicy,
}

impl MonitoredTarget {
    /// The stable key of this target in the persisted status.
    ///
    /// Defaults to `"{name}-{url}"` when no explicit id is configured.
    pub fn id(&self) -> String {
        match &self.explicit_id {
            Some(id) => id.clone(),
            None => format!("{}-{}", self.name, self.url),
        }
    }

    /// Checks the target for configuration errors.
    pub fn validate(&self) -> Result<(), TargetValidationError> {
        if self.explicit_id.as_deref().is_some_and(|id| id.trim().is_empty()) {
            return Err(TargetValidationError::EmptyId);
        }
        if self.name.trim().is_empty() {
            return Err(TargetValidationError::EmptyName);
        }
        let url = Url::parse(&self.url).map_err(|e| TargetValidationError::InvalidUrl {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(TargetValidationError::UnsupportedScheme(url.scheme().to_string()));
        }
        if self.keywords.is_empty() || self.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(TargetValidationError::EmptyKeywords);
        }
        if self.notify_on.is_empty() {
            return Err(TargetValidationError::EmptyNotifyOn);
        }
        validate_selector(&self.selector)?;
        if let Some(price_selector) = &self.price_selector {
            validate_selector(price_selector)?;
        }
        Ok(())
    }
}

fn validate_selector(selector: &str) -> Result<(), TargetValidationError> {
    Selector::parse(selector).map(|_| ()).map_err(|e| TargetValidationError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Error types for target validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TargetValidationError {
    /// An explicit id was configured but is blank.
    #[error("Target id cannot be blank.")]
    EmptyId,

    /// The target has no name.
    #[error("Target name cannot be empty.")]
    EmptyName,

    /// The URL does not parse.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The configured URL.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// The URL is not http(s).
    #[error("Unsupported URL scheme '{0}': only http and https are supported.")]
    UnsupportedScheme(String),

    /// No usable availability keyword.
    #[error("Target needs at least one non-blank keyword.")]
    EmptyKeywords,

    /// `notify_on` was configured as an empty list.
    #[error("notify_on cannot be empty.")]
    EmptyNotifyOn,

    /// A selector does not parse as CSS.
    #[error("Invalid CSS selector '{selector}': {reason}")]
    InvalidSelector {
        /// The offending selector.
        selector: String,
        /// Parser message.
        reason: String,
    },
}

/// Errors that can occur while loading the target list.
#[derive(Debug, Error)]
pub enum TargetError {
    /// An error occurred during the loading process.
    #[error("Failed to load target configuration: {0}")]
    Loader(#[from] LoaderError),

    /// A target failed validation.
    #[error("Target '{name}' is invalid: {source}")]
    Validation {
        /// Name of the invalid target.
        name: String,
        /// What is wrong with it.
        #[source]
        source: TargetValidationError,
    },

    /// Two targets resolve to the same id.
    #[error("Duplicate target id '{0}'")]
    DuplicateId(String),

    /// The file declares no targets.
    #[error("No targets configured")]
    Empty,
}

impl Loadable for MonitoredTarget {
    type Error = TargetError;

    const KEY: &'static str = "targets";

    fn validate(&mut self) -> Result<(), Self::Error> {
        MonitoredTarget::validate(self)
            .map_err(|source| TargetError::Validation { name: self.name.clone(), source })
    }
}

/// Loads and validates the target list, rejecting duplicate ids.
pub fn load_targets(path: &Path) -> Result<Vec<MonitoredTarget>, TargetError> {
    let targets: Vec<MonitoredTarget> = load_config(path)?;

    if targets.is_empty() {
        return Err(TargetError::Empty);
    }

    let mut seen = HashSet::new();
    for target in &targets {
        let id = target.id();
        if !seen.insert(id.clone()) {
            return Err(TargetError::DuplicateId(id));
        }
    }

    Ok(targets)
}
