//! Error types for configuration and credential loading.

use thiserror::Error;

use crate::models::target::TargetError;

/// Errors that abort a run before any target is fetched.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The layered application configuration could not be built or
    /// deserialized.
    #[error("Failed to load application configuration: {0}")]
    Source(#[from] ::config::ConfigError),

    /// A required credential is absent from the environment.
    #[error("Missing required credential: {0} is not set")]
    MissingCredential(&'static str),

    /// A credential holds a value that is not a valid mailbox address.
    #[error("Invalid email address in {var}: {reason}")]
    InvalidAddress {
        /// The environment variable that held the address.
        var: &'static str,
        /// Why the address was rejected.
        reason: String,
    },

    /// The target configuration file could not be loaded or validated.
    #[error("Invalid target configuration: {0}")]
    Targets(#[from] TargetError),

    /// The configuration is well formed but semantically unusable.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
