//! Mail account credentials supplied through the process environment.

use std::fmt;

use lettre::message::Mailbox;

use super::ConfigError;

/// Environment variable holding the sending account address.
pub const EMAIL_ADDRESS_VAR: &str = "EMAIL_ADDRESS";
/// Environment variable holding the sending account password.
pub const EMAIL_PASSWORD_VAR: &str = "EMAIL_PASSWORD";
/// Environment variable holding the destination address.
pub const TO_EMAIL_VAR: &str = "TO_EMAIL";

/// The outgoing mail identity, its secret and the destination address.
///
/// Built once at startup and passed by reference to the notifier.
#[derive(Clone)]
pub struct Credentials {
    /// Account used to authenticate against the SMTP relay.
    pub username: String,
    /// Account password or app password.
    pub password: String,
    /// `From:` mailbox; the same account as `username`.
    pub from: Mailbox,
    /// `To:` mailbox.
    pub to: Mailbox,
}

impl Credentials {
    /// Reads credentials from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads credentials through `lookup`, which maps a variable name to its
    /// value.
    ///
    /// `EMAIL_ADDRESS` and `EMAIL_PASSWORD` are required. `TO_EMAIL` falls
    /// back to the sending address so a single account can notify itself.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| {
            lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        };

        let username =
            non_blank(EMAIL_ADDRESS_VAR).ok_or(ConfigError::MissingCredential(EMAIL_ADDRESS_VAR))?;
        // Passwords are taken verbatim; surrounding spaces can be significant.
        let password = lookup(EMAIL_PASSWORD_VAR)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingCredential(EMAIL_PASSWORD_VAR))?;
        let to_raw = non_blank(TO_EMAIL_VAR).unwrap_or_else(|| username.clone());

        let from = parse_mailbox(EMAIL_ADDRESS_VAR, &username)?;
        let to = parse_mailbox(TO_EMAIL_VAR, &to_raw)?;

        Ok(Self { username, password, from, to })
    }
}

fn parse_mailbox(var: &'static str, value: &str) -> Result<Mailbox, ConfigError> {
    value
        .parse::<Mailbox>()
        .map_err(|e| ConfigError::InvalidAddress { var, reason: e.to_string() })
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from", &self.from.to_string())
            .field("to", &self.to.to_string())
            .finish()
    }
}
