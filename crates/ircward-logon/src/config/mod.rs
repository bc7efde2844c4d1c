//! Connection configuration.
//!
//! The negotiator only ever reads configuration through the [`Config`]
//! trait: a flat key lookup plus the ordered list of server URIs. How the
//! values are stored or loaded is up to the host. [`Settings`] is an
//! in-memory implementation that can be deserialized with serde.

mod registration;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use registration::{DEFAULT_IDENTITY, RegistrationConfig};

/// Configuration keys read during logon.
pub mod keys {
    /// Server password; empty means none.
    pub const PASSWORD: &str = "password";
    /// Nickname to register with.
    pub const NICKNAME: &str = "nickname";
    /// Identity (username) sent in USER.
    pub const IDENTITY: &str = "identity";
    /// Hostname the client claims to come from.
    pub const HOSTNAME: &str = "hostname";
    /// Real name (GECOS) sent in USER.
    pub const REALNAME: &str = "realname";
    /// Whether to upgrade plain-text connections with STARTTLS.
    pub const UPGRADE: &str = "upgrade";
    /// Message sent with QUIT on exit.
    pub const QUIT_MESSAGE: &str = "quit_message";
    /// Seconds to wait for a STARTTLS response; `0` waits forever.
    pub const STARTTLS_TIMEOUT: &str = "starttls_timeout";
}

/// Flat configuration lookup for a single connection.
pub trait Config: Send + Sync {
    /// Returns the configured server URIs, in order.
    fn connection_uris(&self) -> &[String];

    /// Reads a string value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingConfig`] if the key is unset and no default is given.
    fn parse_string(&self, key: &str, default: Option<&str>) -> Result<String>;

    /// Reads a boolean value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unset without a default, or if the value
    /// is not a recognized boolean.
    fn parse_bool(&self, key: &str, default: Option<bool>) -> Result<bool>;
}

/// In-memory connection configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Server URIs; the last one is the connection target.
    #[serde(default)]
    pub uris: Vec<String>,
    /// Flat key/value settings.
    #[serde(default)]
    pub values: HashMap<String, String>,
}

impl Settings {
    /// Creates empty settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a settings builder.
    #[must_use]
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Returns the raw value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Sets a value, replacing any previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl Config for Settings {
    fn connection_uris(&self) -> &[String] {
        &self.uris
    }

    fn parse_string(&self, key: &str, default: Option<&str>) -> Result<String> {
        self.get(key)
            .or(default)
            .map(str::to_string)
            .ok_or_else(|| Error::MissingConfig(key.to_string()))
    }

    fn parse_bool(&self, key: &str, default: Option<bool>) -> Result<bool> {
        match self.get(key) {
            Some(raw) => parse_bool_value(raw).ok_or_else(|| Error::InvalidConfig {
                key: key.to_string(),
                value: raw.to_string(),
            }),
            None => default.ok_or_else(|| Error::MissingConfig(key.to_string())),
        }
    }
}

/// Interprets common spellings of a boolean.
fn parse_bool_value(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Builder for [`Settings`].
#[derive(Debug, Clone, Default)]
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    /// Appends a connection URI.
    #[must_use]
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.settings.uris.push(uri.into());
        self
    }

    /// Sets an arbitrary key.
    #[must_use]
    pub fn value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.set(key, value);
        self
    }

    /// Sets the server password.
    #[must_use]
    pub fn password(self, password: impl Into<String>) -> Self {
        self.value(keys::PASSWORD, password)
    }

    /// Sets the nickname.
    #[must_use]
    pub fn nickname(self, nickname: impl Into<String>) -> Self {
        self.value(keys::NICKNAME, nickname)
    }

    /// Sets the identity.
    #[must_use]
    pub fn identity(self, identity: impl Into<String>) -> Self {
        self.value(keys::IDENTITY, identity)
    }

    /// Sets the claimed hostname.
    #[must_use]
    pub fn hostname(self, hostname: impl Into<String>) -> Self {
        self.value(keys::HOSTNAME, hostname)
    }

    /// Sets the real name.
    #[must_use]
    pub fn realname(self, realname: impl Into<String>) -> Self {
        self.value(keys::REALNAME, realname)
    }

    /// Enables or disables the STARTTLS upgrade.
    #[must_use]
    pub fn upgrade(self, upgrade: bool) -> Self {
        self.value(keys::UPGRADE, upgrade.to_string())
    }

    /// Sets the quit message.
    #[must_use]
    pub fn quit_message(self, message: impl Into<String>) -> Self {
        self.value(keys::QUIT_MESSAGE, message)
    }

    /// Sets the STARTTLS response timeout in seconds.
    #[must_use]
    pub fn starttls_timeout(self, secs: u64) -> Self {
        self.value(keys::STARTTLS_TIMEOUT, secs.to_string())
    }

    /// Builds the settings.
    #[must_use]
    pub fn build(self) -> Settings {
        self.settings
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_string_with_default() {
        let settings = Settings::builder().nickname("Erebot").build();
        assert_eq!(
            settings.parse_string(keys::NICKNAME, None).unwrap(),
            "Erebot"
        );
        assert_eq!(
            settings.parse_string(keys::PASSWORD, Some("")).unwrap(),
            ""
        );
    }

    #[test]
    fn test_parse_string_missing() {
        let settings = Settings::new();
        let err = settings.parse_string(keys::NICKNAME, None).unwrap_err();
        assert!(matches!(err, Error::MissingConfig(ref key) if key == "nickname"));
    }

    #[test]
    fn test_parse_bool_spellings() {
        for (raw, expected) in [
            ("true", true),
            ("YES", true),
            ("on", true),
            ("1", true),
            ("false", false),
            ("No", false),
            ("off", false),
            ("0", false),
        ] {
            let settings = Settings::builder().value(keys::UPGRADE, raw).build();
            assert_eq!(settings.parse_bool(keys::UPGRADE, None).unwrap(), expected);
        }
    }

    #[test]
    fn test_parse_bool_default_and_invalid() {
        let settings = Settings::new();
        assert!(!settings.parse_bool(keys::UPGRADE, Some(false)).unwrap());
        assert!(settings.parse_bool(keys::UPGRADE, None).is_err());

        let settings = Settings::builder().value(keys::UPGRADE, "maybe").build();
        let err = settings.parse_bool(keys::UPGRADE, Some(false)).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_builder_keeps_uri_order() {
        let settings = Settings::builder()
            .uri("irc://first.example.net/")
            .uri("ircs://last.example.net/")
            .upgrade(true)
            .build();
        assert_eq!(
            settings.connection_uris(),
            ["irc://first.example.net/", "ircs://last.example.net/"]
        );
        assert_eq!(settings.get(keys::UPGRADE), Some("true"));
    }

    #[test]
    fn test_deserialize_from_json() {
        let json = r#"{
            "uris": ["irc://irc.example.net/"],
            "values": { "nickname": "bot", "upgrade": "yes" }
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.uris.len(), 1);
        assert!(settings.parse_bool(keys::UPGRADE, Some(false)).unwrap());
    }
}
