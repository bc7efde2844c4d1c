//! Registration credentials snapshot.

use std::fmt;

use super::{Config, keys};
use crate::error::Result;

/// Identity, hostname and real name used when none is configured.
pub const DEFAULT_IDENTITY: &str = "ircward";

/// Values sent during one registration attempt.
///
/// Read from configuration at the moment credentials are sent, then kept
/// unchanged for the rest of the handshake.
#[derive(Clone, PartialEq, Eq)]
pub struct RegistrationConfig {
    /// Server password; empty means no PASS command.
    pub password: String,
    /// Nickname.
    pub nickname: String,
    /// Identity (username).
    pub identity: String,
    /// Hostname the client claims to come from.
    pub hostname: String,
    /// Real name.
    pub realname: String,
    /// Whether a STARTTLS upgrade was requested.
    pub upgrade_requested: bool,
}

impl RegistrationConfig {
    /// Reads a snapshot from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the nickname is missing or a value is malformed.
    pub fn load(config: &dyn Config) -> Result<Self> {
        Ok(Self {
            password: config.parse_string(keys::PASSWORD, Some(""))?,
            nickname: config.parse_string(keys::NICKNAME, None)?,
            identity: config.parse_string(keys::IDENTITY, Some(DEFAULT_IDENTITY))?,
            hostname: config.parse_string(keys::HOSTNAME, Some(DEFAULT_IDENTITY))?,
            realname: config.parse_string(keys::REALNAME, Some(DEFAULT_IDENTITY))?,
            upgrade_requested: config.parse_bool(keys::UPGRADE, Some(false))?,
        })
    }

    /// Returns true if a PASS command will be sent.
    #[must_use]
    pub fn has_password(&self) -> bool {
        !self.password.is_empty()
    }
}

impl fmt::Debug for RegistrationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationConfig")
            .field("password", &if self.has_password() { "***" } else { "" })
            .field("nickname", &self.nickname)
            .field("identity", &self.identity)
            .field("hostname", &self.hostname)
            .field("realname", &self.realname)
            .field("upgrade_requested", &self.upgrade_requested)
            .finish()
    }
}
