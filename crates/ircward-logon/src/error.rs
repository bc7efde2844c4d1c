//! Error types for IRC logon operations.

use std::io;

/// Result type alias for logon operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Logon error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TLS error.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// Invalid DNS name for TLS.
    #[error("Invalid DNS name: {0}")]
    InvalidDnsName(#[from] rustls::pki_types::InvalidDnsNameError),

    /// The runtime cannot perform a TLS handshake at all.
    #[error("TLS support is unavailable: {0}")]
    TlsUnavailable(String),

    /// Connection URI could not be parsed.
    #[error("Invalid connection URI {uri}: {reason}")]
    InvalidUri {
        /// The offending URI.
        uri: String,
        /// What was wrong with it.
        reason: String,
    },

    /// No connection URI configured.
    #[error("No connection URI configured")]
    NoConnectionUri,

    /// Required configuration key is missing.
    #[error("Missing configuration value: {0}")]
    MissingConfig(String),

    /// Configuration value could not be interpreted.
    #[error("Invalid value for {key}: {value}")]
    InvalidConfig {
        /// Configuration key.
        key: String,
        /// Raw value found.
        value: String,
    },

    /// Invalid state for operation.
    #[error("Invalid state for operation: {0}")]
    InvalidState(String),

    /// The connection has already been closed.
    #[error("Connection is closed")]
    Disconnected,
}

impl Error {
    /// Creates an invalid URI error.
    #[must_use]
    pub fn invalid_uri(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUri {
            uri: uri.into(),
            reason: reason.into(),
        }
    }
}
