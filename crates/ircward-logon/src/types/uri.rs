//! Connection URI types.

use url::Url;

use crate::error::{Error, Result};

/// URI scheme of a connection that is TLS-protected from the start.
pub const SECURE_SCHEME: &str = "ircs";

/// The server a connection targets, as read from its connection URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUri {
    /// URI scheme (`irc`, `ircs`, ...).
    pub scheme: String,
    /// Server host, as written in the URI.
    pub host: String,
    /// Explicit port, if any.
    pub port: Option<u16>,
}

impl TargetUri {
    /// Returns true if the scheme already implies TLS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.scheme == SECURE_SCHEME
    }

    /// Returns the explicit port, or the conventional one for the scheme.
    #[must_use]
    pub fn port_or_default(&self) -> u16 {
        self.port
            .unwrap_or(if self.is_secure() { 6697 } else { 6667 })
    }

    /// Returns the host with IPv6 brackets removed, suitable for TLS server names.
    #[must_use]
    pub fn server_name(&self) -> &str {
        self.host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(&self.host)
    }
}

/// Parses connection URIs into a [`TargetUri`].
///
/// The negotiator is constructed with an implementation of this trait, so
/// hosts can substitute their own URI handling (or a fixed answer in tests).
pub trait UriParser: Send + Sync {
    /// Parses a raw URI string.
    ///
    /// # Errors
    ///
    /// Returns an error if the URI is malformed or has no host.
    fn parse(&self, raw: &str) -> Result<TargetUri>;
}

/// Default URI parser backed by the `url` crate.
///
/// Schemes are normalized to lowercase by the parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct UrlParser;

impl UriParser for UrlParser {
    fn parse(&self, raw: &str) -> Result<TargetUri> {
        let url = Url::parse(raw).map_err(|e| Error::invalid_uri(raw, e.to_string()))?;
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::invalid_uri(raw, "missing host"))?;

        Ok(TargetUri {
            scheme: url.scheme().to_string(),
            host: host.to_string(),
            port: url.port(),
        })
    }
}
