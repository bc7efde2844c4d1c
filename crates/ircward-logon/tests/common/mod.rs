//! Shared test doubles.

#![allow(dead_code, clippy::unwrap_used)]

use ircward_logon::{
    Config, Connection, Error, Handler, Listeners, Result, Settings, TargetUri, Trigger, UriParser,
};

/// Mock connection that records everything the negotiator does.
#[derive(Debug, Default)]
pub struct MockConnection {
    /// Configuration served to the negotiator.
    pub settings: Settings,
    /// Command lines sent, in order.
    pub sent: Vec<String>,
    /// Disconnect calls as `(quit_message, forced)`.
    pub disconnects: Vec<(Option<String>, bool)>,
    /// Whether a TLS handshake is possible at all.
    pub tls_supported: bool,
    /// Whether the in-place TLS upgrade should fail.
    pub tls_fails: bool,
    /// Whether every send should fail as if the peer had gone away.
    pub send_fails: bool,
    /// Set once the upgrade succeeded.
    pub tls_enabled: bool,
    /// Registered listeners.
    pub listeners: Listeners,
}

impl MockConnection {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            tls_supported: true,
            ..Self::default()
        }
    }

    /// Lines other than STARTTLS.
    pub fn credential_lines(&self) -> Vec<&str> {
        self.sent
            .iter()
            .map(String::as_str)
            .filter(|line| *line != "STARTTLS")
            .collect()
    }

    pub fn starttls_sent(&self) -> bool {
        self.sent.iter().any(|line| line == "STARTTLS")
    }

    pub fn was_forced_off(&self) -> bool {
        self.disconnects == [(None, true)]
    }
}

impl Connection for MockConnection {
    fn config(&self) -> &dyn Config {
        &self.settings
    }

    async fn send_command(&mut self, line: &str) -> Result<()> {
        if self.send_fails {
            return Err(Error::Disconnected);
        }
        self.sent.push(line.to_string());
        Ok(())
    }

    async fn disconnect(&mut self, quit_message: Option<&str>, forced: bool) -> Result<()> {
        self.disconnects
            .push((quit_message.map(str::to_string), forced));
        Ok(())
    }

    fn tls_supported(&self) -> bool {
        self.tls_supported
    }

    async fn enable_tls(&mut self) -> Result<()> {
        if self.tls_fails {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "handshake interrupted",
            )));
        }
        self.tls_enabled = true;
        Ok(())
    }

    fn add_listener(&mut self, trigger: Trigger, handler: Handler) {
        self.listeners.add(trigger, handler);
    }

    fn remove_listener(&mut self, trigger: Trigger) -> Option<Handler> {
        self.listeners.remove(trigger)
    }

    fn listener(&self, trigger: Trigger) -> Option<Handler> {
        self.listeners.get(trigger)
    }
}

/// URI parser that keeps the scheme but always resolves the host to `0.0.0.0`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedHost;

impl UriParser for FixedHost {
    fn parse(&self, raw: &str) -> Result<TargetUri> {
        let (scheme, _) = raw
            .split_once("://")
            .ok_or_else(|| Error::invalid_uri(raw, "missing scheme"))?;
        Ok(TargetUri {
            scheme: scheme.to_string(),
            host: "0.0.0.0".to_string(),
            port: None,
        })
    }
}

/// Settings matching the reference registration scenarios.
pub fn scenario_settings(uri: &str, password: &str) -> Settings {
    Settings::builder()
        .uri(uri)
        .password(password)
        .nickname("Erebot")
        .identity("identity")
        .hostname("hostname")
        .realname("realname")
        .build()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
