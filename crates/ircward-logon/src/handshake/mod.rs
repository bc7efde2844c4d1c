//! IRC registration handshake with optional STARTTLS upgrade.
//!
//! The negotiator owns the state machine for one connection. The host
//! delivers events to it one at a time, either directly through the
//! `handle_*` methods or by routing a [`Trigger`] through the listener table
//! with [`RegistrationNegotiator::dispatch`].
//!
//! There is no timer inside: while STARTTLS is pending the host asks
//! [`RegistrationNegotiator::poll_timeout`] for the deadline and calls
//! [`RegistrationNegotiator::handle_timeout`] once it has passed.

mod state;

use std::time::{Duration, Instant};

pub use state::HandshakeState;
use state::Handshake;

use crate::command::Command;
use crate::config::{Config, RegistrationConfig, keys};
use crate::connection::{Connection, Handler, Trigger};
use crate::error::{Error, Result};
use crate::types::{Numeric, TargetUri, UriParser, UrlParser};

/// Name under which help for this module is requested.
pub const MODULE_NAME: &str = "logon";

/// How long to wait for a STARTTLS answer when none is configured.
pub const DEFAULT_STARTTLS_TIMEOUT: Duration = Duration::from_secs(30);

const HELP_TEXT: &str =
    "This module has no commands of its own. It registers the bot with IRC servers.";

const STARTTLS_ACCEPTED: Trigger = Trigger::Numeric(Numeric::RPL_STARTTLS);
const STARTTLS_REJECTED: Trigger = Trigger::Numeric(Numeric::ERR_STARTTLS);

/// Registers the logon and exit listeners on a connection.
pub fn install<C: Connection>(conn: &mut C) {
    conn.add_listener(Trigger::Logon, Handler::Logon);
    conn.add_listener(Trigger::Exit, Handler::Exit);
}

/// Returns help text when `topic` names this module.
#[must_use]
pub fn help(topic: &str) -> Option<&'static str> {
    topic.eq_ignore_ascii_case(MODULE_NAME).then_some(HELP_TEXT)
}

/// Drives IRC registration for a single connection.
#[derive(Debug, Default)]
pub struct RegistrationNegotiator<P = UrlParser> {
    uri_parser: P,
    handshake: Handshake,
}

impl RegistrationNegotiator {
    /// Creates a negotiator using the default URI parser.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: UriParser> RegistrationNegotiator<P> {
    /// Creates a negotiator using a custom URI parser.
    #[must_use]
    pub fn with_uri_parser(uri_parser: P) -> Self {
        Self {
            uri_parser,
            handshake: Handshake::default(),
        }
    }

    /// Returns the URI parser.
    #[must_use]
    pub const fn uri_parser(&self) -> &P {
        &self.uri_parser
    }

    /// Returns the state of the current handshake.
    #[must_use]
    pub const fn state(&self) -> HandshakeState {
        self.handshake.state
    }

    /// Returns the credentials sent during the current handshake, if any.
    #[must_use]
    pub const fn registration(&self) -> Option<&RegistrationConfig> {
        self.handshake.registration.as_ref()
    }

    /// Routes a trigger to the handler registered for it on the connection.
    ///
    /// Returns `false` if nothing is listening for the trigger.
    ///
    /// # Errors
    ///
    /// Returns any error raised by the handler.
    pub async fn dispatch<C: Connection>(&mut self, conn: &mut C, trigger: Trigger) -> Result<bool> {
        let Some(handler) = conn.listener(trigger) else {
            tracing::trace!(?trigger, "no listener");
            return Ok(false);
        };
        self.handle(conn, handler).await?;
        Ok(true)
    }

    /// Runs a handler.
    ///
    /// # Errors
    ///
    /// Returns any error raised by the handler.
    pub async fn handle<C: Connection>(&mut self, conn: &mut C, handler: Handler) -> Result<()> {
        match handler {
            Handler::Logon => self.handle_logon(conn).await,
            Handler::Exit => self.handle_exit(conn).await,
            Handler::StartTlsAccepted => self.handle_starttls_accepted(conn).await,
            Handler::StartTlsRejected => self.handle_starttls_rejected(conn).await,
        }
    }

    /// Handles an established transport by starting a new handshake.
    ///
    /// Registers directly when no upgrade is requested or the URI scheme is
    /// already secure. Otherwise sends `STARTTLS` and waits for the answer, or
    /// drops the connection if TLS is unavailable.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is missing or malformed, or if a
    /// command cannot be sent.
    pub async fn handle_logon<C: Connection>(&mut self, conn: &mut C) -> Result<()> {
        retire_starttls_listeners(conn);
        self.handshake = Handshake::default();

        let (target, upgrade) = {
            let config = conn.config();
            let target = self.target_uri(config)?;
            let upgrade = config.parse_bool(keys::UPGRADE, Some(false))?;
            (target, upgrade)
        };

        if !upgrade || target.is_secure() {
            tracing::debug!(scheme = %target.scheme, upgrade, "registering without STARTTLS");
            return self.send_credentials(conn).await;
        }

        if !conn.tls_supported() {
            tracing::warn!(host = %target.host, "STARTTLS requested but TLS is unavailable");
            return self.abort(conn).await;
        }

        // Fail on missing credentials before any traffic.
        RegistrationConfig::load(conn.config())?;
        let timeout = starttls_timeout(conn.config())?;
        conn.add_listener(STARTTLS_ACCEPTED, Handler::StartTlsAccepted);
        conn.add_listener(STARTTLS_REJECTED, Handler::StartTlsRejected);
        if let Err(e) = conn.send_command(&Command::StartTls.to_string()).await {
            retire_starttls_listeners(conn);
            self.handshake.state = HandshakeState::Aborted;
            return Err(e);
        }

        self.handshake.state = HandshakeState::UpgradePending;
        self.handshake.deadline = timeout.map(|t| Instant::now() + t);
        tracing::debug!(host = %target.host, ?timeout, "STARTTLS sent");
        Ok(())
    }

    /// Handles the server accepting STARTTLS.
    ///
    /// # Errors
    ///
    /// Returns an error if registration cannot be sent, after dropping the
    /// connection, or if the connection cannot be closed.
    pub async fn handle_starttls_accepted<C: Connection>(&mut self, conn: &mut C) -> Result<()> {
        retire_starttls_listeners(conn);
        if self.handshake.state != HandshakeState::UpgradePending {
            tracing::warn!(state = ?self.handshake.state, "ignoring unexpected STARTTLS reply");
            return Ok(());
        }
        self.handshake.deadline = None;

        match conn.enable_tls().await {
            Ok(()) => {
                tracing::info!("connection upgraded to TLS");
                if let Err(e) = self.send_credentials(conn).await {
                    tracing::warn!(error = %e, "registration after TLS upgrade failed");
                    self.abort(conn).await?;
                    return Err(e);
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "TLS handshake failed");
                self.abort(conn).await
            }
        }
    }

    /// Handles the server refusing STARTTLS.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be closed.
    pub async fn handle_starttls_rejected<C: Connection>(&mut self, conn: &mut C) -> Result<()> {
        retire_starttls_listeners(conn);
        if self.handshake.state != HandshakeState::UpgradePending {
            tracing::warn!(state = ?self.handshake.state, "ignoring unexpected STARTTLS failure");
            return Ok(());
        }
        tracing::warn!("server refused STARTTLS");
        self.abort(conn).await
    }

    /// Handles an exit request by disconnecting with the configured quit message.
    ///
    /// An unfinished handshake is abandoned.
    ///
    /// # Errors
    ///
    /// Returns an error if the quit message cannot be read or the connection
    /// cannot be closed.
    pub async fn handle_exit<C: Connection>(&mut self, conn: &mut C) -> Result<()> {
        let quit_message = conn.config().parse_string(keys::QUIT_MESSAGE, Some(""))?;
        if !self.handshake.state.is_terminal() {
            retire_starttls_listeners(conn);
            self.handshake.state = HandshakeState::Aborted;
            self.handshake.deadline = None;
        }
        tracing::info!("disconnecting on exit request");
        conn.disconnect(Some(&quit_message), false).await
    }

    /// Returns when the pending STARTTLS exchange times out, if any.
    #[must_use]
    pub fn poll_timeout(&self) -> Option<Instant> {
        match self.handshake.state {
            HandshakeState::UpgradePending => self.handshake.deadline,
            _ => None,
        }
    }

    /// Drops the connection if the STARTTLS deadline has passed.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be closed.
    pub async fn handle_timeout<C: Connection>(&mut self, conn: &mut C, now: Instant) -> Result<()> {
        match self.poll_timeout() {
            Some(deadline) if now >= deadline => {
                tracing::warn!("no answer to STARTTLS");
                retire_starttls_listeners(conn);
                self.abort(conn).await
            }
            _ => Ok(()),
        }
    }

    /// Sends PASS (if a password is set), NICK and USER.
    async fn send_credentials<C: Connection>(&mut self, conn: &mut C) -> Result<()> {
        if !self.handshake.state.can_register() {
            return Err(Error::InvalidState(format!(
                "cannot register from {:?}",
                self.handshake.state
            )));
        }

        let (registration, target) = {
            let config = conn.config();
            (RegistrationConfig::load(config)?, self.target_uri(config)?)
        };

        let mut commands = Vec::with_capacity(3);
        if registration.has_password() {
            commands.push(Command::Pass {
                password: registration.password.clone(),
            });
        }
        commands.push(Command::Nick {
            nickname: registration.nickname.clone(),
        });
        commands.push(Command::User {
            identity: registration.identity.clone(),
            hostname: registration.hostname.clone(),
            server: target.host.clone(),
            realname: registration.realname.clone(),
        });

        for command in &commands {
            if let Err(e) = conn.send_command(&command.to_string()).await {
                self.handshake.state = HandshakeState::Aborted;
                return Err(e);
            }
        }

        tracing::info!(
            nickname = %registration.nickname,
            has_password = registration.has_password(),
            server = %target.host,
            "registration sent"
        );
        self.handshake.state = HandshakeState::Registered;
        self.handshake.deadline = None;
        self.handshake.registration = Some(registration);
        Ok(())
    }

    async fn abort<C: Connection>(&mut self, conn: &mut C) -> Result<()> {
        self.handshake.state = HandshakeState::Aborted;
        self.handshake.deadline = None;
        conn.disconnect(None, true).await
    }

    /// Parses the last configured URI; earlier entries are ignored.
    fn target_uri(&self, config: &dyn Config) -> Result<TargetUri> {
        let raw = config
            .connection_uris()
            .last()
            .ok_or(Error::NoConnectionUri)?;
        self.uri_parser.parse(raw)
    }
}

/// Removes both STARTTLS listeners; only one of them ever fires.
fn retire_starttls_listeners<C: Connection>(conn: &mut C) {
    for (trigger, handler) in [
        (STARTTLS_ACCEPTED, Handler::StartTlsAccepted),
        (STARTTLS_REJECTED, Handler::StartTlsRejected),
    ] {
        if conn.listener(trigger) == Some(handler) {
            conn.remove_listener(trigger);
        }
    }
}

/// Reads the STARTTLS timeout; `None` means wait forever.
fn starttls_timeout(config: &dyn Config) -> Result<Option<Duration>> {
    let raw = match config.parse_string(keys::STARTTLS_TIMEOUT, None) {
        Ok(raw) => raw,
        Err(Error::MissingConfig(_)) => return Ok(Some(DEFAULT_STARTTLS_TIMEOUT)),
        Err(e) => return Err(e),
    };
    let secs: u64 = raw.trim().parse().map_err(|_| Error::InvalidConfig {
        key: keys::STARTTLS_TIMEOUT.to_string(),
        value: raw.clone(),
    })?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}
