//! Handshake state types.

use std::time::Instant;

use crate::config::RegistrationConfig;

/// State of a registration handshake.
///
/// ```text
/// AwaitingDecision ──direct──────────────────────────→ Registered
///        │
///        └──STARTTLS──→ UpgradePending ──670 + TLS ok──→ Registered
///        │                   │
///        └──no TLS──┐        └──691 / TLS error / timeout──→ Aborted
///                   └──────────────────────────────────────→ Aborted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandshakeState {
    /// Transport is up; deciding whether to upgrade.
    #[default]
    AwaitingDecision,
    /// STARTTLS was sent; waiting for the server's answer.
    UpgradePending,
    /// Registration commands were sent.
    Registered,
    /// The handshake failed and the connection was dropped.
    Aborted,
}

impl HandshakeState {
    /// Returns true once the handshake can no longer make progress.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Registered | Self::Aborted)
    }

    /// Returns true if registration commands may be sent from this state.
    #[must_use]
    pub const fn can_register(self) -> bool {
        matches!(self, Self::AwaitingDecision | Self::UpgradePending)
    }
}

/// One logon attempt.
#[derive(Debug, Clone, Default)]
pub(crate) struct Handshake {
    pub(crate) state: HandshakeState,
    /// Credentials sent, once registered.
    pub(crate) registration: Option<RegistrationConfig>,
    /// When to give up waiting for a STARTTLS answer.
    pub(crate) deadline: Option<Instant>,
}
