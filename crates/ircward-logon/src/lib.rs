//! # ircward-logon
//!
//! IRC client registration (PASS/NICK/USER) with optional in-band TLS
//! upgrade through the STARTTLS extension.
//!
//! ## Features
//!
//! - **Registration handshake**: PASS (when a password is set), NICK and USER,
//!   sent exactly once per connection attempt
//! - **STARTTLS**: upgrades a plain-text connection in place before any
//!   credential is sent, and refuses to fall back to plain text
//! - **Typed dispatch**: inbound events are [`Trigger`]s routed through an
//!   explicit listener table
//! - **Sans-timer**: the STARTTLS deadline is exposed through `poll_timeout()`
//!   so the host decides how to wait
//!
//! ## Quick Start
//!
//! ```ignore
//! use ircward_logon::{
//!     Connection, IrcConnection, RegistrationNegotiator, Settings, Trigger, connect_plain,
//! };
//!
//! #[tokio::main]
//! async fn main() -> ircward_logon::Result<()> {
//!     let settings = Settings::builder()
//!         .uri("irc://irc.example.net:6667/")
//!         .nickname("ircward")
//!         .upgrade(true)
//!         .build();
//!
//!     let stream = connect_plain("irc.example.net", 6667).await?;
//!     let mut conn = IrcConnection::new(stream, settings, "irc.example.net");
//!     let mut negotiator = RegistrationNegotiator::new();
//!
//!     ircward_logon::handshake::install(&mut conn);
//!     negotiator.dispatch(&mut conn, Trigger::Logon).await?;
//!
//!     // Feed numerics such as 670/691 back as Trigger::Numeric(..)
//!     Ok(())
//! }
//! ```
//!
//! ## Handshake States
//!
//! ```text
//! ┌──────────────────┐
//! │ AwaitingDecision │ ─── no upgrade / ircs:// ───→ Registered
//! └──────────────────┘
//!          │ STARTTLS
//!          ▼
//! ┌──────────────────┐
//! │  UpgradePending  │ ─── 670 + TLS ok ───→ Registered
//! └──────────────────┘
//!          │ 691 / TLS error / timeout
//!          ▼
//!       Aborted
//! ```
//!
//! ## Modules
//!
//! - [`command`]: IRC command builder
//! - [`config`]: Configuration lookup and credentials snapshot
//! - [`connection`]: Connection trait, listener table and stream adapter
//! - [`handshake`]: Registration state machine
//! - [`types`]: Numerics and connection URIs

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod config;
pub mod connection;
mod error;
pub mod handshake;
pub mod types;

pub use command::Command;
pub use config::{Config, RegistrationConfig, Settings, SettingsBuilder};
pub use connection::{
    Connection, Handler, IrcConnection, IrcStream, Listeners, Trigger, connect_plain, connect_tls,
    create_tls_connector,
};
pub use error::{Error, Result};
pub use handshake::{HandshakeState, RegistrationNegotiator};
pub use types::{Numeric, SECURE_SCHEME, TargetUri, UriParser, UrlParser};
