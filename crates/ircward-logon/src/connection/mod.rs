//! Connection abstraction used by the negotiator.

mod irc;
mod listener;
mod stream;

use std::future::Future;

pub use irc::IrcConnection;
pub use listener::{Handler, Listeners, Trigger};
pub use stream::{IrcStream, connect_plain, connect_tls, create_tls_connector};

use crate::config::Config;
use crate::error::Result;

/// A live connection to an IRC server, as seen by the negotiator.
///
/// Implementations own the transport, the configuration for this connection
/// and the listener table through which inbound events are routed.
pub trait Connection: Send {
    /// Returns the configuration for this connection.
    fn config(&self) -> &dyn Config;

    /// Sends one command line; the transport appends line termination.
    fn send_command(&mut self, line: &str) -> impl Future<Output = Result<()>> + Send;

    /// Closes the connection.
    ///
    /// A clean disconnect says goodbye with an optional quit message. A forced
    /// disconnect drops the transport without sending anything.
    fn disconnect(
        &mut self,
        quit_message: Option<&str>,
        forced: bool,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Returns true if this connection is able to perform a TLS handshake.
    fn tls_supported(&self) -> bool;

    /// Switches the existing transport to TLS client mode in place.
    fn enable_tls(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Registers a handler for a trigger.
    fn add_listener(&mut self, trigger: Trigger, handler: Handler);

    /// Removes the handler for a trigger.
    fn remove_listener(&mut self, trigger: Trigger) -> Option<Handler>;

    /// Returns the handler registered for a trigger.
    fn listener(&self, trigger: Trigger) -> Option<Handler>;
}
