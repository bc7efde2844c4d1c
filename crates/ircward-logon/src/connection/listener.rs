//! Trigger to handler registration table.

use std::collections::HashMap;

use crate::types::Numeric;

/// An inbound event a connection can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// The transport is established; logon may begin.
    Logon,
    /// The host asked the connection to shut down.
    Exit,
    /// The server sent a numeric reply.
    Numeric(Numeric),
}

/// A negotiator entry point a trigger is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handler {
    /// Begin the registration handshake.
    Logon,
    /// Disconnect on request.
    Exit,
    /// Server accepted STARTTLS.
    StartTlsAccepted,
    /// Server refused STARTTLS.
    StartTlsRejected,
}

/// Listeners registered on a connection.
///
/// Each trigger maps to at most one handler; registering again replaces it.
#[derive(Debug, Clone, Default)]
pub struct Listeners {
    entries: HashMap<Trigger, Handler>,
}

impl Listeners {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for a trigger.
    pub fn add(&mut self, trigger: Trigger, handler: Handler) {
        if let Some(previous) = self.entries.insert(trigger, handler) {
            tracing::trace!(?trigger, ?previous, ?handler, "listener replaced");
        }
    }

    /// Removes the handler registered for a trigger.
    pub fn remove(&mut self, trigger: Trigger) -> Option<Handler> {
        self.entries.remove(&trigger)
    }

    /// Returns the handler registered for a trigger.
    #[must_use]
    pub fn get(&self, trigger: Trigger) -> Option<Handler> {
        self.entries.get(&trigger).copied()
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
