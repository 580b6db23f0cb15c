//! Application-facing handle to a running connection actor.

use tokio::sync::{mpsc, watch};

use super::{command::Command, state::ConnectionState};
use crate::{error::ActorClosed, listener::SharedListener};

/// Cloneable handle used to drive a [`ConnectionActor`](super::ConnectionActor).
///
/// Every mutating method only enqueues a command; the actor executes commands
/// one at a time in the order they were enqueued. Outcomes are reported to
/// the [`ConnectionListener`](crate::ConnectionListener).
///
/// Dropping every handle closes the queue, after which the actor tears the
/// connection down and exits.
#[derive(Clone, Debug)]
pub struct ConnectionHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ConnectionState>,
}

impl ConnectionHandle {
    pub(super) fn new(
        commands: mpsc::UnboundedSender<Command>,
        state: watch::Receiver<ConnectionState>,
    ) -> Self {
        Self { commands, state }
    }

    /// Request a connection. A no-op if already connected.
    ///
    /// # Errors
    ///
    /// Returns [`ActorClosed`] if the actor has stopped.
    pub fn connect(&self) -> Result<(), ActorClosed> { self.enqueue(Command::Connect) }

    /// Request a disconnect. A no-op if already disconnected.
    ///
    /// # Errors
    ///
    /// Returns [`ActorClosed`] if the actor has stopped.
    pub fn disconnect(&self) -> Result<(), ActorClosed> { self.enqueue(Command::Disconnect) }

    /// Queue `text` to be written followed by a single `\n`.
    ///
    /// If the actor is disconnected when the line is processed, it connects
    /// first, within the limits of the configured
    /// [`ReconnectPolicy`](crate::ReconnectPolicy).
    ///
    /// # Errors
    ///
    /// Returns [`ActorClosed`] if the actor has stopped.
    pub fn send(&self, text: impl Into<String>) -> Result<(), ActorClosed> {
        self.enqueue(Command::Send {
            text: text.into(),
            reconnects: 0,
        })
    }

    /// Stop the reader, disconnect, and end the actor.
    ///
    /// Commands queued behind the shutdown are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`ActorClosed`] if the actor has already stopped.
    pub fn shutdown(&self) -> Result<(), ActorClosed> { self.enqueue(Command::Shutdown) }

    /// Replace the listener. Events after this command reach the new listener.
    ///
    /// # Errors
    ///
    /// Returns [`ActorClosed`] if the actor has stopped.
    pub fn set_listener(&self, listener: SharedListener) -> Result<(), ActorClosed> {
        self.enqueue(Command::SetListener(listener))
    }

    /// State most recently published by the actor.
    #[must_use]
    pub fn state(&self) -> ConnectionState { *self.state.borrow() }

    /// Receiver observing every state change published by the actor.
    #[must_use]
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> { self.state.clone() }

    /// Wait until the actor publishes `target`.
    ///
    /// Returns immediately if `target` is the current state.
    ///
    /// # Errors
    ///
    /// Returns [`ActorClosed`] if the actor stops without reaching `target`.
    pub async fn wait_for_state(&self, target: ConnectionState) -> Result<(), ActorClosed> {
        let mut state = self.state.clone();
        state
            .wait_for(|current| *current == target)
            .await
            .map(|_| ())
            .map_err(|_| ActorClosed)
    }

    /// Returns `true` once the actor no longer accepts commands.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.commands.is_closed() }

    /// Wait until the actor no longer accepts commands.
    pub async fn closed(&self) { self.commands.closed().await; }

    fn enqueue(&self, command: Command) -> Result<(), ActorClosed> {
        self.commands.send(command).map_err(|_| ActorClosed)
    }
}
