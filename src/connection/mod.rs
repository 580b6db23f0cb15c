//! Connection actor owning a single line-oriented TCP connection.
//!
//! The actor drains one command queue on one task, so every state change and
//! every socket write happens in queue order without locking. A separate
//! reader task owns the read half of the socket and feeds inbound lines back
//! into the same queue.

mod command;
mod dial;
mod dispatch;
mod handle;
mod link;
mod reader;
mod shutdown;
mod state;
#[cfg(test)]
mod tests;

use std::ops::ControlFlow;

use command::Command;
pub use handle::ConnectionHandle;
use link::Link;
use log::{debug, info};
pub use state::{ConnectionId, ConnectionState};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};

use crate::{
    config::ConnectionConfig,
    listener::{self, SharedListener},
};

/// Actor serialising connect, disconnect, send, and shutdown for one TCP
/// connection.
///
/// Create it with [`ConnectionActor::new`] and drive it with
/// [`ConnectionActor::run`], or use [`ConnectionActor::spawn`] to do both on
/// the current Tokio runtime.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
///
/// use linewire::{ConnectionActor, ConnectionConfig, ConnectionListener};
///
/// struct Print;
///
/// impl ConnectionListener for Print {
///     fn on_text_message(&self, text: &str) { println!("{text}"); }
/// }
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), linewire::ActorClosed> {
/// let config = ConnectionConfig::new("127.0.0.1", 7000);
/// let (handle, task) = ConnectionActor::spawn(config, Arc::new(Print));
/// handle.send("hello")?;
/// handle.shutdown()?;
/// task.await.expect("actor task");
/// # Ok(())
/// # }
/// ```
pub struct ConnectionActor {
    config: ConnectionConfig,
    commands: mpsc::UnboundedReceiver<Command>,
    /// Non-owning sender for commands the actor queues itself and for the
    /// reader. Holding a strong sender would keep the queue open forever.
    self_tx: mpsc::WeakUnboundedSender<Command>,
    state: ConnectionState,
    published: watch::Sender<ConnectionState>,
    link: Option<Link>,
    listener: SharedListener,
    last_id: u64,
}

impl ConnectionActor {
    /// Create an actor with a no-op listener, returning it with its handle.
    #[must_use]
    pub fn new(config: ConnectionConfig) -> (Self, ConnectionHandle) {
        Self::with_listener(config, listener::noop())
    }

    /// Create an actor reporting to `listener`, returning it with its handle.
    #[must_use]
    pub fn with_listener(
        config: ConnectionConfig,
        listener: SharedListener,
    ) -> (Self, ConnectionHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (published, observed) = watch::channel(ConnectionState::Disconnected);
        let actor = Self {
            config,
            commands: rx,
            self_tx: tx.downgrade(),
            state: ConnectionState::Disconnected,
            published,
            link: None,
            listener,
            last_id: 0,
        };
        (actor, ConnectionHandle::new(tx, observed))
    }

    /// Create an actor reporting to `listener` and spawn it on the current
    /// Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn spawn(
        config: ConnectionConfig,
        listener: SharedListener,
    ) -> (ConnectionHandle, JoinHandle<()>) {
        let (actor, handle) = Self::with_listener(config, listener);
        (handle, tokio::spawn(actor.run()))
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState { self.state }

    /// Configuration the actor connects with.
    #[must_use]
    pub fn config(&self) -> &ConnectionConfig { &self.config }

    /// Process commands until a shutdown is handled or every handle is
    /// dropped.
    pub async fn run(mut self) {
        info!("connection actor started: endpoint={}", self.config.endpoint());
        let mut stopped = false;
        while let Some(command) = self.commands.recv().await {
            debug!("processing command: {command:?}");
            if self.dispatch(command).await.is_break() {
                stopped = true;
                break;
            }
        }
        if !stopped {
            debug!("all handles dropped; shutting down");
            self.shutdown().await;
        }
        info!("connection actor stopped: endpoint={}", self.config.endpoint());
    }

    fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
        self.published.send_replace(state);
    }

    fn next_id(&mut self) -> ConnectionId {
        self.last_id += 1;
        ConnectionId::new(self.last_id)
    }

    fn is_current(&self, connection: ConnectionId) -> bool {
        self.link.as_ref().is_some_and(|link| link.id() == connection)
    }

    /// Queue `command` at the tail of the actor's own queue.
    fn requeue(&self, command: Command) -> bool {
        self.self_tx
            .upgrade()
            .is_some_and(|sender| sender.send(command).is_ok())
    }
}

type Flow = ControlFlow<()>;
