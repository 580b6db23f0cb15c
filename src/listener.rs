//! Application callbacks invoked by the connection actor.
//!
//! [`ConnectionListener`] is the capability an application hands to the
//! actor to observe lifecycle and data events. Every method has a no-op
//! default, so implementations override only what they need.

use std::sync::Arc;

use crate::error::{ConnectError, SendError};

/// Receives lifecycle and data events from a
/// [`ConnectionActor`](crate::ConnectionActor).
///
/// All calls are made on the actor task, in the order the events occur. An
/// implementation must return promptly: while a callback runs, no further
/// commands are processed.
///
/// # Examples
///
/// ```
/// use linewire::ConnectionListener;
///
/// struct PrintLines;
///
/// impl ConnectionListener for PrintLines {
///     fn on_text_message(&self, text: &str) {
///         println!("{text}");
///     }
/// }
/// ```
pub trait ConnectionListener: Send + Sync + 'static {
    /// The connection was established and the reader is running.
    fn on_connected(&self) {}

    /// The connection was closed, locally or by the peer.
    fn on_disconnected(&self) {}

    /// A connection attempt failed. The actor remains disconnected.
    fn on_connect_error(&self, _error: &ConnectError) {}

    /// A line could not be sent. Write failures leave the connection open.
    fn on_send_text_error(&self, _error: &SendError) {}

    /// A non-empty line arrived from the peer.
    fn on_text_message(&self, _text: &str) {}
}

/// Listener that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopListener;

impl ConnectionListener for NoopListener {}

/// Shared, type-erased listener as stored by the actor.
pub type SharedListener = Arc<dyn ConnectionListener>;

pub(crate) fn noop() -> SharedListener { Arc::new(NoopListener) }
