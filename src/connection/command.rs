//! Commands consumed by the connection actor.

use std::fmt;

use super::state::ConnectionId;
use crate::{error::ReadError, listener::SharedListener};

/// Work items drained from the actor's queue in FIFO order.
///
/// `Connect`, `Disconnect`, `Send`, `Shutdown` and `SetListener` come from
/// [`ConnectionHandle`](super::ConnectionHandle). `ConnectThenSend` is queued
/// by the actor itself when a line arrives while disconnected.
/// `LineReceived` and `ReaderStopped` come from the reader loop.
pub(crate) enum Command {
    Connect,
    Disconnect,
    Shutdown,
    Send {
        text: String,
        /// Connects already attempted on behalf of this line.
        reconnects: u32,
    },
    /// A connect immediately followed by the send, processed as one unit so
    /// nothing queued later can run between them.
    ConnectThenSend { text: String, reconnects: u32 },
    SetListener(SharedListener),
    LineReceived {
        connection: ConnectionId,
        text: String,
    },
    /// The reader ended without being asked to: end of stream or a fatal
    /// read error.
    ReaderStopped {
        connection: ConnectionId,
        error: Option<ReadError>,
    },
}

impl Command {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
            Self::Shutdown => "shutdown",
            Self::Send { .. } => "send",
            Self::ConnectThenSend { .. } => "connect_then_send",
            Self::SetListener(_) => "set_listener",
            Self::LineReceived { .. } => "line_received",
            Self::ReaderStopped { .. } => "reader_stopped",
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Send { text, reconnects } | Self::ConnectThenSend { text, reconnects } => f
                .debug_struct(self.name())
                .field("bytes", &text.len())
                .field("reconnects", reconnects)
                .finish(),
            Self::LineReceived { connection, text } => f
                .debug_struct(self.name())
                .field("connection", connection)
                .field("bytes", &text.len())
                .finish(),
            Self::ReaderStopped { connection, error } => f
                .debug_struct(self.name())
                .field("connection", connection)
                .field("error", error)
                .finish(),
            _ => f.write_str(self.name()),
        }
    }
}
