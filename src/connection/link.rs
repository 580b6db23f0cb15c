//! Resources owned by the actor while connected.

use std::net::SocketAddr;

use futures::SinkExt;
use log::warn;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpStream,
    sync::mpsc::WeakUnboundedSender,
};

use super::{command::Command, reader::ReaderLoop, state::ConnectionId};
use crate::{
    codec::{LineWriter, line_writer},
    error::SendError,
    metrics::{self, ErrorKind},
};

/// RAII guard keeping the open connections gauge in step with live links.
struct OpenGuard;

impl OpenGuard {
    fn new() -> Self {
        metrics::inc_connections();
        Self
    }
}

impl Drop for OpenGuard {
    fn drop(&mut self) { metrics::dec_connections(); }
}

/// Write half of a connection.
pub(super) type Outbound = Box<dyn AsyncWrite + Send + Unpin>;

/// An established connection: the write half, the reader serving the read
/// half, and their identity.
pub(super) struct Link {
    id: ConnectionId,
    peer: Option<SocketAddr>,
    writer: LineWriter<Outbound>,
    reader: ReaderLoop,
    _open: OpenGuard,
}

impl Link {
    /// Split `stream` and start its reader.
    pub(super) fn establish(
        id: ConnectionId,
        stream: TcpStream,
        max_line_length: usize,
        events: WeakUnboundedSender<Command>,
    ) -> Self {
        let peer = stream.peer_addr().ok();
        let (read_half, write_half) = stream.into_split();
        Self::from_halves(id, peer, read_half, Box::new(write_half), max_line_length, events)
    }

    /// Assemble a link from an already split transport and start its reader.
    pub(super) fn from_halves<R>(
        id: ConnectionId,
        peer: Option<SocketAddr>,
        read_half: R,
        write_half: Outbound,
        max_line_length: usize,
        events: WeakUnboundedSender<Command>,
    ) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let reader = ReaderLoop::start(id, read_half, max_line_length, events);
        Self {
            id,
            peer,
            writer: line_writer(write_half),
            reader,
            _open: OpenGuard::new(),
        }
    }

    pub(super) fn id(&self) -> ConnectionId { self.id }

    pub(super) fn peer(&self) -> Option<SocketAddr> { self.peer }

    /// Write `text` and a newline, then flush.
    pub(super) async fn send(&mut self, text: &str) -> Result<(), SendError> {
        self.writer.send(text).await.map_err(SendError::from)
    }

    /// Signal the reader to stop without waiting for it.
    pub(super) fn stop_reader(&self) { self.reader.quit(); }

    /// Stop the reader, flush and shut down the write half, and wait for the
    /// reader to release the read half. Close failures are logged only.
    pub(super) async fn close(self) {
        let Self {
            id,
            peer,
            mut writer,
            reader,
            _open,
        } = self;
        reader.quit();
        if let Err(err) = SinkExt::<&str>::close(&mut writer).await {
            warn!("failed to close connection: id={id}, peer={peer:?}, error={err}");
            metrics::inc_errors(ErrorKind::Close);
        }
        drop(writer);
        reader.join().await;
    }
}
