//! Command handlers for the connection actor.

use log::{debug, info, warn};

use super::{
    ConnectionActor,
    Flow,
    command::Command,
    dial::dial,
    link::Link,
    state::{ConnectionId, ConnectionState},
};
use crate::{
    error::{ReadError, SendError},
    metrics::{self, Direction, ErrorKind},
};

impl ConnectionActor {
    /// Execute one command to completion.
    pub(super) async fn dispatch(&mut self, command: Command) -> Flow {
        match command {
            Command::Connect => self.connect().await,
            Command::Disconnect => self.disconnect().await,
            Command::Send { text, reconnects } => self.send(text, reconnects).await,
            Command::ConnectThenSend { text, reconnects } => {
                self.connect().await;
                self.send(text, reconnects).await;
            }
            Command::SetListener(listener) => self.listener = listener,
            Command::LineReceived { connection, text } => {
                if !self.is_current(connection) {
                    debug!("discarding line from closed connection: id={connection}");
                } else if !text.is_empty() {
                    self.listener.on_text_message(&text);
                }
            }
            Command::ReaderStopped { connection, error } => {
                self.reader_stopped(connection, error).await;
            }
            Command::Shutdown => {
                self.shutdown().await;
                return Flow::Break(());
            }
        }
        Flow::Continue(())
    }

    async fn connect(&mut self) {
        if let Some(link) = &self.link {
            info!("already connected; ignoring connect: id={}", link.id());
            return;
        }

        info!("connecting: endpoint={}", self.config.endpoint());
        self.set_state(ConnectionState::Connecting);
        match dial(&self.config).await {
            Ok(stream) => {
                let id = self.next_id();
                let link = Link::establish(
                    id,
                    stream,
                    self.config.max_line_length_value(),
                    self.self_tx.clone(),
                );
                info!("connected: id={id}, peer={:?}", link.peer());
                self.link = Some(link);
                self.set_state(ConnectionState::Connected);
                self.listener.on_connected();
            }
            Err(err) => {
                self.set_state(ConnectionState::Disconnected);
                warn!(
                    "connection failed: endpoint={}, error={err}",
                    self.config.endpoint()
                );
                metrics::inc_errors(ErrorKind::Connect);
                self.listener.on_connect_error(&err);
            }
        }
    }

    async fn send(&mut self, text: String, reconnects: u32) {
        let Some(link) = self.link.as_mut() else {
            self.send_while_disconnected(text, reconnects);
            return;
        };

        match link.send(&text).await {
            Ok(()) => {
                debug!("line sent: id={}, bytes={}", link.id(), text.len());
                metrics::inc_lines(Direction::Outbound);
            }
            Err(err) => {
                warn!("failed to send line: id={}, error={err}", link.id());
                metrics::inc_errors(ErrorKind::Send);
                self.listener.on_send_text_error(&err);
            }
        }
    }

    /// Queue a connect-then-send at the tail of the queue, or give up once
    /// the line has used its reconnect budget.
    fn send_while_disconnected(&self, text: String, reconnects: u32) {
        let policy = self.config.reconnect_policy();
        if policy.allows(reconnects) {
            debug!(
                "not connected; queueing connect before send: attempt={}/{}",
                reconnects + 1,
                policy.max_attempts()
            );
            if !self.requeue(Command::ConnectThenSend {
                text,
                reconnects: reconnects + 1,
            }) {
                debug!("command queue closed; dropping line");
            }
            return;
        }

        let err = SendError::NotConnected {
            attempts: reconnects,
        };
        warn!("dropping line: {err}");
        metrics::inc_errors(ErrorKind::Send);
        self.listener.on_send_text_error(&err);
    }

    async fn reader_stopped(&mut self, connection: ConnectionId, error: Option<ReadError>) {
        if !self.is_current(connection) {
            debug!("ignoring reader exit from closed connection: id={connection}");
            return;
        }
        match &error {
            Some(err) => info!("connection lost: id={connection}, error={err}"),
            None => info!("connection closed by peer: id={connection}"),
        }
        self.close_link().await;
    }
}
