//! Reader loop forwarding inbound lines to the actor.
//!
//! The loop owns the read half of the socket; the actor owns the write half.
//! Teardown always goes through the actor, which cancels the loop's token and
//! then awaits the task, so no read is ever in flight on a socket the actor
//! has already released.

use log::{debug, error, info, warn};
use tokio::{io::AsyncRead, sync::mpsc::WeakUnboundedSender, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use super::{command::Command, state::ConnectionId};
use crate::{
    codec::LineReader,
    error::ReadError,
    metrics::{self, Direction, ErrorKind},
};

/// Handle to a running reader task.
pub(super) struct ReaderLoop {
    stop: CancellationToken,
    task: JoinHandle<()>,
}

/// Why the read loop ended.
enum Exit {
    /// `quit` was requested.
    Quit,
    /// The peer closed its side.
    Eof,
    /// The stream failed and cannot be read further.
    Failed(ReadError),
    /// The actor's queue is gone.
    ActorGone,
}

impl ReaderLoop {
    /// Spawn the reader for `connection`.
    pub(super) fn start<R>(
        connection: ConnectionId,
        source: R,
        max_line_length: usize,
        events: WeakUnboundedSender<Command>,
    ) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let stop = CancellationToken::new();
        let reader = LineReader::new(source, max_line_length);
        let task = tokio::spawn(run(connection, reader, stop.clone(), events));
        Self { stop, task }
    }

    /// Request the loop to stop. Idempotent; a pending read is abandoned.
    pub(super) fn quit(&self) { self.stop.cancel(); }

    /// Stop the loop and wait for the task to finish, releasing the read half.
    pub(super) async fn join(self) {
        self.quit();
        match self.task.await {
            Err(err) if err.is_panic() => error!("reader task panicked: {err}"),
            _ => {}
        }
    }
}

async fn run<R: AsyncRead + Unpin>(
    connection: ConnectionId,
    mut reader: LineReader<R>,
    stop: CancellationToken,
    events: WeakUnboundedSender<Command>,
) {
    debug!("reader started: id={connection}");
    let exit = read_lines(connection, &mut reader, &stop, &events).await;

    let error = match exit {
        Exit::Quit => {
            debug!("reader stopped on request: id={connection}");
            return;
        }
        Exit::ActorGone => {
            debug!("reader stopped, actor queue closed: id={connection}");
            return;
        }
        Exit::Eof => {
            info!("peer closed connection: id={connection}");
            None
        }
        Exit::Failed(err) => {
            warn!("reader failed: id={connection}, error={err}");
            metrics::inc_errors(ErrorKind::Read);
            Some(err)
        }
    };

    // A stop requested while the loop was winding down takes precedence; the
    // actor is already tearing this connection down.
    if stop.is_cancelled() {
        return;
    }
    forward(&events, Command::ReaderStopped { connection, error });
}

async fn read_lines<R: AsyncRead + Unpin>(
    connection: ConnectionId,
    reader: &mut LineReader<R>,
    stop: &CancellationToken,
    events: &WeakUnboundedSender<Command>,
) -> Exit {
    loop {
        let next = tokio::select! {
            biased;

            () = stop.cancelled() => return Exit::Quit,
            next = reader.next_line() => next,
        };

        match next {
            Ok(Some(text)) => {
                if text.is_empty() {
                    continue;
                }
                debug!("line received: id={connection}, bytes={}", text.len());
                metrics::inc_lines(Direction::Inbound);
                if !forward(events, Command::LineReceived { connection, text }) {
                    return Exit::ActorGone;
                }
            }
            Ok(None) => return Exit::Eof,
            Err(err) => {
                if stop.is_cancelled() {
                    return Exit::Quit;
                }
                if !err.is_recoverable() {
                    return Exit::Failed(err);
                }
                warn!("discarding inbound line: id={connection}, error={err}");
                metrics::inc_errors(ErrorKind::Read);
            }
        }
    }
}

fn forward(events: &WeakUnboundedSender<Command>, command: Command) -> bool {
    events
        .upgrade()
        .is_some_and(|sender| sender.send(command).is_ok())
}
