//! Actor handlers driven directly, without a socket.

use std::{
    io,
    pin::Pin,
    sync::{Arc, Mutex},
    task::{Context, Poll},
};

use rstest::{fixture, rstest};
use tokio::io::{AsyncWrite, AsyncWriteExt, DuplexStream, duplex};

use super::{
    ConnectionActor,
    ConnectionHandle,
    command::Command,
    link::Link,
    state::{ConnectionId, ConnectionState},
};
use crate::{
    config::ConnectionConfig,
    error::{ConnectError, SendError},
    listener::ConnectionListener,
};

#[derive(Default)]
struct Recorder(Mutex<Vec<String>>);

impl Recorder {
    fn push(&self, event: String) { self.0.lock().expect("recorder lock").push(event); }

    fn take(&self) -> Vec<String> { std::mem::take(&mut *self.0.lock().expect("recorder lock")) }
}

impl ConnectionListener for Recorder {
    fn on_connected(&self) { self.push("connected".to_owned()); }

    fn on_disconnected(&self) { self.push("disconnected".to_owned()); }

    fn on_connect_error(&self, error: &ConnectError) { self.push(format!("connect error: {error}")); }

    fn on_send_text_error(&self, error: &SendError) { self.push(format!("send error: {error}")); }

    fn on_text_message(&self, text: &str) { self.push(format!("text: {text}")); }
}

/// Write half that rejects every write.
struct BrokenPipe;

impl AsyncWrite for BrokenPipe {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

struct Harness {
    actor: ConnectionActor,
    _handle: ConnectionHandle,
    recorder: Arc<Recorder>,
}

#[fixture]
fn harness() -> Harness {
    let recorder = Arc::new(Recorder::default());
    let (actor, handle) =
        ConnectionActor::with_listener(ConnectionConfig::new("127.0.0.1", 1), recorder.clone());
    Harness {
        actor,
        _handle: handle,
        recorder,
    }
}

/// Install a link whose reader serves the returned peer stream.
fn attach(
    actor: &mut ConnectionActor,
    write_half: Box<dyn AsyncWrite + Send + Unpin>,
) -> (ConnectionId, DuplexStream) {
    let (peer, local) = duplex(256);
    let id = actor.next_id();
    let link = Link::from_halves(
        id,
        None,
        local,
        write_half,
        actor.config.max_line_length_value(),
        actor.self_tx.clone(),
    );
    actor.link = Some(link);
    actor.set_state(ConnectionState::Connected);
    (id, peer)
}

#[rstest]
#[tokio::test]
async fn write_failure_reports_error_and_keeps_connection(harness: Harness) {
    let Harness {
        mut actor,
        _handle,
        recorder,
    } = harness;
    let (_id, _peer) = attach(&mut actor, Box::new(BrokenPipe));

    let flow = actor
        .dispatch(Command::Send {
            text: "hi".to_owned(),
            reconnects: 0,
        })
        .await;

    assert!(flow.is_continue());
    let events = recorder.take();
    assert_eq!(events.len(), 1, "unexpected events: {events:?}");
    assert!(events[0].starts_with("send error: failed to write line"));
    assert_eq!(actor.state(), ConnectionState::Connected);
    assert!(actor.link.is_some());

    actor.disconnect().await;
    assert_eq!(recorder.take(), vec!["disconnected".to_owned()]);
}

#[rstest]
#[tokio::test]
async fn lines_from_other_connections_are_discarded(harness: Harness) {
    let Harness {
        mut actor,
        _handle,
        recorder,
    } = harness;
    let (id, _peer) = attach(&mut actor, Box::new(tokio::io::sink()));
    let stale = ConnectionId::new(id.as_u64() + 1);

    let _ = actor
        .dispatch(Command::LineReceived {
            connection: stale,
            text: "old".to_owned(),
        })
        .await;
    let _ = actor
        .dispatch(Command::ReaderStopped {
            connection: stale,
            error: None,
        })
        .await;
    let _ = actor
        .dispatch(Command::LineReceived {
            connection: id,
            text: "current".to_owned(),
        })
        .await;

    assert_eq!(recorder.take(), vec!["text: current".to_owned()]);
    assert_eq!(actor.state(), ConnectionState::Connected);
}

#[rstest]
#[tokio::test]
async fn lines_read_before_disconnect_are_dropped_after_it(harness: Harness) {
    let Harness {
        mut actor,
        _handle,
        recorder,
    } = harness;
    let (_id, mut peer) = attach(&mut actor, Box::new(tokio::io::sink()));

    peer.write_all(b"late\n").await.expect("write line");
    let queued = actor.commands.recv().await.expect("reader forwards line");
    assert!(matches!(queued, Command::LineReceived { .. }));

    actor.disconnect().await;
    let _ = actor.dispatch(queued).await;

    assert_eq!(recorder.take(), vec!["disconnected".to_owned()]);
    assert_eq!(actor.state(), ConnectionState::Disconnected);
}
