//! Sending lines through `ConnectionActor`, connected and disconnected.

use std::time::Duration;

use linewire::{ConnectionActor, ConnectionConfig, ConnectionState, ReconnectPolicy};
use linewire_testing::{LineServer, ListenerEvent, RecordingListener, refused_port};
use rstest::{fixture, rstest};

const QUIET: Duration = Duration::from_millis(200);

#[fixture]
fn refused_config() -> ConnectionConfig {
    ConnectionConfig::new("127.0.0.1", refused_port().expect("free port"))
}

#[rstest]
#[tokio::test]
async fn send_writes_text_and_newline() {
    let server = LineServer::bind().await.expect("bind server");
    let (listener, mut events) = RecordingListener::new();
    let (handle, _task) = ConnectionActor::spawn(server.config(), listener);

    handle.connect().expect("actor running");
    let mut peer = server.accept().await.expect("client connects");
    assert_eq!(events.next_event().await, Some(ListenerEvent::Connected));

    handle.send("hi").expect("actor running");
    handle.send("").expect("actor running");
    handle.send("there").expect("actor running");
    assert_eq!(peer.next_raw_line().await.expect("read"), Some("hi\n".to_owned()));
    assert_eq!(peer.next_raw_line().await.expect("read"), Some("\n".to_owned()));
    assert_eq!(peer.next_line().await.expect("read"), Some("there".to_owned()));
    events.assert_no_event(QUIET).await;
}

#[rstest]
#[tokio::test]
async fn send_while_disconnected_connects_first() {
    let server = LineServer::bind().await.expect("bind server");
    let (listener, mut events) = RecordingListener::new();
    let (handle, _task) = ConnectionActor::spawn(server.config(), listener);

    handle.send("hi").expect("actor running");
    let mut peer = server.accept().await.expect("client connects");

    assert_eq!(events.next_event().await, Some(ListenerEvent::Connected));
    assert_eq!(peer.next_line().await.expect("read"), Some("hi".to_owned()));
    assert_eq!(handle.state(), ConnectionState::Connected);
}

#[rstest]
#[tokio::test]
async fn send_recovers_once_endpoint_comes_up() {
    let port = refused_port().expect("free port");
    let (listener, mut events) = RecordingListener::new();
    let config = ConnectionConfig::new("127.0.0.1", port).reconnect(ReconnectPolicy::new(1));
    let (handle, _task) = ConnectionActor::spawn(config, listener);

    handle.connect().expect("actor running");
    assert!(matches!(
        events.next_event().await,
        Some(ListenerEvent::ConnectError(_))
    ));

    let server = LineServer::bind_port(port).await.expect("bind server");
    handle.send("hi").expect("actor running");
    let mut peer = server.accept().await.expect("client connects");
    assert_eq!(events.next_event().await, Some(ListenerEvent::Connected));
    assert_eq!(peer.next_line().await.expect("read"), Some("hi".to_owned()));
}

#[rstest]
#[tokio::test]
async fn queued_send_runs_after_earlier_commands() {
    let server = LineServer::bind().await.expect("bind server");
    let (listener, mut events) = RecordingListener::new();
    let (handle, _task) = ConnectionActor::spawn(server.config(), listener);

    // The send is retried behind the disconnect, which finds nothing to close.
    handle.send("hi").expect("actor running");
    handle.disconnect().expect("actor running");
    let mut peer = server.accept().await.expect("client connects");

    assert_eq!(events.next_event().await, Some(ListenerEvent::Connected));
    assert_eq!(peer.next_line().await.expect("read"), Some("hi".to_owned()));
    events.assert_no_event(QUIET).await;
    assert_eq!(handle.state(), ConnectionState::Connected);
}

#[rstest]
#[tokio::test]
async fn send_gives_up_after_reconnect_budget(refused_config: ConnectionConfig) {
    let (listener, mut events) = RecordingListener::new();
    let config = refused_config.reconnect(ReconnectPolicy::new(2));
    let (handle, _task) = ConnectionActor::spawn(config, listener);

    handle.send("hi").expect("actor running");

    for _ in 0..2 {
        assert!(matches!(
            events.next_event().await,
            Some(ListenerEvent::ConnectError(_))
        ));
    }
    match events.next_event().await {
        Some(ListenerEvent::SendTextError(message)) => assert!(message.contains("2 reconnect")),
        other => panic!("expected send error, got {other:?}"),
    }
    events.assert_no_event(QUIET).await;
    assert_eq!(handle.state(), ConnectionState::Disconnected);
}

#[rstest]
#[tokio::test]
async fn send_without_reconnect_fails_immediately(refused_config: ConnectionConfig) {
    let (listener, mut events) = RecordingListener::new();
    let config = refused_config.reconnect(ReconnectPolicy::disabled());
    let (handle, _task) = ConnectionActor::spawn(config, listener);

    handle.send("hi").expect("actor running");

    assert!(matches!(
        events.next_event().await,
        Some(ListenerEvent::SendTextError(_))
    ));
    events.assert_no_event(QUIET).await;
}
