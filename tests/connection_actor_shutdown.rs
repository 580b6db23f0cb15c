//! Shutdown of `ConnectionActor` by command and by dropping handles.

use std::time::Duration;

use linewire::{ActorClosed, ConnectionActor, ConnectionState};
use linewire_testing::{LineServer, ListenerEvent, RecordingListener};
use rstest::rstest;
use tokio::time::timeout;

const JOIN_TIMEOUT: Duration = Duration::from_secs(5);

#[rstest]
#[tokio::test]
async fn shutdown_closes_connection_and_stops_actor() {
    let server = LineServer::bind().await.expect("bind server");
    let (listener, mut events) = RecordingListener::new();
    let (handle, task) = ConnectionActor::spawn(server.config(), listener);

    handle.connect().expect("actor running");
    let mut peer = server.accept().await.expect("client connects");
    assert_eq!(events.next_event().await, Some(ListenerEvent::Connected));

    handle.shutdown().expect("actor running");
    timeout(JOIN_TIMEOUT, task)
        .await
        .expect("actor stops in time")
        .expect("actor task");

    assert_eq!(events.next_event().await, Some(ListenerEvent::Disconnected));
    peer.expect_eof().await.expect("client closed socket");
    assert_eq!(handle.state(), ConnectionState::Disconnected);
    assert!(handle.is_closed());
    assert_eq!(handle.connect(), Err(ActorClosed));
    assert_eq!(handle.send("late"), Err(ActorClosed));
}

#[rstest]
#[tokio::test]
async fn shutdown_while_disconnected_stops_actor() {
    let server = LineServer::bind().await.expect("bind server");
    let (listener, mut events) = RecordingListener::new();
    let (handle, task) = ConnectionActor::spawn(server.config(), listener);

    handle.shutdown().expect("actor running");
    timeout(JOIN_TIMEOUT, task)
        .await
        .expect("actor stops in time")
        .expect("actor task");

    assert_eq!(events.next_event().await, None);
    assert_eq!(handle.disconnect(), Err(ActorClosed));
}

#[rstest]
#[tokio::test]
async fn commands_queued_behind_shutdown_are_discarded() {
    let server = LineServer::bind().await.expect("bind server");
    let (listener, mut events) = RecordingListener::new();
    let (handle, task) = ConnectionActor::spawn(server.config(), listener);

    handle.shutdown().expect("actor running");
    // Either queued behind the shutdown or rejected outright; never run.
    let _ = handle.connect();
    timeout(JOIN_TIMEOUT, task)
        .await
        .expect("actor stops in time")
        .expect("actor task");

    server.assert_no_connection(Duration::from_millis(200)).await;
    assert_eq!(events.next_event().await, None);
}

#[rstest]
#[tokio::test]
async fn dropping_every_handle_stops_actor() {
    let server = LineServer::bind().await.expect("bind server");
    let (listener, mut events) = RecordingListener::new();
    let (handle, task) = ConnectionActor::spawn(server.config(), listener);

    handle.connect().expect("actor running");
    let mut peer = server.accept().await.expect("client connects");
    assert_eq!(events.next_event().await, Some(ListenerEvent::Connected));

    let observer = handle.state_changes();
    drop(handle);
    timeout(JOIN_TIMEOUT, task)
        .await
        .expect("actor stops in time")
        .expect("actor task");

    assert_eq!(events.next_event().await, Some(ListenerEvent::Disconnected));
    peer.expect_eof().await.expect("client closed socket");
    assert_eq!(*observer.borrow(), ConnectionState::Disconnected);
}

#[rstest]
#[tokio::test]
async fn listener_can_be_replaced() {
    let server = LineServer::bind().await.expect("bind server");
    let (actor, handle) = ConnectionActor::new(server.config());
    assert_eq!(actor.state(), ConnectionState::Disconnected);
    let task = tokio::spawn(actor.run());

    let (listener, mut events) = RecordingListener::new();
    handle.set_listener(listener).expect("actor running");
    handle.connect().expect("actor running");
    let mut peer = server.accept().await.expect("client connects");
    assert_eq!(events.next_event().await, Some(ListenerEvent::Connected));

    peer.write_line("hello").await.expect("write line");
    assert_eq!(
        events.next_event().await,
        Some(ListenerEvent::TextMessage("hello".to_owned()))
    );

    handle.shutdown().expect("actor running");
    timeout(JOIN_TIMEOUT, task)
        .await
        .expect("actor stops in time")
        .expect("actor task");
}
