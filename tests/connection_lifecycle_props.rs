//! Property tests over arbitrary connect/disconnect sequences.
//!
//! After every step the actor must be `Connected` exactly when the peer holds
//! an open socket with a live reader behind it, and `Disconnected` exactly
//! when the previous socket has been closed.

use std::time::Duration;

use linewire::{ConnectionActor, ConnectionState};
use linewire_testing::{LineServer, ListenerEvent, PeerConnection, RecordingListener};
use proptest::prelude::*;

#[derive(Clone, Copy, Debug)]
enum Step {
    Connect,
    Disconnect,
}

fn step() -> impl Strategy<Value = Step> { prop_oneof![Just(Step::Connect), Just(Step::Disconnect)] }

async fn run_steps(steps: &[Step]) {
    let server = LineServer::bind().await.expect("bind server");
    let (listener, mut events) = RecordingListener::new();
    let (handle, task) = ConnectionActor::spawn(server.config(), listener);
    let mut peer: Option<PeerConnection> = None;

    for (n, step) in steps.iter().enumerate() {
        match step {
            Step::Connect => {
                handle.connect().expect("actor running");
                if peer.is_none() {
                    peer = Some(server.accept().await.expect("client connects"));
                    assert_eq!(events.next_event().await, Some(ListenerEvent::Connected));
                }
            }
            Step::Disconnect => {
                handle.disconnect().expect("actor running");
                if let Some(mut closed) = peer.take() {
                    assert_eq!(events.next_event().await, Some(ListenerEvent::Disconnected));
                    closed.expect_eof().await.expect("client closed socket");
                }
            }
        }

        match peer.as_mut() {
            Some(open) => {
                assert_eq!(handle.state(), ConnectionState::Connected);
                // Queued behind the step's command, so it also proves the
                // command has been handled.
                let marker = format!("step-{n}");
                open.write_line(&marker).await.expect("write line");
                assert_eq!(
                    events.next_event().await,
                    Some(ListenerEvent::TextMessage(marker))
                );
            }
            None => assert_eq!(handle.state(), ConnectionState::Disconnected),
        }
    }

    handle.shutdown().expect("actor running");
    task.await.expect("actor task");
    let expected = if peer.is_some() {
        vec![ListenerEvent::Disconnected]
    } else {
        Vec::new()
    };
    assert_eq!(events.drain(), expected);
    server.assert_no_connection(Duration::from_millis(20)).await;
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn state_tracks_socket_for_any_sequence(steps in prop::collection::vec(step(), 1..10)) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("build runtime");
        rt.block_on(run_steps(&steps));
    }
}
