//! Utilities for exercising a [`ConnectionActor`](linewire::ConnectionActor)
//! against a real loopback peer during tests.
//!
//! [`LineServer`] accepts the actor's connections and lets a test read and
//! write raw lines, while [`RecordingListener`] turns listener callbacks into
//! a stream of [`ListenerEvent`]s that can be awaited in order.
//!
//! ```rust,no_run
//! use linewire::ConnectionActor;
//! use linewire_testing::{LineServer, ListenerEvent, RecordingListener};
//!
//! # async fn example() -> std::io::Result<()> {
//! let server = LineServer::bind().await?;
//! let (listener, mut events) = RecordingListener::new();
//! let (handle, _task) = ConnectionActor::spawn(server.config(), listener);
//! handle.connect().expect("actor running");
//! let mut peer = server.accept().await?;
//! assert_eq!(events.next_event().await, Some(ListenerEvent::Connected));
//! peer.write_line("hello").await?;
//! # Ok(())
//! # }
//! ```

pub mod line_server;
pub mod listener;
pub mod logging;

pub use line_server::{LineServer, PeerConnection, refused_port};
pub use listener::{EVENT_TIMEOUT, ListenerEvent, ListenerEvents, RecordingListener};
pub use logging::{LoggerHandle, logger};
