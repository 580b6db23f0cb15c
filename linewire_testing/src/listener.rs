//! Listener that records callbacks for later assertions.

use std::{sync::Arc, time::Duration};

use linewire::{ConnectError, ConnectionListener, SendError};
use tokio::{sync::mpsc, time::timeout};

/// How long [`ListenerEvents::next_event`] waits before giving up.
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// One recorded listener callback. Errors are captured as their display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerEvent {
    Connected,
    Disconnected,
    ConnectError(String),
    SendTextError(String),
    /// An inbound line, without its terminator.
    TextMessage(String),
}

/// [`ConnectionListener`] that forwards every callback into a channel.
#[derive(Debug)]
pub struct RecordingListener {
    events: mpsc::UnboundedSender<ListenerEvent>,
}

impl RecordingListener {
    /// Create a listener and the receiving end of its event stream.
    #[must_use]
    pub fn new() -> (Arc<Self>, ListenerEvents) {
        let (events, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { events }), ListenerEvents { rx })
    }

    fn record(&self, event: ListenerEvent) {
        // The test may have stopped listening; that is not an error here.
        let _ = self.events.send(event);
    }
}

impl ConnectionListener for RecordingListener {
    fn on_connected(&self) { self.record(ListenerEvent::Connected); }

    fn on_disconnected(&self) { self.record(ListenerEvent::Disconnected); }

    fn on_connect_error(&self, error: &ConnectError) {
        self.record(ListenerEvent::ConnectError(error.to_string()));
    }

    fn on_send_text_error(&self, error: &SendError) {
        self.record(ListenerEvent::SendTextError(error.to_string()));
    }

    fn on_text_message(&self, text: &str) {
        self.record(ListenerEvent::TextMessage(text.to_owned()));
    }
}

/// Receiving end of a [`RecordingListener`].
#[derive(Debug)]
pub struct ListenerEvents {
    rx: mpsc::UnboundedReceiver<ListenerEvent>,
}

impl ListenerEvents {
    /// Wait up to [`EVENT_TIMEOUT`] for the next event.
    ///
    /// Returns `None` on timeout or once the listener has been dropped.
    pub async fn next_event(&mut self) -> Option<ListenerEvent> {
        timeout(EVENT_TIMEOUT, self.rx.recv()).await.ok().flatten()
    }

    /// Assert that no event arrives within `wait`.
    ///
    /// # Panics
    ///
    /// Panics if an event is recorded during the wait.
    pub async fn assert_no_event(&mut self, wait: Duration) {
        if let Ok(Some(event)) = timeout(wait, self.rx.recv()).await {
            panic!("unexpected listener event: {event:?}");
        }
    }

    /// Drain every event recorded so far without waiting.
    pub fn drain(&mut self) -> Vec<ListenerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}
