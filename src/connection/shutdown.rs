//! Disconnect and shutdown handling for the connection actor.

use log::info;

use super::{ConnectionActor, state::ConnectionState};

impl ConnectionActor {
    /// Close the connection if open, publishing `Disconnected` and notifying
    /// the listener.
    pub(super) async fn disconnect(&mut self) {
        if self.link.is_none() {
            info!("already disconnected; ignoring disconnect");
            return;
        }
        self.close_link().await;
    }

    /// Release the link: stop the reader, close the socket, and wait for the
    /// reader to exit before reporting `Disconnected`.
    pub(super) async fn close_link(&mut self) {
        let Some(link) = self.link.take() else {
            return;
        };
        let id = link.id();
        link.close().await;
        self.set_state(ConnectionState::Disconnected);
        info!("disconnected: id={id}");
        self.listener.on_disconnected();
    }

    /// Stop the reader, disconnect, and stop accepting commands.
    pub(super) async fn shutdown(&mut self) {
        info!("shutting down connection actor");
        if let Some(link) = &self.link {
            link.stop_reader();
        }
        self.disconnect().await;
        self.commands.close();
    }
}
