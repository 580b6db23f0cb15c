#![doc(html_root_url = "https://docs.rs/linewire/latest")]
//! Public API for the `linewire` library.
//!
//! This crate manages one client TCP connection exchanging newline-delimited
//! UTF-8 text. A [`ConnectionActor`] serialises connect, disconnect, send, and
//! shutdown through a single command queue, while a background reader task
//! forwards each inbound line back into that queue. Applications observe the
//! connection through a [`ConnectionListener`].

pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
pub mod listener;
pub mod metrics;
pub mod prelude;
mod socket_options;

pub use config::{ConfigError, ConnectionConfig, ReconnectPolicy};
pub use connection::{ConnectionActor, ConnectionHandle, ConnectionId, ConnectionState};
pub use error::{ActorClosed, ConnectError, ReadError, SendError};
pub use listener::{ConnectionListener, NoopListener, SharedListener};
pub use socket_options::SocketOptions;
