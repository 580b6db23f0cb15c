//! Optional convenience imports for common `linewire` workflows.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use linewire::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let (handle, _task) =
//!     ConnectionActor::spawn(ConnectionConfig::new("127.0.0.1", 7000), Arc::new(NoopListener));
//! assert_eq!(handle.state(), ConnectionState::Disconnected);
//! # }
//! ```

pub use crate::{
    config::{ConnectionConfig, ReconnectPolicy},
    connection::{ConnectionActor, ConnectionHandle, ConnectionState},
    error::{ActorClosed, ConnectError, SendError},
    listener::{ConnectionListener, NoopListener},
};
