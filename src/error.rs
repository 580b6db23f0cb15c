//! Error types reported by the connection actor and its reader loop.
//!
//! None of these errors propagate out of the actor. Connection and send
//! failures are handed to the [`ConnectionListener`](crate::ConnectionListener);
//! read and close failures are logged.

use std::{io, time::Duration};

use thiserror::Error;
use tokio_util::codec::LinesCodecError;

/// Failure to establish the TCP connection.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The host name could not be resolved.
    #[error("failed to resolve {host}:{port}: {source}")]
    Resolve {
        /// Host that failed to resolve.
        host: String,
        /// Port paired with the host.
        port: u16,
        /// Underlying resolver error.
        #[source]
        source: io::Error,
    },
    /// Resolution succeeded but produced no socket addresses.
    #[error("{host}:{port} resolved to no addresses")]
    NoAddresses {
        /// Host that was resolved.
        host: String,
        /// Port paired with the host.
        port: u16,
    },
    /// Every resolved address refused or failed the connection.
    #[error("connection failed: {0}")]
    Io(#[from] io::Error),
    /// The attempt did not finish within the configured timeout.
    #[error("connection attempt timed out after {0:?}")]
    Timeout(Duration),
}

/// Failure to deliver an outbound line.
#[derive(Debug, Error)]
pub enum SendError {
    /// Writing or flushing the line failed. The connection stays open.
    #[error("failed to write line: {0}")]
    Io(#[from] io::Error),
    /// The connection could not be re-established before sending.
    #[error("not connected after {attempts} reconnect attempts")]
    NotConnected {
        /// Connect attempts made on behalf of this line.
        attempts: u32,
    },
}

impl From<LinesCodecError> for SendError {
    fn from(err: LinesCodecError) -> Self {
        match err {
            LinesCodecError::Io(e) => Self::Io(e),
            LinesCodecError::MaxLineLengthExceeded => {
                Self::Io(io::Error::new(io::ErrorKind::InvalidInput, err))
            }
        }
    }
}

/// Failure while reading inbound lines.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The socket read failed.
    #[error("failed to read line: {0}")]
    Io(#[from] io::Error),
    /// A line exceeded the configured maximum and was discarded.
    #[error("line exceeded maximum length of {max} bytes")]
    LineTooLong {
        /// Configured maximum line length in bytes.
        max: usize,
    },
}

impl ReadError {
    /// Returns `true` if reading can continue after this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool { matches!(self, Self::LineTooLong { .. }) }
}

/// Returned by [`ConnectionHandle`](crate::ConnectionHandle) methods once the
/// actor has stopped accepting commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("connection actor has stopped")]
pub struct ActorClosed;
