//! Socket options applied before connecting.

use std::{io, time::Duration};

use socket2::{SockRef, TcpKeepalive};
use tokio::net::TcpSocket;

/// Socket options applied to the TCP socket before each connection attempt.
///
/// Options left unset keep the operating system defaults.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use linewire::SocketOptions;
///
/// let options = SocketOptions::default()
///     .nodelay(true)
///     .keepalive(Some(Duration::from_secs(30)));
/// assert_ne!(options, SocketOptions::default());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SocketOptions {
    nodelay: Option<bool>,
    keepalive: Option<Toggle>,
    linger: Option<Toggle>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Toggle {
    Disabled,
    Duration(Duration),
}

impl Toggle {
    fn from_option(value: Option<Duration>) -> Self {
        value.map_or(Self::Disabled, Self::Duration)
    }

    const fn to_option(self) -> Option<Duration> {
        match self {
            Self::Disabled => None,
            Self::Duration(value) => Some(value),
        }
    }
}

impl SocketOptions {
    /// Configure `TCP_NODELAY`.
    #[must_use]
    pub fn nodelay(mut self, enabled: bool) -> Self {
        self.nodelay = Some(enabled);
        self
    }

    /// Configure `SO_KEEPALIVE`; `None` disables keepalive.
    #[must_use]
    pub fn keepalive(mut self, idle: Option<Duration>) -> Self {
        self.keepalive = Some(Toggle::from_option(idle));
        self
    }

    /// Configure `SO_LINGER`; `None` disables lingering on close.
    #[must_use]
    pub fn linger(mut self, duration: Option<Duration>) -> Self {
        self.linger = Some(Toggle::from_option(duration));
        self
    }

    pub(crate) fn apply(&self, socket: &TcpSocket) -> io::Result<()> {
        if let Some(enabled) = self.nodelay {
            socket.set_nodelay(enabled)?;
        }
        if let Some(keepalive) = self.keepalive {
            match keepalive.to_option() {
                Some(idle) => {
                    socket.set_keepalive(true)?;
                    SockRef::from(socket).set_tcp_keepalive(&TcpKeepalive::new().with_time(idle))?;
                }
                None => socket.set_keepalive(false)?,
            }
        }
        if let Some(linger) = self.linger {
            SockRef::from(socket).set_linger(linger.to_option())?;
        }
        Ok(())
    }
}
