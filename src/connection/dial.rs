//! Establishing the TCP connection.

use std::{io, net::SocketAddr};

use log::debug;
use tokio::{
    net::{TcpSocket, TcpStream, lookup_host},
    time::timeout,
};

use crate::{config::ConnectionConfig, error::ConnectError, socket_options::SocketOptions};

/// Resolve the configured endpoint and connect to the first address that
/// accepts, within the configured timeout.
pub(super) async fn dial(config: &ConnectionConfig) -> Result<TcpStream, ConnectError> {
    match config.connect_timeout_value() {
        Some(limit) => timeout(limit, open(config))
            .await
            .map_err(|_| ConnectError::Timeout(limit))?,
        None => open(config).await,
    }
}

async fn open(config: &ConnectionConfig) -> Result<TcpStream, ConnectError> {
    let host = config.host_value();
    let port = config.port_value();
    let addrs = lookup_host((host, port))
        .await
        .map_err(|source| ConnectError::Resolve {
            host: host.to_owned(),
            port,
            source,
        })?;

    let mut last_error = None;
    for addr in addrs {
        match connect_addr(addr, config.socket()).await {
            Ok(stream) => return Ok(stream),
            Err(err) => {
                debug!("connect attempt failed: addr={addr}, error={err}");
                last_error = Some(err);
            }
        }
    }

    Err(last_error.map_or_else(
        || ConnectError::NoAddresses {
            host: host.to_owned(),
            port,
        },
        ConnectError::Io,
    ))
}

async fn connect_addr(addr: SocketAddr, options: &SocketOptions) -> io::Result<TcpStream> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    options.apply(&socket)?;
    socket.connect(addr).await
}
