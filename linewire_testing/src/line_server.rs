//! Loopback peer used as the remote end of a connection under test.

use std::{
    io,
    net::{Ipv4Addr, SocketAddr, TcpListener as StdTcpListener},
    time::Duration,
};

use linewire::ConnectionConfig;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{
        TcpListener,
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    time::timeout,
};

/// Upper bound on how long the server waits for the client to act.
const PEER_TIMEOUT: Duration = Duration::from_secs(5);

fn timed_out(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::TimedOut, format!("timed out waiting for {what}"))
}

/// TCP listener bound to an ephemeral localhost port.
#[derive(Debug)]
pub struct LineServer {
    listener: TcpListener,
    addr: SocketAddr,
}

impl LineServer {
    /// Bind to `127.0.0.1:0`.
    ///
    /// # Errors
    ///
    /// Returns any IO error raised while binding.
    pub async fn bind() -> io::Result<Self> {
        Self::bind_port(0).await
    }

    /// Bind to a specific localhost port, e.g. one previously returned by
    /// [`refused_port`].
    ///
    /// # Errors
    ///
    /// Returns any IO error raised while binding.
    pub async fn bind_port(port: u16) -> io::Result<Self> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, port)).await?;
        let addr = listener.local_addr()?;
        Ok(Self { listener, addr })
    }

    /// Connection settings pointing at this server with a short timeout.
    #[must_use]
    pub fn config(&self) -> ConnectionConfig {
        ConnectionConfig::new(self.addr.ip().to_string(), self.addr.port())
            .connect_timeout(Some(PEER_TIMEOUT))
    }

    /// Accept the next client connection.
    ///
    /// # Errors
    ///
    /// Returns an error if accepting fails or no client arrives in time.
    pub async fn accept(&self) -> io::Result<PeerConnection> {
        let (stream, _) = timeout(PEER_TIMEOUT, self.listener.accept())
            .await
            .map_err(|_| timed_out("a client connection"))??;
        Ok(PeerConnection::new(stream))
    }

    /// Assert that no client connects within `wait`.
    ///
    /// # Panics
    ///
    /// Panics if a connection is accepted.
    pub async fn assert_no_connection(&self, wait: Duration) {
        if let Ok(accepted) = timeout(wait, self.listener.accept()).await {
            panic!("unexpected connection: {accepted:?}");
        }
    }
}

/// Server side of an accepted connection.
#[derive(Debug)]
pub struct PeerConnection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl PeerConnection {
    fn new(stream: TcpStream) -> Self {
        let (read, write) = stream.into_split();
        Self {
            reader: BufReader::new(read),
            writer: write,
        }
    }

    /// Read the next raw line, including its terminator. `None` signals EOF.
    ///
    /// # Errors
    ///
    /// Returns an error on IO failure or if nothing arrives in time.
    pub async fn next_raw_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let read = timeout(PEER_TIMEOUT, self.reader.read_line(&mut line))
            .await
            .map_err(|_| timed_out("a line"))??;
        Ok((read > 0).then_some(line))
    }

    /// Read the next line with its `\n` terminator removed.
    ///
    /// # Errors
    ///
    /// See [`PeerConnection::next_raw_line`].
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        Ok(self
            .next_raw_line()
            .await?
            .map(|line| line.strip_suffix('\n').unwrap_or(&line).to_owned()))
    }

    /// Wait for the client to close its side of the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the client sends data instead, or does not close
    /// in time.
    pub async fn expect_eof(&mut self) -> io::Result<()> {
        match self.next_raw_line().await? {
            None => Ok(()),
            Some(line) => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("expected EOF, got {line:?}"),
            )),
        }
    }

    /// Write `bytes` verbatim.
    ///
    /// # Errors
    ///
    /// Returns any IO error raised by the socket.
    pub async fn write_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes).await?;
        self.writer.flush().await
    }

    /// Write `text` followed by `\n`.
    ///
    /// # Errors
    ///
    /// Returns any IO error raised by the socket.
    pub async fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.write_raw(format!("{text}\n").as_bytes()).await
    }

    /// Close the server side of the connection.
    ///
    /// # Errors
    ///
    /// Returns any IO error raised while shutting down the write half.
    pub async fn close(mut self) -> io::Result<()> { self.writer.shutdown().await }
}

/// Return a localhost port with nothing listening on it.
///
/// The port is found by binding an ephemeral listener and dropping it, so
/// another process could claim it in between; tests treat that as unlikely.
///
/// # Errors
///
/// Returns any IO error raised while probing for a port.
pub fn refused_port() -> io::Result<u16> {
    let spare = StdTcpListener::bind(SocketAddr::new(Ipv4Addr::LOCALHOST.into(), 0))?;
    Ok(spare.local_addr()?.port())
}
