//! Metric helpers for `linewire`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! the helpers compile to no-ops.

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

/// Name of the gauge tracking open connections.
pub const CONNECTIONS_ACTIVE: &str = "linewire_connections_active";
/// Name of the counter tracking lines sent and received.
pub const LINES_TOTAL: &str = "linewire_lines_total";
/// Name of the counter tracking error occurrences.
pub const ERRORS_TOTAL: &str = "linewire_errors_total";

/// Direction of a line relative to this client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Lines read from the peer.
    Inbound,
    /// Lines written to the peer.
    Outbound,
}

impl Direction {
    #[cfg_attr(not(feature = "metrics"), expect(dead_code, reason = "only used for labels"))]
    fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

/// Category of a recorded error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Establishing the connection failed.
    Connect,
    /// Writing a line failed or a line was dropped while disconnected.
    Send,
    /// Reading from the socket failed.
    Read,
    /// Closing the socket failed.
    Close,
}

impl ErrorKind {
    #[cfg_attr(not(feature = "metrics"), expect(dead_code, reason = "only used for labels"))]
    fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Connect => "connect",
            ErrorKind::Send => "send",
            ErrorKind::Read => "read",
            ErrorKind::Close => "close",
        }
    }
}

/// Increment the open connections gauge.
#[cfg(feature = "metrics")]
pub fn inc_connections() { gauge!(CONNECTIONS_ACTIVE).increment(1.0); }

/// Decrement the open connections gauge.
#[cfg(feature = "metrics")]
pub fn dec_connections() { gauge!(CONNECTIONS_ACTIVE).decrement(1.0); }

/// Record a line for the given direction.
#[cfg(feature = "metrics")]
pub fn inc_lines(direction: Direction) {
    counter!(LINES_TOTAL, "direction" => direction.as_str()).increment(1);
}

/// Record an error occurrence.
#[cfg(feature = "metrics")]
pub fn inc_errors(kind: ErrorKind) {
    counter!(ERRORS_TOTAL, "kind" => kind.as_str()).increment(1);
}

/// Increment the open connections gauge.
#[cfg(not(feature = "metrics"))]
pub fn inc_connections() {}

/// Decrement the open connections gauge.
#[cfg(not(feature = "metrics"))]
pub fn dec_connections() {}

/// Record a line for the given direction.
#[cfg(not(feature = "metrics"))]
pub fn inc_lines(_direction: Direction) {}

/// Record an error occurrence.
#[cfg(not(feature = "metrics"))]
pub fn inc_errors(_kind: ErrorKind) {}
