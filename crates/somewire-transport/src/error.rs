use std::net::SocketAddr;
use std::time::Duration;

/// Errors that can occur in datagram transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to bind the local socket.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Failed to associate the socket with the remote address.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// An operation needed an open socket but `connect` was never called, or `close` was.
    #[error("transport not connected")]
    NotConnected,

    /// No datagram arrived within the timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// A zero timeout was supplied.
    #[error("timeout must be greater than zero")]
    InvalidTimeout,

    /// An I/O error occurred on the socket.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
