//! Datagram transport for SOME/IP frames.
//!
//! A transport moves already-encoded frames; it never looks inside them.
//! - [`UdpTransport`]: client side, one remote, send-then-await-reply
//! - [`UdpEndpoint`]: server side, receive from and reply to any peer
//! - `AsyncUdpTransport`: tokio variant (behind the `async` feature)
//!
//! Sockets are opened only by an explicit `connect` or `bind`.

pub mod config;
pub mod error;
pub mod traits;
pub mod udp;

#[cfg(feature = "async")]
pub mod async_udp;

pub use config::{TransportConfig, DEFAULT_RECV_BUFFER, DEFAULT_TIMEOUT};
pub use error::{Result, TransportError};
pub use traits::Transport;
pub use udp::{UdpEndpoint, UdpTransport};

#[cfg(feature = "async")]
pub use async_udp::AsyncUdpTransport;
