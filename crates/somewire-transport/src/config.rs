use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

/// Default receive buffer: large enough for any UDP datagram.
pub const DEFAULT_RECV_BUFFER: usize = 64 * 1024;

/// Default time to wait for a reply.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for datagram transports.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Local address to bind before connecting. Default: `0.0.0.0:0`.
    ///
    /// An unspecified IPv4 address is switched to `[::]` when the remote is IPv6.
    pub bind_addr: SocketAddr,
    /// Size of the buffer a single datagram is received into.
    pub recv_buffer_size: usize,
    /// Timeout used when a caller doesn't supply one.
    pub default_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 0)),
            recv_buffer_size: DEFAULT_RECV_BUFFER,
            default_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// The address to bind for talking to `remote`.
    pub fn bind_addr_for(&self, remote: SocketAddr) -> SocketAddr {
        if self.bind_addr.ip().is_unspecified() && self.bind_addr.is_ipv4() != remote.is_ipv4() {
            let unspecified: IpAddr = if remote.is_ipv4() {
                Ipv4Addr::UNSPECIFIED.into()
            } else {
                Ipv6Addr::UNSPECIFIED.into()
            };
            SocketAddr::new(unspecified, self.bind_addr.port())
        } else {
            self.bind_addr
        }
    }
}
