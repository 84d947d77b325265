use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info, trace};

use crate::config::TransportConfig;
use crate::error::{Result, TransportError};
use crate::traits::{check_timeout, Transport};

/// Client side of a UDP exchange, bound to one remote address.
///
/// Nothing is opened until [`Transport::connect`] is called.
#[derive(Debug)]
pub struct UdpTransport {
    remote: SocketAddr,
    config: TransportConfig,
    socket: Option<UdpSocket>,
}

impl UdpTransport {
    /// Create a transport for `remote` with default configuration.
    pub fn new(remote: SocketAddr) -> Self {
        Self::with_config(remote, TransportConfig::default())
    }

    /// Create a transport for `remote` with explicit configuration.
    pub fn with_config(remote: SocketAddr, config: TransportConfig) -> Self {
        Self {
            remote,
            config,
            socket: None,
        }
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    /// Local address of the open socket, if connected.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Send one datagram without waiting for a reply.
    pub fn send_only(&mut self, datagram: &[u8]) -> Result<()> {
        let socket = self.socket()?;
        write_datagram(datagram.len(), socket.send(datagram))?;
        trace!(remote = %self.remote, len = datagram.len(), "sent datagram");
        Ok(())
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        "udp"
    }

    fn socket(&self) -> Result<&UdpSocket> {
        self.socket.as_ref().ok_or(TransportError::NotConnected)
    }
}

impl Transport for UdpTransport {
    fn connect(&mut self) -> Result<()> {
        if self.socket.is_some() {
            return Ok(());
        }

        let bind_addr = self.config.bind_addr_for(self.remote);
        let socket = UdpSocket::bind(bind_addr).map_err(|e| TransportError::Bind {
            addr: bind_addr,
            source: e,
        })?;
        socket.connect(self.remote).map_err(|e| TransportError::Connect {
            addr: self.remote,
            source: e,
        })?;

        debug!(remote = %self.remote, local = ?socket.local_addr().ok(), "udp transport connected");
        self.socket = Some(socket);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    fn send(&mut self, datagram: &[u8], timeout: Duration) -> Result<Bytes> {
        check_timeout(timeout)?;
        self.send_only(datagram)?;
        self.recv(timeout)
    }

    fn recv(&mut self, timeout: Duration) -> Result<Bytes> {
        check_timeout(timeout)?;
        let socket = self.socket()?;
        socket.set_read_timeout(Some(timeout))?;

        let mut buf = vec![0u8; self.config.recv_buffer_size];
        match socket.recv(&mut buf) {
            Ok(n) => {
                buf.truncate(n);
                trace!(remote = %self.remote, len = n, "received datagram");
                Ok(Bytes::from(buf))
            }
            Err(err) => Err(read_error(err, timeout)),
        }
    }

    fn close(&mut self) {
        if self.socket.take().is_some() {
            debug!(remote = %self.remote, "udp transport closed");
        }
    }

    fn default_timeout(&self) -> Duration {
        self.config.default_timeout
    }
}

/// Receiving side: a bound UDP socket answering any number of peers.
#[derive(Debug)]
pub struct UdpEndpoint {
    socket: UdpSocket,
    config: TransportConfig,
}

impl UdpEndpoint {
    /// Bind to `addr` with default configuration.
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        Self::bind_with_config(addr, TransportConfig::default())
    }

    /// Bind to `addr` with explicit configuration. `config.bind_addr` is ignored.
    pub fn bind_with_config(addr: SocketAddr, config: TransportConfig) -> Result<Self> {
        let socket = UdpSocket::bind(addr).map_err(|e| TransportError::Bind { addr, source: e })?;
        info!(addr = ?socket.local_addr().ok(), "listening on udp");
        Ok(Self { socket, config })
    }

    /// The address actually bound (useful after binding port 0).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().map_err(Into::into)
    }

    /// Wait for one datagram. `None` blocks indefinitely.
    pub fn recv_from(&self, timeout: Option<Duration>) -> Result<(Bytes, SocketAddr)> {
        if let Some(timeout) = timeout {
            check_timeout(timeout)?;
        }
        self.socket.set_read_timeout(timeout)?;

        let mut buf = vec![0u8; self.config.recv_buffer_size];
        match self.socket.recv_from(&mut buf) {
            Ok((n, peer)) => {
                buf.truncate(n);
                trace!(%peer, len = n, "received datagram");
                Ok((Bytes::from(buf), peer))
            }
            Err(err) => Err(read_error(err, timeout.unwrap_or_default())),
        }
    }

    /// Send one datagram to `peer`.
    pub fn send_to(&self, datagram: &[u8], peer: SocketAddr) -> Result<()> {
        write_datagram(datagram.len(), self.socket.send_to(datagram, peer))?;
        trace!(%peer, len = datagram.len(), "sent datagram");
        Ok(())
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        "udp"
    }
}

fn write_datagram(expected: usize, written: std::io::Result<usize>) -> Result<()> {
    let written = written?;
    if written != expected {
        return Err(TransportError::Io(std::io::Error::new(
            ErrorKind::WriteZero,
            format!("short datagram write ({written} of {expected} bytes)"),
        )));
    }
    Ok(())
}

fn read_error(err: std::io::Error, timeout: Duration) -> TransportError {
    match err.kind() {
        ErrorKind::WouldBlock | ErrorKind::TimedOut => TransportError::Timeout(timeout),
        _ => TransportError::Io(err),
    }
}
