use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use tokio::net::UdpSocket;
use tracing::{debug, trace};

use crate::config::TransportConfig;
use crate::error::{Result, TransportError};
use crate::traits::check_timeout;

/// Tokio counterpart of [`UdpTransport`](crate::UdpTransport).
///
/// Same lifecycle: nothing is opened before `connect`, `connect` on an open
/// transport is a no-op, `close` is repeatable.
#[derive(Debug)]
pub struct AsyncUdpTransport {
    remote: SocketAddr,
    config: TransportConfig,
    socket: Option<UdpSocket>,
}

impl AsyncUdpTransport {
    pub fn new(remote: SocketAddr) -> Self {
        Self::with_config(remote, TransportConfig::default())
    }

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

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }

    pub fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    pub async fn connect(&mut self) -> Result<()> {
        if self.socket.is_some() {
            return Ok(());
        }

        let bind_addr = self.config.bind_addr_for(self.remote);
        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| TransportError::Bind {
                addr: bind_addr,
                source: e,
            })?;
        socket
            .connect(self.remote)
            .await
            .map_err(|e| TransportError::Connect {
                addr: self.remote,
                source: e,
            })?;

        debug!(remote = %self.remote, "async udp transport connected");
        self.socket = Some(socket);
        Ok(())
    }

    /// Send one datagram and wait up to `timeout` for one reply.
    pub async fn send(&mut self, datagram: &[u8], timeout: Duration) -> Result<Bytes> {
        check_timeout(timeout)?;
        self.send_only(datagram).await?;
        self.recv(timeout).await
    }

    /// Send one datagram without waiting for a reply.
    pub async fn send_only(&mut self, datagram: &[u8]) -> Result<()> {
        let socket = self.socket.as_ref().ok_or(TransportError::NotConnected)?;
        let written = socket.send(datagram).await?;
        if written != datagram.len() {
            return Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                format!("short datagram write ({written} of {} bytes)", datagram.len()),
            )));
        }
        trace!(remote = %self.remote, len = written, "sent datagram");
        Ok(())
    }

    /// Wait up to `timeout` for one datagram.
    pub async fn recv(&mut self, timeout: Duration) -> Result<Bytes> {
        check_timeout(timeout)?;
        let socket = self.socket.as_ref().ok_or(TransportError::NotConnected)?;

        let mut buf = vec![0u8; self.config.recv_buffer_size];
        let n = tokio::time::timeout(timeout, socket.recv(&mut buf))
            .await
            .map_err(|_| TransportError::Timeout(timeout))??;
        buf.truncate(n);
        trace!(remote = %self.remote, len = n, "received datagram");
        Ok(Bytes::from(buf))
    }

    pub fn close(&mut self) {
        if self.socket.take().is_some() {
            debug!(remote = %self.remote, "async udp transport closed");
        }
    }

    pub fn default_timeout(&self) -> Duration {
        self.config.default_timeout
    }
}
