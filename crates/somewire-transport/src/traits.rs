use std::time::Duration;

use bytes::Bytes;

use crate::config::DEFAULT_TIMEOUT;
use crate::error::{Result, TransportError};

/// A datagram channel that moves encoded frames.
///
/// One datagram carries one frame. Transports don't interpret the bytes.
pub trait Transport {
    /// Open the channel. Calling it on an open transport is a no-op.
    fn connect(&mut self) -> Result<()>;

    /// Whether `connect` has succeeded and `close` hasn't been called since.
    fn is_connected(&self) -> bool;

    /// Send one datagram and wait up to `timeout` for one reply.
    fn send(&mut self, datagram: &[u8], timeout: Duration) -> Result<Bytes>;

    /// Wait up to `timeout` for one datagram without sending.
    fn recv(&mut self, timeout: Duration) -> Result<Bytes>;

    /// Release the channel. Safe to call repeatedly.
    fn close(&mut self);

    /// Timeout used by callers that don't pick one.
    fn default_timeout(&self) -> Duration {
        DEFAULT_TIMEOUT
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn connect(&mut self) -> Result<()> {
        (**self).connect()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn send(&mut self, datagram: &[u8], timeout: Duration) -> Result<Bytes> {
        (**self).send(datagram, timeout)
    }

    fn recv(&mut self, timeout: Duration) -> Result<Bytes> {
        (**self).recv(timeout)
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn default_timeout(&self) -> Duration {
        (**self).default_timeout()
    }
}

pub(crate) fn check_timeout(timeout: Duration) -> Result<()> {
    if timeout.is_zero() {
        return Err(TransportError::InvalidTimeout);
    }
    Ok(())
}
