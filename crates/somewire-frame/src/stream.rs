//! `tokio_util` codec for SOME/IP over byte streams.
//!
//! Stream transports carry frames back to back; the length field is what
//! delimits them. Datagram transports should use
//! [`decode_datagram`](crate::codec::decode_datagram) instead.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_frame, Frame, FrameConfig};
use crate::error::{FrameError, Result};

/// Length-field framed codec producing [`Frame`]s.
#[derive(Debug, Clone, Default)]
pub struct SomeIpCodec {
    config: FrameConfig,
}

impl SomeIpCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FrameConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl Decoder for SomeIpCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        decode_frame(src, self.config.max_payload_size)
    }
}

impl Encoder<Frame> for SomeIpCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<()> {
        if item.payload().len() > self.config.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: item.payload().len(),
                max: self.config.max_payload_size,
            });
        }
        item.encode_into(dst);
        Ok(())
    }
}
