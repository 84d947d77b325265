//! SOME/IP header codec.
//!
//! Every message starts with a fixed 16-byte header, all integers big-endian:
//! - service id and method id (the message identity)
//! - a 4-byte length covering everything after it, `8 + payload.len()`
//! - client id and session id (the request identity)
//! - protocol version, interface version, message type, return code
//!
//! The codec is pure: no I/O, no shared state. Bytes in, validated frames
//! out, or a typed error.

pub mod codec;
pub mod error;
pub mod header;
pub mod identity;
pub mod kind;
#[cfg(feature = "async")]
pub mod stream;

pub use codec::{
    decode_datagram, decode_datagram_with_limit, decode_frame, encode_frame, length_for_payload,
    Frame, FrameConfig, DEFAULT_MAX_PAYLOAD, HEADER_SIZE, LENGTH_COVERED, MAX_PAYLOAD,
};
pub use error::{FrameError, Result};
pub use header::{Field, Header, HeaderBuilder};
pub use identity::{MessageId, RequestId};
pub use kind::{
    message_type_name, return_code_name, ERROR, NOTIFICATION, PROTOCOL_VERSION, REQUEST,
    REQUEST_NO_RETURN, RESPONSE,
};
#[cfg(feature = "async")]
pub use stream::SomeIpCodec;
