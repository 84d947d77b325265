use crate::header::Field;

/// Errors that can occur while building, encoding or decoding frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A header field value does not fit its fixed wire width.
    #[error("{field} must be {width} {}", byte_unit(.width))]
    MalformedField { field: Field, width: usize },

    /// Fewer than 16 bytes were supplied to the decoder.
    #[error("truncated header ({len} bytes, need {})", crate::codec::HEADER_SIZE)]
    TruncatedHeader { len: usize },

    /// The length field disagrees with the bytes actually present.
    #[error("length field {length} does not match {available} bytes following it")]
    LengthMismatch { length: u32, available: usize },

    /// Bytes remain after the frame implied by the length field.
    #[error("{extra} trailing bytes after frame")]
    TrailingBytes { extra: usize },

    /// The payload cannot be represented by the length field, or exceeds a configured limit.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error surfaced through a stream codec.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn byte_unit(width: &usize) -> &'static str {
    if *width == 1 {
        "byte"
    } else {
        "bytes"
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
