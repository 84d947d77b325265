use somewire_frame::{MessageId, RequestId};

/// Errors that can occur in peer operations.
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    /// Transport-level error, including timeouts.
    #[error("transport error: {0}")]
    Transport(#[from] somewire_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] somewire_frame::FrameError),

    /// The reply does not belong to the request that was sent.
    #[error("unexpected reply: expected {expected_message}/{expected_request}, got {message}/{request}")]
    UnexpectedReply {
        expected_message: MessageId,
        expected_request: RequestId,
        message: MessageId,
        request: RequestId,
    },

    /// The frame's message type is never answered, so there is nothing to wait for.
    #[error("message type 0x{0:02X} does not expect a response")]
    NoResponseExpected(u8),
}

pub type Result<T> = std::result::Result<T, PeerError>;
