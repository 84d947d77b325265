use std::fmt;

/// `(service_id, method_id)` as one 32-bit value: what is being invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(u32);

impl MessageId {
    pub const fn new(service_id: u16, method_id: u16) -> Self {
        Self(((service_id as u32) << 16) | method_id as u32)
    }

    pub const fn service_id(self) -> u16 {
        (self.0 >> 16) as u16
    }

    pub const fn method_id(self) -> u16 {
        self.0 as u16
    }

    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Big-endian wire representation.
    pub const fn to_be_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl From<u32> for MessageId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<MessageId> for u32 {
    fn from(id: MessageId) -> Self {
        id.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// `(client_id, session_id)` as one 32-bit value: which exchange a frame belongs to.
///
/// Responses carry the request identity of the request they answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u32);

impl RequestId {
    pub const fn new(client_id: u16, session_id: u16) -> Self {
        Self(((client_id as u32) << 16) | session_id as u32)
    }

    pub const fn client_id(self) -> u16 {
        (self.0 >> 16) as u16
    }

    pub const fn session_id(self) -> u16 {
        self.0 as u16
    }

    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Big-endian wire representation.
    pub const fn to_be_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl From<u32> for RequestId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<RequestId> for u32 {
    fn from(id: RequestId) -> Self {
        id.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}
