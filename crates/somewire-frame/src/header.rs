use std::fmt;

use crate::error::{FrameError, Result};
use crate::identity::{MessageId, RequestId};
use crate::kind::{message_type_name, return_code_name, E_OK, PROTOCOL_VERSION, REQUEST};

/// A fixed-width field of the header, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    ServiceId,
    MethodId,
    Length,
    ClientId,
    SessionId,
    ProtocolVersion,
    InterfaceVersion,
    MessageType,
    ReturnCode,
}

impl Field {
    /// All fields in wire order.
    pub const ALL: [Field; 9] = [
        Field::ServiceId,
        Field::MethodId,
        Field::Length,
        Field::ClientId,
        Field::SessionId,
        Field::ProtocolVersion,
        Field::InterfaceVersion,
        Field::MessageType,
        Field::ReturnCode,
    ];

    /// Width of the field on the wire, in bytes.
    pub const fn width(self) -> usize {
        match self {
            Field::ServiceId | Field::MethodId | Field::ClientId | Field::SessionId => 2,
            Field::Length => 4,
            Field::ProtocolVersion
            | Field::InterfaceVersion
            | Field::MessageType
            | Field::ReturnCode => 1,
        }
    }

    /// Byte offset of the field within the header.
    pub const fn offset(self) -> usize {
        match self {
            Field::ServiceId => 0,
            Field::MethodId => 2,
            Field::Length => 4,
            Field::ClientId => 8,
            Field::SessionId => 10,
            Field::ProtocolVersion => 12,
            Field::InterfaceVersion => 13,
            Field::MessageType => 14,
            Field::ReturnCode => 15,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Field::ServiceId => "service_id",
            Field::MethodId => "method_id",
            Field::Length => "length",
            Field::ClientId => "client_id",
            Field::SessionId => "session_id",
            Field::ProtocolVersion => "protocol_version",
            Field::InterfaceVersion => "interface_version",
            Field::MessageType => "message_type",
            Field::ReturnCode => "return_code",
        }
    }

    fn malformed(self) -> FrameError {
        FrameError::MalformedField {
            field: self,
            width: self.width(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The structured 16-byte frame prologue.
///
/// A `Header` is a validated value: every field is known to fit its wire
/// width. The `length` field is not part of it; it is derived from the
/// payload whenever a frame is encoded. To change a field, go through
/// [`Header::to_builder`] so the whole header is validated again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
    service_id: u16,
    method_id: u16,
    client_id: u16,
    session_id: u16,
    protocol_version: u8,
    interface_version: u8,
    message_type: u8,
    return_code: u8,
}

impl Header {
    /// Start building a header with protocol defaults.
    pub fn builder() -> HeaderBuilder {
        HeaderBuilder::default()
    }

    /// A builder seeded with this header's fields.
    pub fn to_builder(&self) -> HeaderBuilder {
        HeaderBuilder {
            service_id: self.service_id.into(),
            method_id: self.method_id.into(),
            client_id: self.client_id.into(),
            session_id: self.session_id.into(),
            protocol_version: self.protocol_version.into(),
            interface_version: self.interface_version.into(),
            message_type: self.message_type.into(),
            return_code: self.return_code.into(),
            malformed: None,
        }
    }

    pub fn service_id(&self) -> u16 {
        self.service_id
    }

    pub fn method_id(&self) -> u16 {
        self.method_id
    }

    pub fn client_id(&self) -> u16 {
        self.client_id
    }

    pub fn session_id(&self) -> u16 {
        self.session_id
    }

    pub fn protocol_version(&self) -> u8 {
        self.protocol_version
    }

    pub fn interface_version(&self) -> u8 {
        self.interface_version
    }

    pub fn message_type(&self) -> u8 {
        self.message_type
    }

    pub fn return_code(&self) -> u8 {
        self.return_code
    }

    /// The message identity `(service_id, method_id)`.
    pub fn message_id(&self) -> MessageId {
        MessageId::new(self.service_id, self.method_id)
    }

    /// The request identity `(client_id, session_id)`.
    pub fn request_id(&self) -> RequestId {
        RequestId::new(self.client_id, self.session_id)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "message={} request={} proto={} iface={} type={} rc={}",
            self.message_id(),
            self.request_id(),
            self.protocol_version,
            self.interface_version,
            message_type_name(self.message_type),
            return_code_name(self.return_code),
        )
    }
}

/// Builds a [`Header`], validating every field at once in [`HeaderBuilder::build`].
///
/// Values are taken as wide integers so that out-of-range input is reported
/// as [`FrameError::MalformedField`] instead of being truncated.
#[derive(Debug, Clone)]
pub struct HeaderBuilder {
    service_id: u64,
    method_id: u64,
    client_id: u64,
    session_id: u64,
    protocol_version: u64,
    interface_version: u64,
    message_type: u64,
    return_code: u64,
    malformed: Option<Field>,
}

impl Default for HeaderBuilder {
    fn default() -> Self {
        Self {
            service_id: 0,
            method_id: 0,
            client_id: 0,
            session_id: 0,
            protocol_version: PROTOCOL_VERSION.into(),
            interface_version: 0,
            message_type: REQUEST.into(),
            return_code: E_OK.into(),
            malformed: None,
        }
    }
}

impl HeaderBuilder {
    pub fn service_id(self, value: u64) -> Self {
        self.set(Field::ServiceId, value)
    }

    pub fn method_id(self, value: u64) -> Self {
        self.set(Field::MethodId, value)
    }

    pub fn client_id(self, value: u64) -> Self {
        self.set(Field::ClientId, value)
    }

    pub fn session_id(self, value: u64) -> Self {
        self.set(Field::SessionId, value)
    }

    pub fn protocol_version(self, value: u64) -> Self {
        self.set(Field::ProtocolVersion, value)
    }

    pub fn interface_version(self, value: u64) -> Self {
        self.set(Field::InterfaceVersion, value)
    }

    pub fn message_type(self, value: u64) -> Self {
        self.set(Field::MessageType, value)
    }

    pub fn return_code(self, value: u64) -> Self {
        self.set(Field::ReturnCode, value)
    }

    /// Set service and method id from a message identity.
    pub fn message_id(self, id: MessageId) -> Self {
        self.service_id(id.service_id().into())
            .method_id(id.method_id().into())
    }

    /// Set client and session id from a request identity.
    pub fn request_id(self, id: RequestId) -> Self {
        self.client_id(id.client_id().into())
            .session_id(id.session_id().into())
    }

    /// Set a field by name.
    ///
    /// `Field::Length` is accepted and ignored: the length is always derived
    /// from the payload at encode time.
    pub fn set(mut self, field: Field, value: u64) -> Self {
        match field {
            Field::ServiceId => self.service_id = value,
            Field::MethodId => self.method_id = value,
            Field::Length => {}
            Field::ClientId => self.client_id = value,
            Field::SessionId => self.session_id = value,
            Field::ProtocolVersion => self.protocol_version = value,
            Field::InterfaceVersion => self.interface_version = value,
            Field::MessageType => self.message_type = value,
            Field::ReturnCode => self.return_code = value,
        }
        self
    }

    /// Set a field from its big-endian byte representation.
    ///
    /// The slice must be exactly the field's wire width; anything else makes
    /// [`HeaderBuilder::build`] fail with `MalformedField` for that field.
    pub fn field_bytes(self, field: Field, bytes: &[u8]) -> Self {
        if bytes.len() != field.width() {
            return self.mark_malformed(field);
        }
        let value = bytes
            .iter()
            .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));
        self.set(field, value)
    }

    /// Validate all fields and produce the header.
    pub fn build(self) -> Result<Header> {
        if let Some(field) = self.malformed {
            return Err(field.malformed());
        }
        Ok(Header {
            service_id: narrow(Field::ServiceId, self.service_id)?,
            method_id: narrow(Field::MethodId, self.method_id)?,
            client_id: narrow(Field::ClientId, self.client_id)?,
            session_id: narrow(Field::SessionId, self.session_id)?,
            protocol_version: narrow(Field::ProtocolVersion, self.protocol_version)?,
            interface_version: narrow(Field::InterfaceVersion, self.interface_version)?,
            message_type: narrow(Field::MessageType, self.message_type)?,
            return_code: narrow(Field::ReturnCode, self.return_code)?,
        })
    }

    fn mark_malformed(mut self, field: Field) -> Self {
        self.malformed.get_or_insert(field);
        self
    }
}

fn narrow<T: TryFrom<u64>>(field: Field, value: u64) -> Result<T> {
    T::try_from(value).map_err(|_| field.malformed())
}
