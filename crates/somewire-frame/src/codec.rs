use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::debug;

use crate::error::{FrameError, Result};
use crate::header::{Field, Header, HeaderBuilder};
use crate::identity::{MessageId, RequestId};

/// Header size: eight fixed fields, 16 bytes.
pub const HEADER_SIZE: usize = 16;

/// Header bytes covered by the length field (everything after it).
pub const LENGTH_COVERED: usize = 8;

/// Largest payload the 32-bit length field can describe.
pub const MAX_PAYLOAD: usize = u32::MAX as usize - LENGTH_COVERED;

/// Default payload budget for stream decoding: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// One complete wire message: header plus payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    header: Header,
    payload: Bytes,
}

impl Frame {
    /// Create a frame, checking that the payload fits the length field.
    pub fn new(header: Header, payload: impl Into<Bytes>) -> Result<Self> {
        let payload = payload.into();
        length_for_payload(payload.len())?;
        Ok(Self { header, payload })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn into_parts(self) -> (Header, Bytes) {
        (self.header, self.payload)
    }

    /// A new frame with the same header and a different payload.
    pub fn with_payload(&self, payload: impl Into<Bytes>) -> Result<Self> {
        Self::new(self.header, payload)
    }

    /// The value of the length field: `8 + payload.len()`.
    pub fn length(&self) -> u32 {
        (LENGTH_COVERED + self.payload.len()) as u32
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    pub fn message_id(&self) -> MessageId {
        self.header.message_id()
    }

    pub fn request_id(&self) -> RequestId {
        self.header.request_id()
    }

    /// Encode into a fresh buffer.
    pub fn encode(&self) -> Bytes {
        let mut dst = BytesMut::with_capacity(self.wire_size());
        self.encode_into(&mut dst);
        dst.freeze()
    }

    /// Append the wire form to `dst`.
    pub fn encode_into(&self, dst: &mut BytesMut) {
        dst.reserve(self.wire_size());
        put_header(&self.header, self.length(), dst);
        dst.put_slice(&self.payload);
    }
}

/// Compute the length field for a payload of `payload_len` bytes.
pub fn length_for_payload(payload_len: usize) -> Result<u32> {
    if payload_len > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: MAX_PAYLOAD,
        });
    }
    Ok((LENGTH_COVERED + payload_len) as u32)
}

/// Encode a header and payload into the wire format.
///
/// Wire format (all integers big-endian):
/// ```text
/// ┌────────────┬───────────┬────────────┬───────────┬────────────┬───────┬───────┬──────┬──────┬─────────┐
/// │ Service(2) │ Method(2) │ Length(4)  │ Client(2) │ Session(2) │ Proto │ Iface │ Type │ RC   │ Payload │
/// │            │           │ 8 + N      │           │            │ (1)   │ (1)   │ (1)  │ (1)  │ (N)     │
/// └────────────┴───────────┴────────────┴───────────┴────────────┴───────┴───────┴──────┴──────┴─────────┘
/// ```
///
/// The length field is always recomputed from `payload`.
pub fn encode_frame(header: &Header, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let length = length_for_payload(payload.len())?;
    dst.reserve(HEADER_SIZE + payload.len());
    put_header(header, length, dst);
    dst.put_slice(payload);
    Ok(())
}

fn put_header(header: &Header, length: u32, dst: &mut BytesMut) {
    dst.put_u16(header.service_id());
    dst.put_u16(header.method_id());
    dst.put_u32(length);
    dst.put_u16(header.client_id());
    dst.put_u16(header.session_id());
    dst.put_u8(header.protocol_version());
    dst.put_u8(header.interface_version());
    dst.put_u8(header.message_type());
    dst.put_u8(header.return_code());
}

/// Unpack the prologue into a builder (not yet validated) and the raw length field.
fn read_header(mut src: &[u8]) -> (HeaderBuilder, u32) {
    let service_id = src.get_u16();
    let method_id = src.get_u16();
    let length = src.get_u32();
    let builder = Header::builder()
        .set(Field::ServiceId, service_id.into())
        .set(Field::MethodId, method_id.into())
        .set(Field::ClientId, src.get_u16().into())
        .set(Field::SessionId, src.get_u16().into())
        .set(Field::ProtocolVersion, src.get_u8().into())
        .set(Field::InterfaceVersion, src.get_u8().into())
        .set(Field::MessageType, src.get_u8().into())
        .set(Field::ReturnCode, src.get_u8().into());
    (builder, length)
}

/// Payload size implied by a length field, or `LengthMismatch` if it is below 8.
fn implied_payload_len(length: u32, available: usize) -> Result<usize> {
    (length as usize)
        .checked_sub(LENGTH_COVERED)
        .ok_or(FrameError::LengthMismatch { length, available })
}

/// Decode exactly one frame from one datagram.
///
/// The input must hold exactly `16 + (length - 8)` bytes: short input is
/// `TruncatedHeader` or `LengthMismatch`, extra input is `TrailingBytes`.
pub fn decode_datagram(src: &[u8]) -> Result<Frame> {
    decode_datagram_with_limit(src, MAX_PAYLOAD)
}

/// [`decode_datagram`] with an explicit payload budget.
pub fn decode_datagram_with_limit(src: &[u8], max_payload: usize) -> Result<Frame> {
    if src.len() < HEADER_SIZE {
        debug!(len = src.len(), "rejecting truncated datagram");
        return Err(FrameError::TruncatedHeader { len: src.len() });
    }

    let (builder, length) = read_header(&src[..HEADER_SIZE]);
    let available = src.len() - (HEADER_SIZE - LENGTH_COVERED);
    let payload_len = implied_payload_len(length, available)?;

    if payload_len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    let end = HEADER_SIZE
        .checked_add(payload_len)
        .ok_or(FrameError::LengthMismatch { length, available })?;
    if src.len() < end {
        debug!(length, available, "rejecting datagram shorter than length field");
        return Err(FrameError::LengthMismatch { length, available });
    }
    if src.len() > end {
        debug!(length, extra = src.len() - end, "rejecting datagram with trailing bytes");
        return Err(FrameError::TrailingBytes {
            extra: src.len() - end,
        });
    }

    let header = builder.build()?;
    Ok(Frame {
        header,
        payload: Bytes::copy_from_slice(&src[HEADER_SIZE..end]),
    })
}

/// Decode a frame from a stream buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Frame>> {
    if src.len() < HEADER_SIZE {
        return Ok(None);
    }

    let (builder, length) = read_header(&src[..HEADER_SIZE]);
    let available = src.len() - (HEADER_SIZE - LENGTH_COVERED);
    let payload_len = implied_payload_len(length, available)?;

    if payload_len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    let total = HEADER_SIZE + payload_len;
    if src.len() < total {
        src.reserve(total - src.len());
        return Ok(None);
    }

    let header = builder.build()?;
    src.advance(HEADER_SIZE);
    let payload = src.split_to(payload_len).freeze();

    Ok(Some(Frame { header, payload }))
}

/// Configuration for frame decoding.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 16 MiB.
    pub max_payload_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{E_NOT_OK, ERROR};

    fn header() -> Header {
        Header::builder()
            .service_id(0x0001)
            .method_id(0x0002)
            .client_id(0x0003)
            .session_id(0x0004)
            .protocol_version(1)
            .interface_version(1)
            .message_type(0x00)
            .return_code(0x00)
            .build()
            .unwrap()
    }

    const EMPTY_WIRE: [u8; 16] = [
        0x00, 0x01, 0x00, 0x02, 0x00, 0x00, 0x00, 0x08, 0x00, 0x03, 0x00, 0x04, 0x01, 0x01, 0x00,
        0x00,
    ];

    #[test]
    fn encodes_reference_header_without_payload() {
        let frame = Frame::new(header(), Bytes::new()).unwrap();
        let wire = frame.encode();
        assert_eq!(wire.as_ref(), &EMPTY_WIRE);
        assert_eq!(frame.length(), 8);
    }

    #[test]
    fn decodes_reference_header_without_payload() {
        let frame = decode_datagram(&EMPTY_WIRE).unwrap();
        assert_eq!(frame.header(), &header());
        assert!(frame.payload().is_empty());
    }

    #[test]
    fn encodes_reference_header_with_payload() {
        let frame = Frame::new(header(), vec![0xDE, 0xAD, 0xBE, 0xEF]).unwrap();
        let wire = frame.encode();

        assert_eq!(wire.len(), 20);
        assert_eq!(&wire[4..8], &[0x00, 0x00, 0x00, 0x0C]);
        assert_eq!(&wire[16..], &[0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(frame.wire_size(), 20);
    }

    #[test]
    fn encode_decode_roundtrip() {
        let header = header()
            .to_builder()
            .message_type(ERROR.into())
            .return_code(E_NOT_OK.into())
            .build()
            .unwrap();
        let frame = Frame::new(header, &b"hello, someip!"[..]).unwrap();

        let decoded = decode_datagram(&frame.encode()).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn free_encoder_matches_frame_encoder() {
        let mut buf = BytesMut::new();
        encode_frame(&header(), b"abc", &mut buf).unwrap();

        let frame = Frame::new(header(), &b"abc"[..]).unwrap();
        assert_eq!(buf.freeze(), frame.encode());
    }

    #[test]
    fn with_payload_recomputes_length() {
        let frame = Frame::new(header(), &b"four"[..]).unwrap();
        assert_eq!(frame.length(), 12);

        let longer = frame.with_payload(vec![0u8; 100]).unwrap();
        let wire = longer.encode();
        assert_eq!(u32::from_be_bytes([wire[4], wire[5], wire[6], wire[7]]), 108);
        assert_eq!(longer.header(), frame.header());
    }

    #[test]
    fn length_for_payload_rejects_overflow() {
        assert_eq!(length_for_payload(0).unwrap(), 8);
        assert_eq!(length_for_payload(MAX_PAYLOAD).unwrap(), u32::MAX);
        assert!(matches!(
            length_for_payload(MAX_PAYLOAD + 1),
            Err(FrameError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn rejects_truncated_header() {
        for len in 0..HEADER_SIZE {
            let err = decode_datagram(&EMPTY_WIRE[..len]).unwrap_err();
            assert!(
                matches!(err, FrameError::TruncatedHeader { len: got } if got == len),
                "len {len}: {err:?}"
            );
        }
    }

    #[test]
    fn rejects_length_claiming_missing_payload() {
        let mut wire = EMPTY_WIRE.to_vec();
        wire[7] = 0x0C;
        wire.extend_from_slice(&[0xAA, 0xBB]);

        let err = decode_datagram(&wire).unwrap_err();
        assert!(matches!(
            err,
            FrameError::LengthMismatch {
                length: 12,
                available: 10
            }
        ));
    }

    #[test]
    fn rejects_length_below_minimum() {
        let mut wire = EMPTY_WIRE.to_vec();
        wire[7] = 0x04;

        let err = decode_datagram(&wire).unwrap_err();
        assert!(matches!(err, FrameError::LengthMismatch { length: 4, .. }));
    }

    #[test]
    fn rejects_trailing_bytes() {
        let mut wire = Frame::new(header(), &b"ok"[..]).unwrap().encode().to_vec();
        wire.extend_from_slice(b"junk");

        let err = decode_datagram(&wire).unwrap_err();
        assert!(matches!(err, FrameError::TrailingBytes { extra: 4 }));
    }

    #[test]
    fn datagram_limit_applies_to_declared_payload() {
        let frame = Frame::new(header(), vec![0u8; 64]).unwrap();
        let err = decode_datagram_with_limit(&frame.encode(), 32).unwrap_err();
        assert!(matches!(
            err,
            FrameError::PayloadTooLarge { size: 64, max: 32 }
        ));
        assert!(decode_datagram_with_limit(&frame.encode(), 64).is_ok());
    }

    #[test]
    fn same_request_id_across_payloads() {
        let a = Frame::new(header(), &b"one"[..]).unwrap();
        let b = a.with_payload(&b"two"[..]).unwrap();
        assert_eq!(a.request_id(), b.request_id());
        assert_eq!(a.request_id().as_u32(), 0x0003_0004);
        assert_eq!(a.message_id().as_u32(), 0x0001_0002);
    }

    #[test]
    fn stream_decode_waits_for_complete_frame() {
        let wire = Frame::new(header(), &b"payload"[..]).unwrap().encode();

        let mut buf = BytesMut::from(&wire[..10]);
        assert!(decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap().is_none());
        assert_eq!(buf.len(), 10);

        buf.extend_from_slice(&wire[10..]);
        let frame = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();
        assert_eq!(frame.payload().as_ref(), b"payload");
        assert!(buf.is_empty());
    }

    #[test]
    fn stream_decode_multiple_frames() {
        let mut buf = BytesMut::new();
        encode_frame(&header(), b"first", &mut buf).unwrap();
        let second = header().to_builder().session_id(5).build().unwrap();
        encode_frame(&second, b"second", &mut buf).unwrap();

        let f1 = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();
        let f2 = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();

        assert_eq!(f1.payload().as_ref(), b"first");
        assert_eq!(f2.payload().as_ref(), b"second");
        assert_eq!(f2.header().session_id(), 5);
        assert!(buf.is_empty());
    }

    #[test]
    fn stream_decode_rejects_bad_length_and_oversize() {
        let mut buf = BytesMut::from(&EMPTY_WIRE[..]);
        buf[7] = 0x07;
        assert!(matches!(
            decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD),
            Err(FrameError::LengthMismatch { length: 7, .. })
        ));

        let mut buf = BytesMut::from(&EMPTY_WIRE[..]);
        buf[4] = 0x10;
        assert!(matches!(
            decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD),
            Err(FrameError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn frame_config_defaults() {
        assert_eq!(FrameConfig::default().max_payload_size, DEFAULT_MAX_PAYLOAD);
    }

    #[test]
    fn frames_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Frame>();
        assert_send_sync::<Header>();
        assert_send_sync::<MessageId>();
        assert_send_sync::<RequestId>();
    }
}
