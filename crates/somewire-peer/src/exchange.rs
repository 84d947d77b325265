use std::time::Duration;

use bytes::Bytes;
use somewire_frame::kind::{expects_response, E_OK};
use somewire_frame::{decode_datagram, Frame, ERROR, RESPONSE};
use somewire_transport::Transport;
use tracing::debug;

use crate::error::{PeerError, Result};

/// Send `request` and wait for the reply that answers it.
///
/// The reply must carry the request's message and request identity;
/// anything else is `UnexpectedReply`. Timeouts surface unchanged as
/// `PeerError::Transport(TransportError::Timeout)`.
pub fn exchange<T: Transport + ?Sized>(
    transport: &mut T,
    request: &Frame,
    timeout: Duration,
) -> Result<Frame> {
    let message_type = request.header().message_type();
    if !expects_response(message_type) {
        return Err(PeerError::NoResponseExpected(message_type));
    }

    let reply = transport.send(&request.encode(), timeout)?;
    let response = decode_datagram(&reply)?;

    if response.message_id() != request.message_id()
        || response.request_id() != request.request_id()
    {
        return Err(PeerError::UnexpectedReply {
            expected_message: request.message_id(),
            expected_request: request.request_id(),
            message: response.message_id(),
            request: response.request_id(),
        });
    }

    debug!(
        message = %response.message_id(),
        request = %response.request_id(),
        return_code = response.header().return_code(),
        size = response.payload().len(),
        "received reply"
    );
    Ok(response)
}

/// Build the reply to `request`.
///
/// Identities and versions are copied; the message type is `RESPONSE` for
/// `E_OK` and `ERROR` for any other return code.
pub fn response_to(request: &Frame, return_code: u8, payload: impl Into<Bytes>) -> Result<Frame> {
    let message_type = if return_code == E_OK { RESPONSE } else { ERROR };
    let header = request
        .header()
        .to_builder()
        .message_type(message_type.into())
        .return_code(return_code.into())
        .build()?;
    Ok(Frame::new(header, payload)?)
}

#[cfg(test)]
mod tests {
    use somewire_frame::kind::E_UNKNOWN_METHOD;
    use somewire_frame::{Header, NOTIFICATION, REQUEST};
    use somewire_transport::TransportError;

    use super::*;

    struct MockTransport {
        reply: Option<Bytes>,
        sent: Vec<Bytes>,
    }

    impl MockTransport {
        fn replying(reply: Bytes) -> Self {
            Self {
                reply: Some(reply),
                sent: Vec::new(),
            }
        }

        fn silent() -> Self {
            Self {
                reply: None,
                sent: Vec::new(),
            }
        }
    }

    impl Transport for MockTransport {
        fn connect(&mut self) -> somewire_transport::Result<()> {
            Ok(())
        }

        fn is_connected(&self) -> bool {
            true
        }

        fn send(
            &mut self,
            datagram: &[u8],
            timeout: Duration,
        ) -> somewire_transport::Result<Bytes> {
            self.sent.push(Bytes::copy_from_slice(datagram));
            self.recv(timeout)
        }

        fn recv(&mut self, timeout: Duration) -> somewire_transport::Result<Bytes> {
            self.reply.take().ok_or(TransportError::Timeout(timeout))
        }

        fn close(&mut self) {}
    }

    fn request() -> Frame {
        let header = Header::builder()
            .service_id(0x1234)
            .method_id(0x0421)
            .client_id(0x0001)
            .session_id(0x0007)
            .interface_version(1)
            .message_type(REQUEST.into())
            .build()
            .unwrap();
        Frame::new(header, &b"question"[..]).unwrap()
    }

    #[test]
    fn response_to_copies_identities() {
        let req = request();
        let ok = response_to(&req, E_OK, &b"answer"[..]).unwrap();
        assert_eq!(ok.header().message_type(), RESPONSE);
        assert_eq!(ok.message_id(), req.message_id());
        assert_eq!(ok.request_id(), req.request_id());
        assert_eq!(ok.header().interface_version(), 1);

        let failed = response_to(&req, E_UNKNOWN_METHOD, Bytes::new()).unwrap();
        assert_eq!(failed.header().message_type(), ERROR);
        assert_eq!(failed.header().return_code(), E_UNKNOWN_METHOD);
    }

    #[test]
    fn exchange_returns_matching_reply() {
        let req = request();
        let reply = response_to(&req, E_OK, &b"answer"[..]).unwrap();
        let mut transport = MockTransport::replying(reply.encode());

        let got = exchange(&mut transport, &req, Duration::from_secs(1)).unwrap();
        assert_eq!(got, reply);
        assert_eq!(transport.sent, vec![req.encode()]);
    }

    #[test]
    fn exchange_rejects_reply_for_other_session() {
        let req = request();
        let other = Frame::new(
            req.header().to_builder().session_id(0x0008).build().unwrap(),
            Bytes::new(),
        )
        .unwrap();
        let reply = response_to(&other, E_OK, Bytes::new()).unwrap();
        let mut transport = MockTransport::replying(reply.encode());

        let err = exchange(&mut transport, &req, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, PeerError::UnexpectedReply { .. }));
    }

    #[test]
    fn exchange_surfaces_malformed_reply() {
        let mut transport = MockTransport::replying(Bytes::from_static(b"short"));
        let err = exchange(&mut transport, &request(), Duration::from_secs(1)).unwrap_err();
        assert!(matches!(
            err,
            PeerError::Frame(somewire_frame::FrameError::TruncatedHeader { len: 5 })
        ));
    }

    #[test]
    fn exchange_propagates_timeout() {
        let mut transport = MockTransport::silent();
        let timeout = Duration::from_millis(10);
        let err = exchange(&mut transport, &request(), timeout).unwrap_err();
        assert!(matches!(
            err,
            PeerError::Transport(TransportError::Timeout(t)) if t == timeout
        ));
    }

    #[test]
    fn exchange_refuses_notifications() {
        let req = request();
        let notification = Frame::new(
            req.header()
                .to_builder()
                .message_type(NOTIFICATION.into())
                .build()
                .unwrap(),
            Bytes::new(),
        )
        .unwrap();
        let mut transport = MockTransport::silent();

        let err = exchange(&mut transport, &notification, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, PeerError::NoResponseExpected(NOTIFICATION)));
        assert!(transport.sent.is_empty());
    }
}
