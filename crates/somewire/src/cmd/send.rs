use std::time::Duration;

use somewire_frame::kind::expects_response;
use somewire_frame::{Frame, ERROR};
use somewire_peer::Participant;
use somewire_transport::{Transport, TransportConfig, UdpTransport};
use tracing::info;

use crate::cmd::SendArgs;
use crate::exit::{
    frame_error, peer_error, transport_error, CliError, CliResult, FAILURE, SUCCESS, USAGE,
};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let header = args.header.build()?;
    let payload = args.payload.resolve()?;
    let frame = Frame::new(header, payload).map_err(|err| frame_error("invalid frame", err))?;

    let config = TransportConfig {
        default_timeout: timeout,
        ..TransportConfig::default()
    };
    let mut transport = UdpTransport::with_config(args.addr, config);
    transport
        .connect()
        .map_err(|err| transport_error("connect failed", err))?;

    if !expects_response(header.message_type()) {
        let sent = transport.send_only(&frame.encode());
        transport.close();
        sent.map_err(|err| transport_error("send failed", err))?;
        info!(
            remote = %args.addr,
            message = %frame.message_id(),
            size = frame.wire_size(),
            "sent frame without waiting for a reply"
        );
        return Ok(SUCCESS);
    }

    let mut consumer = Participant::consumer(header.client_id(), transport);
    let reply = consumer.call(&frame);
    consumer.transport_mut().close();
    let reply = reply.map_err(|err| peer_error("exchange failed", err))?;

    print_frame(&reply, Some(args.addr), format);
    if reply.header().message_type() == ERROR {
        return Ok(FAILURE);
    }
    Ok(SUCCESS)
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::thread;

    use somewire_frame::decode_datagram;
    use somewire_frame::kind::{E_NOT_OK, E_OK};
    use somewire_peer::response_to;
    use somewire_transport::UdpEndpoint;

    use super::*;
    use crate::cmd::{HeaderArgs, PayloadArgs};
    use crate::exit::TIMEOUT;

    fn send_args(addr: SocketAddr, timeout: &str) -> SendArgs {
        SendArgs {
            addr,
            header: HeaderArgs {
                service: Some(0x1234),
                method: Some(0x0001),
                client: Some(0x0010),
                session: Some(0x0001),
                ..HeaderArgs::default()
            },
            payload: PayloadArgs {
                data: Some("ping".into()),
                ..PayloadArgs::default()
            },
            timeout: timeout.into(),
        }
    }

    fn responder(return_code: u8) -> (SocketAddr, thread::JoinHandle<Frame>) {
        let endpoint = UdpEndpoint::bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = endpoint.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (datagram, peer) = endpoint.recv_from(Some(Duration::from_secs(5))).unwrap();
            let request = decode_datagram(&datagram).unwrap();
            let reply = response_to(&request, return_code, request.payload().clone()).unwrap();
            endpoint.send_to(&reply.encode(), peer).unwrap();
            request
        });
        (addr, handle)
    }

    #[test]
    fn request_round_trip_succeeds() {
        let (addr, server) = responder(E_OK);
        let code = run(send_args(addr, "5s"), OutputFormat::Json).unwrap();
        assert_eq!(code, SUCCESS);

        let request = server.join().unwrap();
        assert_eq!(request.message_id().as_u32(), 0x1234_0001);
        assert_eq!(request.payload().as_ref(), b"ping");
    }

    #[test]
    fn error_reply_exits_with_failure() {
        let (addr, server) = responder(E_NOT_OK);
        let code = run(send_args(addr, "5s"), OutputFormat::Json).unwrap();
        assert_eq!(code, FAILURE);
        server.join().unwrap();
    }

    #[test]
    fn silent_peer_times_out() {
        let endpoint = UdpEndpoint::bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = endpoint.local_addr().unwrap();

        let err = run(send_args(addr, "100ms"), OutputFormat::Json).unwrap_err();
        assert_eq!(err.code, TIMEOUT);
    }

    #[test]
    fn notification_does_not_wait() {
        let endpoint = UdpEndpoint::bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let mut args = send_args(endpoint.local_addr().unwrap(), "100ms");
        args.header.message_type = Some(0x02);

        assert_eq!(run(args, OutputFormat::Json).unwrap(), SUCCESS);
        let (datagram, _) = endpoint.recv_from(Some(Duration::from_secs(5))).unwrap();
        assert_eq!(decode_datagram(&datagram).unwrap().header().message_type(), 0x02);
    }

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }
}
