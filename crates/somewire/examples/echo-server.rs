//! Minimal UDP producer: answers every request with its own payload.
//!
//! Run with:
//!   cargo run --example echo-server --features peer
//!
//! In another terminal:
//!   cargo run --features cli -- send 127.0.0.1:30490 \
//!     --service 0x1234 --method 0x0001 --data hello --timeout 3s

use std::net::SocketAddr;

use somewire::frame::decode_datagram;
use somewire::frame::kind::{expects_response, E_OK};
use somewire::peer::response_to;
use somewire::transport::UdpEndpoint;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:30490".to_string())
        .parse()?;

    let endpoint = UdpEndpoint::bind(addr)?;
    eprintln!("Listening on {}", endpoint.local_addr()?);

    loop {
        let (datagram, peer) = endpoint.recv_from(None)?;
        let request = match decode_datagram(&datagram) {
            Ok(frame) => frame,
            Err(e) => {
                eprintln!("Dropping {} bytes from {peer}: {e}", datagram.len());
                continue;
            }
        };
        eprintln!("Received {} from {peer}", request.header());

        if expects_response(request.header().message_type()) {
            let reply = response_to(&request, E_OK, request.payload().clone())?;
            endpoint.send_to(&reply.encode(), peer)?;
        }
    }
}
