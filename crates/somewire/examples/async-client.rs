//! Send one request with the tokio transport and print the reply.
//!
//! Run with:
//!   cargo run --example async-client --features async -- 127.0.0.1:30490
//!
//! Pair it with the `echo-server` example or `somewire echo`.

use std::net::SocketAddr;

use somewire::frame::{decode_datagram, Frame, Header};
use somewire::transport::AsyncUdpTransport;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:30490".to_string())
        .parse()?;

    let header = Header::builder()
        .service_id(0x1234)
        .method_id(0x0001)
        .client_id(0x0001)
        .session_id(0x0001)
        .build()?;
    let request = Frame::new(header, &b"hello"[..])?;

    let mut transport = AsyncUdpTransport::new(addr);
    transport.connect().await?;
    let timeout = transport.default_timeout();
    let reply = transport.send(&request.encode(), timeout).await?;
    transport.close();

    let reply = decode_datagram(&reply)?;
    println!("{}", reply.header());
    println!("payload: {}", String::from_utf8_lossy(reply.payload()));
    Ok(())
}
