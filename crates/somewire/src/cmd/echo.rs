use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use somewire_frame::decode_datagram;
use somewire_frame::kind::{expects_response, E_OK};
use somewire_peer::response_to;
use somewire_transport::{TransportError, UdpEndpoint};
use tracing::{debug, info, warn};

use crate::cmd::EchoArgs;
use crate::exit::{peer_error, transport_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_frame, OutputFormat};

// Bounds how long a ctrl-c waits for the receive loop to notice.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub fn run(args: EchoArgs, format: OutputFormat) -> CliResult<i32> {
    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    ctrlc::set_handler(move || {
        flag.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("failed to install signal handler: {err}")))?;

    let endpoint =
        UdpEndpoint::bind(args.addr).map_err(|err| transport_error("bind failed", err))?;
    let local = endpoint
        .local_addr()
        .map_err(|err| transport_error("bind failed", err))?;
    info!(addr = %local, "echo responder ready");

    let replies = serve(&endpoint, &running, args.count, format)?;
    info!(replies, "echo responder stopped");
    Ok(SUCCESS)
}

/// Answer requests until `running` clears or `count` replies have been sent.
fn serve(
    endpoint: &UdpEndpoint,
    running: &AtomicBool,
    count: Option<usize>,
    format: OutputFormat,
) -> CliResult<usize> {
    let mut replies = 0usize;

    while running.load(Ordering::SeqCst) {
        if count.is_some_and(|limit| replies >= limit) {
            break;
        }

        let (datagram, peer) = match endpoint.recv_from(Some(POLL_INTERVAL)) {
            Ok(received) => received,
            Err(TransportError::Timeout(_)) => continue,
            Err(err) => return Err(transport_error("receive failed", err)),
        };

        let request = match decode_datagram(&datagram) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(%peer, size = datagram.len(), error = %err, "dropping malformed datagram");
                continue;
            }
        };
        print_frame(&request, Some(peer), format);

        if !expects_response(request.header().message_type()) {
            debug!(%peer, message = %request.message_id(), "no response expected");
            continue;
        }

        let reply = response_to(&request, E_OK, request.payload().clone())
            .map_err(|err| peer_error("failed to build reply", err))?;
        endpoint
            .send_to(&reply.encode(), peer)
            .map_err(|err| transport_error("reply failed", err))?;
        replies += 1;
    }

    Ok(replies)
}
