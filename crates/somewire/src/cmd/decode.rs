use std::fs;

use somewire_frame::{decode_datagram, decode_datagram_with_limit, Frame};
use tracing::debug;

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{parse_hex, print_frame, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let datagram = read_datagram(&args)?;
    let frame = decode(&datagram, args.max_payload)?;
    print_frame(&frame, None, format);
    Ok(SUCCESS)
}

fn read_datagram(args: &DecodeArgs) -> CliResult<Vec<u8>> {
    if let Some(hex) = &args.hex {
        return parse_hex(hex).map_err(|err| CliError::new(USAGE, format!("invalid hex: {err}")));
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Err(CliError::new(USAGE, "provide a hex datagram or --file"))
}

fn decode(datagram: &[u8], max_payload: Option<usize>) -> CliResult<Frame> {
    debug!(size = datagram.len(), "decoding datagram");
    let decoded = match max_payload {
        Some(max) => decode_datagram_with_limit(datagram, max),
        None => decode_datagram(datagram),
    };
    decoded.map_err(|err| frame_error("decode failed", err))
}
