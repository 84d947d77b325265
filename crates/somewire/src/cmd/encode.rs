use somewire_frame::Frame;

use crate::cmd::EncodeArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_wire, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let frame = build_frame(&args)?;
    print_wire(&frame.encode(), format);
    Ok(SUCCESS)
}

fn build_frame(args: &EncodeArgs) -> CliResult<Frame> {
    let header = args.header.build()?;
    let payload = args.payload.resolve()?;
    Frame::new(header, payload).map_err(|err| frame_error("invalid frame", err))
}
