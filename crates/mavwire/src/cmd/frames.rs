use mavwire_frame::{FrameError, FrameReader};
use mavwire_message::catalog;

use crate::cmd::{open_input, FramesArgs};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_frames, OutputFormat};

pub fn run(args: FramesArgs, format: OutputFormat) -> CliResult<i32> {
    let input = open_input(&args.input)?;
    let mut reader = FrameReader::with_config(input, catalog::frame_config());

    let mut frames = Vec::new();
    loop {
        match reader.read_frame() {
            Ok(frame) => frames.push(frame),
            Err(FrameError::ConnectionClosed) => break,
            Err(err) => return Err(frame_error("read failed", err)),
        }
    }

    print_frames(&frames, format);
    Ok(SUCCESS)
}
