use std::io::{ErrorKind, Read};
use std::sync::Arc;

use tracing::debug;

use crate::cmd::{attach_sink, open_input, DecodeArgs};
use crate::exit::{io_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_statistics, MessageSink, OutputFormat};

const READ_CHUNK_SIZE: usize = 4 * 1024;

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let mut input = open_input(&args.input)?;
    let decoder = args.decoder.build()?;
    let sink = Arc::new(MessageSink::new(format));
    let _handler = attach_sink(&decoder, &sink);

    let mut chunk = vec![0u8; READ_CHUNK_SIZE];
    loop {
        let read = match input.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(io_error("read failed", err)),
        };
        let frames = decoder.ingest(&chunk[..read]);
        debug!(bytes = read, frames, "chunk decoded");
    }

    sink.finish();
    let stats = decoder.get_statistics();
    print_statistics(stats, decoder.seen_message_ids(), format);

    if args.strict && stats.parse_errors > 0 {
        return Err(CliError::new(
            DATA_INVALID,
            format!("{} corrupt or malformed frames", stats.parse_errors),
        ));
    }
    Ok(SUCCESS)
}
