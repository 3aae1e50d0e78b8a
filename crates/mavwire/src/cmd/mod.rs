use std::fs::File;
use std::io::{self, Read};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Subcommand};
use mavwire_decoder::{DecoderConfig, MavDecoder};
use mavwire_frame::SequenceScope;
use mavwire_message::{FnHandler, MessageHandler};

use crate::exit::{decoder_error, io_error, CliResult};
use crate::output::{MessageSink, OutputFormat};

pub mod catalog;
pub mod decode;
pub mod frames;
pub mod listen;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a capture file (or stdin) and print every message.
    Decode(DecodeArgs),
    /// Print frame headers from a capture without decoding payloads.
    Frames(FramesArgs),
    /// Decode telemetry arriving on a UDP socket.
    Listen(ListenArgs),
    /// Print the supported message catalog.
    Catalog(CatalogArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Frames(args) => frames::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Catalog(args) => catalog::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Decoder tuning shared by `decode` and `listen`.
#[derive(Args, Debug, Clone, Copy)]
pub struct DecoderArgs {
    /// Reject frames declaring a payload longer than this.
    #[arg(long, default_value_t = 255, value_parser = clap::value_parser!(u8).range(1..))]
    pub max_payload: u8,
    /// Track sequence gaps per (system, component) instead of per stream.
    #[arg(long)]
    pub per_source: bool,
}

impl DecoderArgs {
    pub fn build(self) -> CliResult<MavDecoder> {
        let scope = if self.per_source {
            SequenceScope::Source
        } else {
            SequenceScope::Channel
        };
        let config = DecoderConfig::default()
            .with_max_payload_len(usize::from(self.max_payload))
            .with_sequence_scope(scope);
        MavDecoder::with_config(config).map_err(|err| decoder_error("invalid decoder config", err))
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Capture file to decode, or `-` for stdin.
    pub input: PathBuf,
    #[command(flatten)]
    pub decoder: DecoderArgs,
    /// Exit with status 60 when any corrupt or malformed frame was seen.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct FramesArgs {
    /// Capture file to scan, or `-` for stdin.
    pub input: PathBuf,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Local UDP address to bind.
    #[arg(long, default_value = "0.0.0.0:14550")]
    pub bind: SocketAddr,
    /// Exit after decoding N messages.
    #[arg(long)]
    pub count: Option<usize>,
    #[command(flatten)]
    pub decoder: DecoderArgs,
}

#[derive(Args, Debug, Default)]
pub struct CatalogArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn open_input(path: &Path) -> CliResult<Box<dyn Read>> {
    if path == Path::new("-") {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path)
        .map_err(|err| io_error(&format!("failed to open {}", path.display()), err))?;
    Ok(Box::new(file))
}

/// Route every decoded message into `sink`.
///
/// The decoder only holds a weak reference; keep the returned handler alive
/// for as long as output is wanted.
pub(crate) fn attach_sink(decoder: &MavDecoder, sink: &Arc<MessageSink>) -> Arc<dyn MessageHandler> {
    let target = Arc::clone(sink);
    let handler = Arc::new(FnHandler::new(move |source, message| {
        target.emit(source, &message);
    }));
    decoder.set_handler(Some(&handler));
    handler
}
