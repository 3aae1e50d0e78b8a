use std::io::ErrorKind;
use std::net::UdpSocket;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::cmd::{attach_sink, ListenArgs};
use crate::exit::{io_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_statistics, MessageSink, OutputFormat};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Largest UDP datagram payload.
const DATAGRAM_SIZE: usize = 65_507;

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let socket = UdpSocket::bind(args.bind).map_err(|err| io_error("bind failed", err))?;
    socket
        .set_read_timeout(Some(POLL_INTERVAL))
        .map_err(|err| io_error("socket setup failed", err))?;
    let local = socket
        .local_addr()
        .map_err(|err| io_error("socket setup failed", err))?;
    info!(%local, "listening for telemetry");

    let decoder = args.decoder.build()?;
    let sink = Arc::new(MessageSink::new(format).with_limit(args.count));
    let _handler = attach_sink(&decoder, &sink);

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut datagram = vec![0u8; DATAGRAM_SIZE];
    while running.load(Ordering::SeqCst) {
        let (len, peer) = match socket.recv_from(&mut datagram) {
            Ok(received) => received,
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                continue
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(io_error("receive failed", err)),
        };
        let frames = decoder.ingest(&datagram[..len]);
        debug!(%peer, bytes = len, frames, "datagram decoded");

        if sink.is_full() {
            break;
        }
    }

    sink.finish();
    print_statistics(decoder.get_statistics(), decoder.seen_message_ids(), format);
    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
