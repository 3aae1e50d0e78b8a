mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "mavwire", version, about = "MAVLink telemetry stream decoder")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        env = "MAVWIRE_LOG_LEVEL",
        default_value = "info",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decode_subcommand() {
        let cli = Cli::try_parse_from(["mavwire", "decode", "capture.bin", "--per-source"])
            .expect("decode args should parse");

        match cli.command {
            Command::Decode(args) => {
                assert_eq!(args.input.to_str(), Some("capture.bin"));
                assert!(args.decoder.per_source);
                assert_eq!(args.decoder.max_payload, 255);
                assert!(!args.strict);
            }
            other => panic!("expected decode, got {other:?}"),
        }
    }

    #[test]
    fn parses_listen_defaults() {
        let cli = Cli::try_parse_from(["mavwire", "listen"]).expect("listen args should parse");
        match cli.command {
            Command::Listen(args) => {
                assert_eq!(args.bind.port(), 14550);
                assert!(args.count.is_none());
            }
            other => panic!("expected listen, got {other:?}"),
        }
    }

    #[test]
    fn rejects_zero_max_payload() {
        let err = Cli::try_parse_from(["mavwire", "decode", "-", "--max-payload", "0"])
            .expect_err("zero max payload should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["mavwire", "catalog", "--format", "json"])
            .expect("global flags should parse anywhere");
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
        assert!(matches!(cli.command, Command::Catalog(_)));
    }
}
