mod cmd;
mod exit;
mod logging;
mod output;

use astroframe_frame::Variant;
use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "astroframe", version, about = "Astronode modem command CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Frame layout spoken by the modem firmware (legacy or raw).
    #[arg(
        long,
        value_name = "VARIANT",
        env = "ASTRONODE_VARIANT",
        default_value = "raw",
        global = true
    )]
    variant: Variant,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, cli.variant, format);

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
    use crate::cmd::RequestCommand;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "astroframe",
            "send",
            "--port",
            "/dev/ttyACM0",
            "--decode",
            "config-write",
            "--payload",
            "00",
        ])
        .expect("send args should parse");

        match cli.command {
            Command::Send(args) => {
                assert_eq!(args.link.port, "/dev/ttyACM0");
                assert!(args.decode);
                assert!(matches!(args.request, RequestCommand::ConfigWrite(_)));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn variant_defaults_to_raw() {
        let cli = Cli::try_parse_from(["astroframe", "frame", "config-read"])
            .expect("frame args should parse");
        assert_eq!(cli.variant, Variant::Raw);

        let cli = Cli::try_parse_from(["astroframe", "--variant", "legacy", "frame", "free"])
            .expect("variant should parse");
        assert_eq!(cli.variant, Variant::Legacy);
    }

    #[test]
    fn rejects_unknown_variant() {
        let err = Cli::try_parse_from(["astroframe", "--variant", "c", "frame", "free"])
            .expect_err("unknown variant should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "astroframe",
            "frame",
            "enqueue",
            "--data",
            "hello",
            "--hex",
            "00",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn negative_coordinates_parse() {
        let cli = Cli::try_parse_from([
            "astroframe",
            "frame",
            "geo",
            "--lat",
            "-33.8688",
            "--lon",
            "151.2093",
        ])
        .expect("negative latitude should parse");
        match cli.command {
            Command::Frame(args) => match args.request {
                RequestCommand::Geo(geo) => assert_eq!(geo.lat, -33.8688),
                other => panic!("unexpected request: {other:?}"),
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
