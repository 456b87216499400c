mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "reactorlink", version, about = "Reactor link nodes and tools")]
struct Cli {
    /// Output format for telemetry on stdout.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
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
    fn parses_controller_subcommand() {
        let cli = Cli::try_parse_from([
            "reactorlink",
            "controller",
            "/tmp/reactor.sock",
            "--listen",
            "--temp",
            "44.0",
            "--temp-step",
            "0.5",
        ])
        .expect("controller args should parse");

        assert!(matches!(cli.command, Command::Controller(_)));
    }

    #[test]
    fn parses_send_set_power() {
        let cli = Cli::try_parse_from([
            "reactorlink",
            "send",
            "/tmp/reactor.sock",
            "set-power",
            "--value",
            "75",
            "--wait",
        ])
        .expect("send args should parse");

        let Command::Send(args) = cli.command else {
            panic!("expected send");
        };
        assert!(args.wait);
        assert_eq!(args.value, Some(75));
    }

    #[test]
    fn rejects_listen_with_serial() {
        let err = Cli::try_parse_from([
            "reactorlink",
            "monitor",
            "/dev/ttyUSB0",
            "--serial",
            "--listen",
        ])
        .expect_err("conflicting link args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_agent_with_serial_baud() {
        let cli = Cli::try_parse_from([
            "reactorlink",
            "agent",
            "/dev/ttyUSB0",
            "--serial",
            "--baud",
            "9600",
        ])
        .expect("agent args should parse");

        let Command::Agent(args) = cli.command else {
            panic!("expected agent");
        };
        assert!(args.link.serial);
        assert_eq!(args.link.baud, 9600);
    }
}
