use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{Args, Subcommand, ValueEnum};
use tracing::info;

use reactorlink_transport::{LinkStream, SerialLink, UnixDomainSocket};

use crate::exit::{transport_error, CliError, CliResult, INTERNAL};
use crate::output::OutputFormat;

pub mod agent;
pub mod controller;
pub mod monitor;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the reactor controller node.
    Controller(ControllerArgs),
    /// Run the agent node bridging the link to a stdio uplink.
    Agent(AgentArgs),
    /// Send a single command over the link.
    Send(SendArgs),
    /// Print telemetry frames as they arrive.
    Monitor(MonitorArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Controller(args) => controller::run(args),
        Command::Agent(args) => agent::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Monitor(args) => monitor::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// The link endpoint shared by every node-facing subcommand.
#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Unix socket path, or a serial device with --serial.
    pub link: PathBuf,

    /// Treat the link path as a serial character device.
    #[arg(long)]
    pub serial: bool,

    /// Serial baud rate.
    #[arg(long, value_name = "BAUD", default_value = "115200")]
    pub baud: u32,

    /// Bind the socket path and wait for the peer instead of connecting.
    #[arg(long, conflicts_with = "serial")]
    pub listen: bool,
}

/// Open the link endpoint described by `args`.
///
/// With `--listen` the socket stays bound only until the single peer
/// connects; the link is point-to-point.
pub fn open_link(args: &LinkArgs) -> CliResult<LinkStream> {
    if args.serial {
        info!(path = %args.link.display(), baud = args.baud, "opening serial link");
        return SerialLink::open(&args.link, args.baud)
            .map_err(|err| transport_error("serial open failed", err));
    }

    if args.listen {
        let socket = UnixDomainSocket::bind(&args.link)
            .map_err(|err| transport_error("bind failed", err))?;
        info!(path = %args.link.display(), "waiting for peer");
        return socket
            .accept()
            .map_err(|err| transport_error("accept failed", err));
    }

    info!(path = %args.link.display(), "connecting");
    UnixDomainSocket::connect(&args.link).map_err(|err| transport_error("connect failed", err))
}

pub fn install_ctrlc_handler(shutdown: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        shutdown.store(true, Ordering::Relaxed);
    })
    .map_err(|err| {
        CliError::new(INTERNAL, format!("signal handler setup failed: {err}"))
    })
}

#[derive(Args, Debug)]
pub struct ControllerArgs {
    #[command(flatten)]
    pub link: LinkArgs,

    /// Control period in milliseconds.
    #[arg(long, value_name = "MS", default_value = "100")]
    pub period_ms: u64,

    /// Warning temperature threshold in °C.
    #[arg(long, value_name = "C", default_value = "45.0")]
    pub warning: f32,

    /// Critical temperature threshold in °C.
    #[arg(long, value_name = "C", default_value = "50.0")]
    pub critical: f32,

    /// Simulated starting temperature in °C.
    #[arg(long, value_name = "C", default_value = "25.0")]
    pub temp: f32,

    /// Simulated temperature drift per step in °C (may be negative).
    #[arg(long, value_name = "C", default_value = "0.0", allow_negative_numbers = true)]
    pub temp_step: f32,

    /// Simulated acceleration magnitude in g.
    #[arg(long, value_name = "G", default_value = "0.0")]
    pub accel: f32,

    /// Fail the temperature sensor after N steps.
    #[arg(long, value_name = "N")]
    pub fault_after: Option<u32>,
}

#[derive(Args, Debug)]
pub struct AgentArgs {
    #[command(flatten)]
    pub link: LinkArgs,

    /// Uplink poll interval in milliseconds.
    #[arg(long, value_name = "MS", default_value = "50")]
    pub poll_ms: u64,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum CommandName {
    Scram,
    ResetNormal,
    SetPower,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub link: LinkArgs,

    /// Command to send.
    #[arg(value_enum)]
    pub command: CommandName,

    /// Power value for set-power.
    #[arg(long, value_name = "PERCENT", allow_negative_numbers = true)]
    pub value: Option<i32>,

    /// Wait for the next telemetry sample and print it.
    #[arg(long)]
    pub wait: bool,

    /// Maximum wait in milliseconds when --wait is set.
    #[arg(long, value_name = "MS", default_value = "2000")]
    pub wait_ms: u64,
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    #[command(flatten)]
    pub link: LinkArgs,

    /// Exit after printing N samples.
    #[arg(long, value_name = "N")]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build information.
    #[arg(long)]
    pub extended: bool,
}
