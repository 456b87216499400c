use std::time::{Duration, Instant};

use tracing::info;

use reactorlink_frame::{FrameConfig, FrameReader, FrameWriter, COMMAND, TELEMETRY};
use reactorlink_proto::{decode_telemetry, encode_command, Command};

use crate::cmd::{open_link, CommandName, SendArgs};
use crate::exit::{frame_error, transport_error, CliError, CliResult, SUCCESS, TIMEOUT, USAGE};
use crate::output::{print_sample, OutputFormat};

/// Power applied when set-power is sent without --value.
const DEFAULT_SET_POWER: i32 = 50;

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let cmd = resolve_command(&args)?;
    if args.wait && args.wait_ms == 0 {
        return Err(CliError::new(USAGE, "--wait-ms must be greater than zero"));
    }

    let stream = open_link(&args.link)?;
    let reader_stream = stream
        .try_clone()
        .map_err(|err| transport_error("link clone failed", err))?;

    let mut writer = FrameWriter::new(stream);
    writer
        .send(COMMAND, &encode_command(&cmd))
        .map_err(|err| frame_error("send failed", err))?;
    info!(%cmd, "command sent");

    if !args.wait {
        return Ok(SUCCESS);
    }

    let config = FrameConfig {
        read_timeout: Some(Duration::from_millis(args.wait_ms.min(50))),
        write_timeout: None,
    };
    let mut reader = FrameReader::with_config_link(reader_stream, config)
        .map_err(|err| frame_error("link setup failed", err))?;

    let deadline = Instant::now() + Duration::from_millis(args.wait_ms);
    while Instant::now() < deadline {
        let frames = reader
            .poll_frames()
            .map_err(|err| frame_error("receive failed", err))?;
        for frame in frames {
            if frame.msg_type != TELEMETRY {
                continue;
            }
            if let Ok(sample) = decode_telemetry(&frame.payload) {
                print_sample(&sample, format);
                return Ok(SUCCESS);
            }
        }
    }

    Err(CliError::new(TIMEOUT, "no telemetry within the wait window"))
}

fn resolve_command(args: &SendArgs) -> CliResult<Command> {
    match args.command {
        CommandName::Scram | CommandName::ResetNormal if args.value.is_some() => Err(
            CliError::new(USAGE, "--value only applies to set-power"),
        ),
        CommandName::Scram => Ok(Command::Scram),
        CommandName::ResetNormal => Ok(Command::ResetNormal),
        CommandName::SetPower => Ok(Command::SetPower(args.value.unwrap_or(DEFAULT_SET_POWER))),
    }
}
