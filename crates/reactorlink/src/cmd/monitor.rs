use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use reactorlink_frame::{FrameConfig, FrameError, FrameReader, TELEMETRY};
use reactorlink_node::DEFAULT_LINK_READ_TIMEOUT;
use reactorlink_proto::decode_telemetry;

use crate::cmd::{install_ctrlc_handler, open_link, MonitorArgs};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_sample, OutputFormat};

pub fn run(args: MonitorArgs, format: OutputFormat) -> CliResult<i32> {
    let stream = open_link(&args.link)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    install_ctrlc_handler(Arc::clone(&shutdown))?;

    let config = FrameConfig {
        read_timeout: Some(DEFAULT_LINK_READ_TIMEOUT),
        write_timeout: None,
    };
    let mut reader = FrameReader::with_config_link(stream, config)
        .map_err(|err| frame_error("link setup failed", err))?;

    let mut printed = 0usize;
    while !shutdown.load(Ordering::Relaxed) {
        let frames = match reader.poll_frames() {
            Ok(frames) => frames,
            Err(FrameError::ConnectionClosed) => {
                info!("link closed by peer");
                break;
            }
            Err(err) => return Err(frame_error("receive failed", err)),
        };

        for frame in frames {
            if frame.msg_type != TELEMETRY {
                continue;
            }
            match decode_telemetry(&frame.payload) {
                Ok(sample) => {
                    print_sample(&sample, format);
                    printed = printed.saturating_add(1);
                    if let Some(count) = args.count {
                        if printed >= count {
                            return Ok(SUCCESS);
                        }
                    }
                }
                Err(err) => warn!(%err, "discarding malformed telemetry payload"),
            }
        }
    }

    let stats = reader.stats();
    info!(
        frames = stats.frames_decoded,
        checksum_mismatches = stats.checksum_mismatches,
        length_overflows = stats.length_overflows,
        "monitor stopped"
    );
    Ok(SUCCESS)
}
