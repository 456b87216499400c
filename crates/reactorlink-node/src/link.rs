//! The link I/O loops on both ends of the serial link.
//!
//! Each loop owns a cloned pair of the link stream: a `FrameWriter` for the
//! outbound direction and a `FrameReader` polled with a short read timeout
//! for the inbound one. One iteration drains the outbound queue, then polls
//! for inbound frames. A closed link ends the loop cleanly; everything else
//! keeps moving.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::Receiver;
use tracing::{debug, info, warn};

use reactorlink_frame::{
    msg_type_name, FrameConfig, FrameError, FrameReader, FrameWriter, COMMAND, TELEMETRY,
};
use reactorlink_proto::{
    decode_telemetry, encode_command, encode_telemetry, Command, TelemetrySample,
};
use reactorlink_transport::LinkStream;

use crate::error::Result;
use crate::latest::LatestSlot;
use crate::router::CommandRouter;

/// Upper bound on one link loop iteration's blocking read.
pub const DEFAULT_LINK_READ_TIMEOUT: Duration = Duration::from_millis(50);

/// Link loop configuration.
#[derive(Debug, Clone, Copy)]
pub struct LinkConfig {
    /// Read timeout applied to the stream; bounds loop latency.
    pub read_timeout: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_LINK_READ_TIMEOUT,
        }
    }
}

impl LinkConfig {
    fn frame_config(&self) -> FrameConfig {
        FrameConfig {
            read_timeout: Some(self.read_timeout),
            write_timeout: None,
        }
    }
}

/// Controller-side link loop.
///
/// Drains queued telemetry samples onto the link as TELEMETRY frames and
/// routes inbound COMMAND frames to the control loop. Returns `Ok(())`
/// when the peer closes the link or `shutdown` is set.
pub fn run_controller_link(
    stream: LinkStream,
    telemetry: Receiver<TelemetrySample>,
    router: CommandRouter,
    config: LinkConfig,
    shutdown: &AtomicBool,
) -> Result<()> {
    let reader_stream = stream.try_clone()?;
    let mut writer = FrameWriter::new(stream);
    let mut reader = FrameReader::with_config_link(reader_stream, config.frame_config())?;

    info!("controller link loop started");

    while !shutdown.load(Ordering::Relaxed) {
        while let Ok(sample) = telemetry.try_recv() {
            let payload = encode_telemetry(&sample);
            match writer.send(TELEMETRY, &payload) {
                Ok(()) => debug!(sample_id = sample.sample_id, "telemetry sent"),
                Err(FrameError::ConnectionClosed) => {
                    info!("link closed by peer");
                    return Ok(());
                }
                Err(err) => return Err(err.into()),
            }
        }

        match reader.poll_frames() {
            Ok(frames) => {
                for frame in &frames {
                    router.route(frame);
                }
            }
            Err(FrameError::ConnectionClosed) => {
                info!("link closed by peer");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        }
    }

    info!("controller link loop stopped");
    Ok(())
}

/// Agent-side link loop.
///
/// Publishes decoded TELEMETRY samples into the latest-value slot and
/// drains outbound commands onto the link as COMMAND frames. Returns
/// `Ok(())` when the peer closes the link or `shutdown` is set.
pub fn run_agent_link(
    stream: LinkStream,
    latest: LatestSlot<TelemetrySample>,
    outbound: Receiver<Command>,
    config: LinkConfig,
    shutdown: &AtomicBool,
) -> Result<()> {
    let reader_stream = stream.try_clone()?;
    let mut writer = FrameWriter::new(stream);
    let mut reader = FrameReader::with_config_link(reader_stream, config.frame_config())?;

    info!("agent link loop started");

    while !shutdown.load(Ordering::Relaxed) {
        while let Ok(cmd) = outbound.try_recv() {
            let payload = encode_command(&cmd);
            match writer.send(COMMAND, &payload) {
                Ok(()) => debug!(%cmd, "command sent"),
                Err(FrameError::ConnectionClosed) => {
                    info!("link closed by peer");
                    return Ok(());
                }
                Err(err) => return Err(err.into()),
            }
        }

        match reader.poll_frames() {
            Ok(frames) => {
                for frame in frames {
                    if frame.msg_type != TELEMETRY {
                        warn!(
                            msg_type = frame.msg_type,
                            name = msg_type_name(frame.msg_type),
                            "unexpected frame on telemetry path, discarding"
                        );
                        continue;
                    }
                    match decode_telemetry(&frame.payload) {
                        Ok(sample) => {
                            debug!(sample_id = sample.sample_id, "telemetry received");
                            latest.publish(sample);
                        }
                        Err(err) => warn!(%err, "discarding malformed telemetry payload"),
                    }
                }
            }
            Err(FrameError::ConnectionClosed) => {
                info!("link closed by peer");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        }
    }

    info!("agent link loop stopped");
    Ok(())
}
