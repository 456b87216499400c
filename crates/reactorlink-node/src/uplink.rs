use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_channel::Sender;
use tracing::{debug, info, warn};

use reactorlink_proto::{Command, CommandMessage, TelemetrySample};

use crate::latest::LatestSlot;
use crate::queue::send_or_drop;

/// An external channel error. The bridge logs these and keeps polling; the
/// uplink is best-effort by design and never stalls the link.
#[derive(Debug, thiserror::Error)]
#[error("uplink channel: {0}")]
pub struct UplinkError(String);

impl UplinkError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// The agent's external channel: telemetry out, operator commands in.
///
/// Implementations are line-oriented JSON over stdio in the bundled CLI;
/// anything with the same shape (an MQTT client, a web socket) slots in
/// here.
pub trait UplinkChannel {
    /// Publish one telemetry sample outward.
    fn publish(&mut self, sample: &TelemetrySample) -> Result<(), UplinkError>;

    /// Fetch the next pending inbound command message, if any. Must not
    /// block beyond a bounded poll.
    fn poll_command(&mut self) -> Option<CommandMessage>;
}

/// Connects the agent's link-side state to an [`UplinkChannel`].
///
/// Outbound: takes the latest telemetry sample and publishes it, skipping
/// republication of a sample id already sent. Inbound: translates command
/// messages and enqueues them toward the link loop, discarding unknown
/// names.
pub struct UplinkBridge<C> {
    channel: C,
    latest: LatestSlot<TelemetrySample>,
    outbound: Sender<Command>,
    last_published: Option<u32>,
}

impl<C: UplinkChannel> UplinkBridge<C> {
    pub fn new(
        channel: C,
        latest: LatestSlot<TelemetrySample>,
        outbound: Sender<Command>,
    ) -> Self {
        Self {
            channel,
            latest,
            outbound,
            last_published: None,
        }
    }

    /// One best-effort bridge cycle: publish fresh telemetry, then drain
    /// inbound command messages.
    pub fn poll(&mut self) {
        if let Some(sample) = self.latest.take() {
            if self.last_published != Some(sample.sample_id) {
                match self.channel.publish(&sample) {
                    Ok(()) => {
                        debug!(sample_id = sample.sample_id, "telemetry published");
                        self.last_published = Some(sample.sample_id);
                    }
                    Err(err) => warn!(%err, "telemetry publish failed"),
                }
            }
        }

        while let Some(msg) = self.channel.poll_command() {
            match msg.to_command() {
                Ok(cmd) => {
                    debug!(%cmd, "uplink command accepted");
                    send_or_drop(&self.outbound, cmd, "outbound commands");
                }
                Err(err) => warn!(%err, "discarding uplink command"),
            }
        }
    }

    /// Poll at `interval` until `shutdown` is set.
    pub fn run(&mut self, interval: Duration, shutdown: &AtomicBool) {
        info!("uplink bridge started");
        while !shutdown.load(Ordering::Relaxed) {
            self.poll();
            thread::sleep(interval);
        }
        info!("uplink bridge stopped");
    }

    /// Consume the bridge and return the channel.
    pub fn into_channel(self) -> C {
        self.channel
    }
}
