//! Node runtime for both ends of the reactor link.
//!
//! A node is a small set of blocking threads joined by bounded channels:
//!
//! - Controller: [`TelemetryPipeline`] runs the fixed-period control loop;
//!   [`run_controller_link`] moves telemetry out and commands in, with a
//!   [`CommandRouter`] between the link and the control loop.
//! - Agent: [`run_agent_link`] keeps a [`LatestSlot`] current with inbound
//!   telemetry; an [`UplinkBridge`] relays it to an external
//!   [`UplinkChannel`] and feeds operator commands back.
//!
//! Backpressure is drop-newest everywhere. No loop ever blocks on another.

pub mod error;
pub mod latest;
pub mod link;
pub mod pipeline;
pub mod queue;
pub mod router;
pub mod uplink;

pub use error::{NodeError, Result};
pub use latest::LatestSlot;
pub use link::{run_agent_link, run_controller_link, LinkConfig, DEFAULT_LINK_READ_TIMEOUT};
pub use pipeline::{PipelineConfig, TelemetryPipeline, DEFAULT_CONTROL_PERIOD};
pub use queue::{
    command_queue, send_or_drop, telemetry_queue, COMMAND_QUEUE_CAP, TELEMETRY_QUEUE_CAP,
};
pub use router::CommandRouter;
pub use uplink::{UplinkBridge, UplinkChannel, UplinkError};
