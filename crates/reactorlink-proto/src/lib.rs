//! Typed messages riding over reactorlink frames.
//!
//! Two payloads exist on the wire: the 14-byte TELEMETRY sample the
//! controller emits every control step, and the 1- or 5-byte COMMAND the
//! agent relays toward the controller. This crate owns their types, the
//! binary payload codecs, and the JSON shapes used on the external uplink
//! channel.

pub mod error;
pub mod types;
pub mod uplink;
pub mod wire;

pub use error::{CommandError, WireError};
pub use types::{Command, ReactorState, TelemetrySample};
pub use uplink::CommandMessage;
pub use wire::{
    decode_command, decode_telemetry, encode_command, encode_telemetry, CMD_ID_RESET_NORMAL,
    CMD_ID_SCRAM, CMD_ID_SET_POWER, TELEMETRY_PAYLOAD_LEN,
};
