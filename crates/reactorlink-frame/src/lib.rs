//! Checked binary framing for the reactor serial link.
//!
//! This is the core value-add layer of reactorlink. Every message is framed
//! with:
//! - A start byte (0xAA) for stream synchronization
//! - A 1-byte message type
//! - A 1-byte payload length (max 64)
//! - An XOR checksum over type, length and payload
//!
//! The decoder is a persistent byte-level state machine: feed it arbitrary
//! chunks and it emits validated frames, silently resynchronizing past
//! corruption. No partial reads, no buffer management in user code.

pub mod codec;
pub mod error;
pub mod msg_type;
pub mod reader;
pub mod writer;

pub use codec::{
    checksum, encode_frame, DecoderStats, Frame, FrameConfig, FrameDecoder, HEADER_SIZE,
    MAX_PAYLOAD_LEN, START_BYTE,
};
pub use error::{FrameError, Result};
pub use msg_type::{msg_type_name, COMMAND, TELEMETRY};
pub use reader::FrameReader;
pub use writer::FrameWriter;
