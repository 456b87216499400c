//! Binary payload layouts.
//!
//! Telemetry (14 bytes, little-endian):
//! `sample_id:u32 | temperature_c:f32 | accel_mag:f32 | state:u8 | power:u8`
//!
//! Command: `command_id:u8` followed by a little-endian `i32` value for
//! SET_POWER only.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{CommandError, WireError};
use crate::types::{Command, ReactorState, TelemetrySample};

/// Exact length of a TELEMETRY payload.
pub const TELEMETRY_PAYLOAD_LEN: usize = 14;

/// Command id: emergency shutdown.
pub const CMD_ID_SCRAM: u8 = 1;
/// Command id: return to Normal.
pub const CMD_ID_RESET_NORMAL: u8 = 2;
/// Command id: set power output (carries an i32 value).
pub const CMD_ID_SET_POWER: u8 = 3;

const SET_POWER_PAYLOAD_LEN: usize = 5;

/// Encode a telemetry sample into its 14-byte payload.
pub fn encode_telemetry(sample: &TelemetrySample) -> BytesMut {
    let mut buf = BytesMut::with_capacity(TELEMETRY_PAYLOAD_LEN);
    buf.put_u32_le(sample.sample_id);
    buf.put_f32_le(sample.temperature_c);
    buf.put_f32_le(sample.accel_mag);
    buf.put_u8(sample.state.as_u8());
    buf.put_u8(sample.power_percent);
    buf
}

/// Decode a TELEMETRY payload.
pub fn decode_telemetry(payload: &[u8]) -> Result<TelemetrySample, WireError> {
    if payload.len() != TELEMETRY_PAYLOAD_LEN {
        return Err(WireError::TelemetryLength {
            expected: TELEMETRY_PAYLOAD_LEN,
            actual: payload.len(),
        });
    }

    let mut buf = payload;
    let sample_id = buf.get_u32_le();
    let temperature_c = buf.get_f32_le();
    let accel_mag = buf.get_f32_le();
    let state_byte = buf.get_u8();
    let power_percent = buf.get_u8();

    let state = ReactorState::from_u8(state_byte).ok_or(WireError::UnknownState(state_byte))?;

    Ok(TelemetrySample {
        sample_id,
        temperature_c,
        accel_mag,
        state,
        power_percent,
    })
}

/// Encode a command into its COMMAND payload.
pub fn encode_command(cmd: &Command) -> BytesMut {
    let mut buf = BytesMut::with_capacity(SET_POWER_PAYLOAD_LEN);
    match cmd {
        Command::Scram => buf.put_u8(CMD_ID_SCRAM),
        Command::ResetNormal => buf.put_u8(CMD_ID_RESET_NORMAL),
        Command::SetPower(value) => {
            buf.put_u8(CMD_ID_SET_POWER);
            buf.put_i32_le(*value);
        }
    }
    buf
}

/// Decode a COMMAND payload.
pub fn decode_command(payload: &[u8]) -> Result<Command, CommandError> {
    let (&id, rest) = payload.split_first().ok_or(CommandError::Empty)?;

    match id {
        CMD_ID_SCRAM => Ok(Command::Scram),
        CMD_ID_RESET_NORMAL => Ok(Command::ResetNormal),
        CMD_ID_SET_POWER => {
            if payload.len() < SET_POWER_PAYLOAD_LEN {
                return Err(CommandError::TooShort {
                    expected: SET_POWER_PAYLOAD_LEN,
                    actual: payload.len(),
                });
            }
            let mut rest = rest;
            Ok(Command::SetPower(rest.get_i32_le()))
        }
        other => Err(CommandError::UnknownId(other)),
    }
}
