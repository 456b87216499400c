use serde::{Deserialize, Serialize};

/// Safety state of the reactor controller.
///
/// The discriminants are the wire encoding (the state byte in a telemetry
/// payload).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum ReactorState {
    Normal = 0,
    Warning = 1,
    Scram = 2,
}

impl ReactorState {
    /// Decode a state byte. Returns `None` for unknown values.
    pub fn from_u8(b: u8) -> Option<Self> {
        match b {
            0 => Some(Self::Normal),
            1 => Some(Self::Warning),
            2 => Some(Self::Scram),
            _ => None,
        }
    }

    /// The wire encoding of this state.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for ReactorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Normal => "NORMAL",
            Self::Warning => "WARNING",
            Self::Scram => "SCRAM",
        };
        f.write_str(name)
    }
}

/// One control step's worth of telemetry.
///
/// Produced once per step by the controller, immutable afterwards;
/// ownership moves from the control loop into the transmit queue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Monotonic per-node counter, incremented by 1 per control step and
    /// wrapping at `u32::MAX`.
    pub sample_id: u32,
    /// Core temperature in degrees Celsius.
    pub temperature_c: f32,
    /// Seismic acceleration magnitude in g.
    pub accel_mag: f32,
    /// Post-transition safety state.
    pub state: ReactorState,
    /// Commanded power output, 0..=100.
    pub power_percent: u8,
}

/// An operator command for the controller.
///
/// Created by decoding a COMMAND frame or an external inbound message;
/// consumed exactly once by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Emergency shutdown: force Scram, power to zero.
    Scram,
    /// Return to Normal at default power. The only way out of Scram.
    ResetNormal,
    /// Set power output; the raw value is clamped to 0..=100 on apply.
    SetPower(i32),
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scram => f.write_str("SCRAM"),
            Self::ResetNormal => f.write_str("RESET_NORMAL"),
            Self::SetPower(v) => write!(f, "SET_POWER({v})"),
        }
    }
}
