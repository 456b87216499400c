/// Errors decoding a TELEMETRY payload.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// The payload is not exactly the telemetry layout size.
    #[error("telemetry payload wrong length ({actual} bytes, expected {expected})")]
    TelemetryLength { expected: usize, actual: usize },

    /// The state byte does not name a known reactor state.
    #[error("unknown reactor state byte: {0}")]
    UnknownState(u8),
}

/// Errors decoding a COMMAND payload or translating an external command.
///
/// Receivers log these and discard the offending command; they are never
/// propagated as fatal and never disturb subsequent frames.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The payload carried no command id byte.
    #[error("empty command payload")]
    Empty,

    /// The command id byte is not one of the known commands.
    #[error("unknown command id: {0}")]
    UnknownId(u8),

    /// The payload is too short for the command's value field.
    #[error("command payload too short ({actual} bytes, expected {expected})")]
    TooShort { expected: usize, actual: usize },

    /// An external-channel command name is not one of the known commands.
    #[error("unknown command name: {0:?}")]
    UnknownName(String),
}
