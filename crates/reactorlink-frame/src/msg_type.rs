//! Message type bytes.
//!
//! Both nodes speak exactly two message types: the controller sends
//! TELEMETRY frames, the agent sends COMMAND frames. Anything else on the
//! wire is logged and dropped by the receiving loop.

/// Periodic telemetry sample from the controller.
pub const TELEMETRY: u8 = 0x01;

/// Operator command for the controller.
pub const COMMAND: u8 = 0x10;

/// Returns a human-readable name for a message type byte.
pub fn msg_type_name(msg_type: u8) -> &'static str {
    match msg_type {
        TELEMETRY => "TELEMETRY",
        COMMAND => "COMMAND",
        _ => "UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(msg_type_name(TELEMETRY), "TELEMETRY");
        assert_eq!(msg_type_name(COMMAND), "COMMAND");
        assert_eq!(msg_type_name(0x7F), "UNKNOWN");
    }
}
