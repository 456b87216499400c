use serde::{Deserialize, Serialize};

use crate::error::CommandError;
use crate::types::Command;

/// External-channel command representation.
///
/// Inbound messages on the uplink channel name a command and optionally
/// carry a value, e.g. `{"command": "SET_POWER", "value": 75}`. The set of
/// commands maps 1:1 onto the link's COMMAND payloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandMessage {
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,
}

/// Default power applied when a SET_POWER message omits its value.
const DEFAULT_SET_POWER: i32 = 50;

impl CommandMessage {
    /// Translate to a typed command.
    ///
    /// A SET_POWER message without a value falls back to 50%, matching the
    /// field behavior of the deployed agents.
    pub fn to_command(&self) -> Result<Command, CommandError> {
        match self.command.as_str() {
            "SCRAM" => Ok(Command::Scram),
            "RESET_NORMAL" => Ok(Command::ResetNormal),
            "SET_POWER" => Ok(Command::SetPower(self.value.unwrap_or(DEFAULT_SET_POWER))),
            other => Err(CommandError::UnknownName(other.to_string())),
        }
    }
}

impl From<Command> for CommandMessage {
    fn from(cmd: Command) -> Self {
        match cmd {
            Command::Scram => Self {
                command: "SCRAM".to_string(),
                value: None,
            },
            Command::ResetNormal => Self {
                command: "RESET_NORMAL".to_string(),
                value: None,
            },
            Command::SetPower(value) => Self {
                command: "SET_POWER".to_string(),
                value: Some(value),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_roundtrip_through_command() {
        let msg: CommandMessage =
            serde_json::from_str(r#"{"command": "SET_POWER", "value": 75}"#).unwrap();
        assert_eq!(msg.to_command().unwrap(), Command::SetPower(75));

        let back = CommandMessage::from(Command::SetPower(75));
        assert_eq!(back, msg);
    }

    #[test]
    fn scram_and_reset_need_no_value() {
        let scram: CommandMessage = serde_json::from_str(r#"{"command": "SCRAM"}"#).unwrap();
        assert_eq!(scram.to_command().unwrap(), Command::Scram);

        let reset: CommandMessage = serde_json::from_str(r#"{"command": "RESET_NORMAL"}"#).unwrap();
        assert_eq!(reset.to_command().unwrap(), Command::ResetNormal);
    }

    #[test]
    fn set_power_without_value_defaults() {
        let msg: CommandMessage = serde_json::from_str(r#"{"command": "SET_POWER"}"#).unwrap();
        assert_eq!(msg.to_command().unwrap(), Command::SetPower(50));
    }

    #[test]
    fn unknown_command_name_rejected() {
        let msg: CommandMessage = serde_json::from_str(r#"{"command": "MELTDOWN"}"#).unwrap();
        assert_eq!(
            msg.to_command().unwrap_err(),
            CommandError::UnknownName("MELTDOWN".to_string())
        );
    }

    #[test]
    fn value_omitted_from_json_when_none() {
        let json = serde_json::to_string(&CommandMessage::from(Command::Scram)).unwrap();
        assert_eq!(json, r#"{"command":"SCRAM"}"#);
    }
}
