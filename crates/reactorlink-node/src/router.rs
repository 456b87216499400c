use crossbeam_channel::Sender;
use tracing::{debug, warn};

use reactorlink_frame::{msg_type_name, Frame, COMMAND};
use reactorlink_proto::{decode_command, Command};

use crate::queue::send_or_drop;

/// Routes decoded frames from the controller's link loop to the control
/// loop's command queue.
///
/// Anything that is not a well-formed COMMAND frame is logged and
/// discarded. The link must keep moving regardless of what arrives.
#[derive(Debug, Clone)]
pub struct CommandRouter {
    commands: Sender<Command>,
}

impl CommandRouter {
    pub fn new(commands: Sender<Command>) -> Self {
        Self { commands }
    }

    /// Dispatch one frame. Returns whether a command was enqueued.
    pub fn route(&self, frame: &Frame) -> bool {
        if frame.msg_type != COMMAND {
            warn!(
                msg_type = frame.msg_type,
                name = msg_type_name(frame.msg_type),
                "unexpected frame on command path, discarding"
            );
            return false;
        }

        match decode_command(&frame.payload) {
            Ok(cmd) => {
                debug!(%cmd, "routing command");
                send_or_drop(&self.commands, cmd, "commands")
            }
            Err(err) => {
                warn!(%err, "discarding malformed command payload");
                false
            }
        }
    }
}
