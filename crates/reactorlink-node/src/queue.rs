//! Bounded queues between the node's loops.
//!
//! Every hand-off between threads goes through a bounded channel with a
//! drop-newest overflow policy. A stalled consumer costs fresh data, never
//! memory or a blocked producer. Telemetry tolerates gaps (samples carry
//! ids); commands are small and rare enough that a full queue indicates an
//! operator flood, which is logged.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::warn;

use reactorlink_proto::{Command, TelemetrySample};

/// Telemetry backlog between the control loop and the link loop. At the
/// 100 ms control period this absorbs ~3 s of link stall.
pub const TELEMETRY_QUEUE_CAP: usize = 32;

/// Command backlog between the link loop and the control loop.
pub const COMMAND_QUEUE_CAP: usize = 8;

/// Bounded telemetry queue (control loop -> link loop).
pub fn telemetry_queue() -> (Sender<TelemetrySample>, Receiver<TelemetrySample>) {
    bounded(TELEMETRY_QUEUE_CAP)
}

/// Bounded command queue (link loop -> control loop, or uplink -> link loop).
pub fn command_queue() -> (Sender<Command>, Receiver<Command>) {
    bounded(COMMAND_QUEUE_CAP)
}

/// Non-blocking send with the drop-newest policy.
///
/// Returns whether the item was enqueued. Overflow and disconnection are
/// logged with the queue name, not propagated.
pub fn send_or_drop<T>(tx: &Sender<T>, item: T, queue: &str) -> bool {
    match tx.try_send(item) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            warn!(queue, "queue full, dropping newest");
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            warn!(queue, "queue disconnected, dropping");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reactorlink_proto::ReactorState;

    fn sample(id: u32) -> TelemetrySample {
        TelemetrySample {
            sample_id: id,
            temperature_c: 25.0,
            accel_mag: 0.0,
            state: ReactorState::Normal,
            power_percent: 50,
        }
    }

    #[test]
    fn full_queue_drops_newest() {
        let (tx, rx) = telemetry_queue();
        for i in 0..TELEMETRY_QUEUE_CAP as u32 {
            assert!(send_or_drop(&tx, sample(i), "telemetry"));
        }

        // Queue is at capacity; the newest sample is the one dropped.
        assert!(!send_or_drop(&tx, sample(999), "telemetry"));

        assert_eq!(rx.try_recv().unwrap().sample_id, 0);
        let drained: Vec<u32> = rx.try_iter().map(|s| s.sample_id).collect();
        assert_eq!(drained.last(), Some(&(TELEMETRY_QUEUE_CAP as u32 - 1)));
    }

    #[test]
    fn disconnected_queue_reports_drop() {
        let (tx, rx) = command_queue();
        drop(rx);
        assert!(!send_or_drop(&tx, Command::Scram, "commands"));
    }

    #[test]
    fn commands_preserve_order() {
        let (tx, rx) = command_queue();
        send_or_drop(&tx, Command::SetPower(10), "commands");
        send_or_drop(&tx, Command::Scram, "commands");
        send_or_drop(&tx, Command::ResetNormal, "commands");

        let drained: Vec<Command> = rx.try_iter().collect();
        assert_eq!(
            drained,
            vec![Command::SetPower(10), Command::Scram, Command::ResetNormal]
        );
    }
}
