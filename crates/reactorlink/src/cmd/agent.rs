use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, info, warn};

use reactorlink_node::{
    command_queue, run_agent_link, LatestSlot, LinkConfig, UplinkBridge, UplinkChannel,
    UplinkError,
};
use reactorlink_proto::{CommandMessage, TelemetrySample};

use crate::cmd::{install_ctrlc_handler, open_link, AgentArgs};
use crate::exit::{node_error, CliError, CliResult, INTERNAL, SUCCESS, USAGE};
use crate::output::{print_sample, OutputFormat};

pub fn run(args: AgentArgs, format: OutputFormat) -> CliResult<i32> {
    if args.poll_ms == 0 {
        return Err(CliError::new(USAGE, "--poll-ms must be greater than zero"));
    }

    let stream = open_link(&args.link)?;

    let latest = LatestSlot::new();
    let (out_tx, out_rx) = command_queue();

    let shutdown = Arc::new(AtomicBool::new(false));
    install_ctrlc_handler(Arc::clone(&shutdown))?;

    let link_latest = latest.clone();
    let link_shutdown = Arc::clone(&shutdown);
    let link_thread = thread::spawn(move || {
        run_agent_link(
            stream,
            link_latest,
            out_rx,
            LinkConfig::default(),
            &link_shutdown,
        )
    });

    info!("agent node up");
    let mut bridge = UplinkBridge::new(StdioUplink::spawn(format), latest, out_tx);
    let interval = Duration::from_millis(args.poll_ms);
    while !shutdown.load(Ordering::Relaxed) && !link_thread.is_finished() {
        bridge.poll();
        thread::sleep(interval);
    }

    shutdown.store(true, Ordering::Relaxed);
    let result = link_thread
        .join()
        .map_err(|_| CliError::new(INTERNAL, "link loop panicked"))?;
    result.map_err(|err| node_error("link loop failed", err))?;
    Ok(SUCCESS)
}

/// Line-oriented JSON uplink over stdio.
///
/// Telemetry goes to stdout, one sample per line in the selected output
/// format. Inbound command messages arrive as JSON lines on stdin, read by
/// a dedicated thread so the bridge never blocks on a quiet terminal.
struct StdioUplink {
    format: OutputFormat,
    inbound: Receiver<CommandMessage>,
}

impl StdioUplink {
    fn spawn(format: OutputFormat) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(16);
        thread::spawn(move || {
            let stdin = std::io::stdin();
            read_command_lines(stdin.lock(), tx);
            debug!("uplink stdin closed");
        });
        Self {
            format,
            inbound: rx,
        }
    }
}

impl UplinkChannel for StdioUplink {
    fn publish(&mut self, sample: &TelemetrySample) -> Result<(), UplinkError> {
        print_sample(sample, self.format);
        Ok(())
    }

    fn poll_command(&mut self) -> Option<CommandMessage> {
        self.inbound.try_recv().ok()
    }
}

fn read_command_lines(reader: impl BufRead, tx: Sender<CommandMessage>) {
    for line in reader.lines() {
        let Ok(line) = line else { break };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<CommandMessage>(trimmed) {
            Ok(msg) => {
                if tx.send(msg).is_err() {
                    break;
                }
            }
            Err(err) => warn!(%err, "ignoring malformed uplink line"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn parses_json_lines_and_skips_garbage() {
        let input = concat!(
            "{\"command\": \"SCRAM\"}\n",
            "\n",
            "not json\n",
            "{\"command\": \"SET_POWER\", \"value\": 65}\n",
        );
        let (tx, rx) = crossbeam_channel::unbounded();

        read_command_lines(Cursor::new(input), tx);

        let received: Vec<CommandMessage> = rx.try_iter().collect();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].command, "SCRAM");
        assert_eq!(received[1].value, Some(65));
    }

    #[test]
    fn stops_when_receiver_dropped() {
        let input = "{\"command\": \"SCRAM\"}\n{\"command\": \"SCRAM\"}\n";
        let (tx, rx) = crossbeam_channel::unbounded();
        drop(rx);

        // Must return, not panic, once the bridge side is gone.
        read_command_lines(Cursor::new(input), tx);
    }
}
