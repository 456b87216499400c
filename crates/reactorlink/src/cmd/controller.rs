use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::info;

use reactorlink_control::{ReactorController, SensorFault, SensorSource};
use reactorlink_node::{
    command_queue, run_controller_link, telemetry_queue, CommandRouter, LinkConfig,
    PipelineConfig, TelemetryPipeline,
};

use crate::cmd::{install_ctrlc_handler, open_link, ControllerArgs};
use crate::exit::{node_error, CliError, CliResult, INTERNAL, SUCCESS, USAGE};

pub fn run(args: ControllerArgs) -> CliResult<i32> {
    if args.period_ms == 0 {
        return Err(CliError::new(USAGE, "--period-ms must be greater than zero"));
    }
    if args.critical <= args.warning {
        return Err(CliError::new(USAGE, "--critical must be above --warning"));
    }

    let stream = open_link(&args.link)?;

    let (cmd_tx, cmd_rx) = command_queue();
    let (tel_tx, tel_rx) = telemetry_queue();

    let shutdown = Arc::new(AtomicBool::new(false));
    install_ctrlc_handler(Arc::clone(&shutdown))?;

    let sensor = SimulatedSensor {
        temp: args.temp,
        temp_step: args.temp_step,
        accel: args.accel,
        fault_after: args.fault_after,
        reads: 0,
    };
    let mut pipeline = TelemetryPipeline::new(
        ReactorController::with_thresholds(args.warning, args.critical),
        sensor,
        cmd_rx,
        tel_tx,
        PipelineConfig {
            period: Duration::from_millis(args.period_ms),
        },
    );

    let control_shutdown = Arc::clone(&shutdown);
    let control_thread = thread::spawn(move || pipeline.run(&control_shutdown));

    info!("controller node up");
    let result = run_controller_link(
        stream,
        tel_rx,
        CommandRouter::new(cmd_tx),
        LinkConfig::default(),
        &shutdown,
    );

    // The link is gone either way; stop the control loop before reporting.
    shutdown.store(true, Ordering::Relaxed);
    control_thread
        .join()
        .map_err(|_| CliError::new(INTERNAL, "control loop panicked"))?;

    result.map_err(|err| node_error("link loop failed", err))?;
    Ok(SUCCESS)
}

/// Deterministic stand-in for the reactor's sensor package.
///
/// Temperature starts at a fixed value and drifts linearly; acceleration
/// is constant. An optional read budget turns the temperature source
/// faulty, which exercises the forced-Scram path end to end.
struct SimulatedSensor {
    temp: f32,
    temp_step: f32,
    accel: f32,
    fault_after: Option<u32>,
    reads: u32,
}

impl SensorSource for SimulatedSensor {
    fn read_temperature(&mut self) -> Result<f32, SensorFault> {
        if let Some(limit) = self.fault_after {
            if self.reads >= limit {
                return Err(SensorFault::ReadFailed);
            }
        }
        let reading = self.temp;
        self.temp += self.temp_step;
        self.reads = self.reads.saturating_add(1);
        Ok(reading)
    }

    fn read_acceleration(&mut self) -> f32 {
        self.accel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_drifts_linearly() {
        let mut sensor = SimulatedSensor {
            temp: 40.0,
            temp_step: 0.5,
            accel: 0.0,
            fault_after: None,
            reads: 0,
        };
        assert_eq!(sensor.read_temperature().unwrap(), 40.0);
        assert_eq!(sensor.read_temperature().unwrap(), 40.5);
        assert_eq!(sensor.read_temperature().unwrap(), 41.0);
    }

    #[test]
    fn faults_after_budget() {
        let mut sensor = SimulatedSensor {
            temp: 25.0,
            temp_step: 0.0,
            accel: 0.0,
            fault_after: Some(2),
            reads: 0,
        };
        assert!(sensor.read_temperature().is_ok());
        assert!(sensor.read_temperature().is_ok());
        assert_eq!(
            sensor.read_temperature().unwrap_err(),
            SensorFault::ReadFailed
        );
        // Once faulted, stays faulted.
        assert!(sensor.read_temperature().is_err());
    }
}
