use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use tracing::{debug, info, warn};

use reactorlink_control::{ReactorController, SensorSource};
use reactorlink_proto::{Command, TelemetrySample};

/// Default control period.
pub const DEFAULT_CONTROL_PERIOD: Duration = Duration::from_millis(100);

/// Control loop configuration.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    /// Fixed interval between control steps.
    pub period: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_CONTROL_PERIOD,
        }
    }
}

/// The controller node's fixed-period control loop.
///
/// Each tick drains pending commands in arrival order, reads the sensors,
/// runs one controller step and emits the resulting sample toward the link
/// loop. The pipeline exclusively owns the controller and the sensor
/// source; no other thread touches either.
pub struct TelemetryPipeline<S> {
    controller: ReactorController,
    sensor: S,
    commands: Receiver<Command>,
    telemetry: Sender<TelemetrySample>,
    config: PipelineConfig,
    sample_id: u32,
}

impl<S: SensorSource> TelemetryPipeline<S> {
    pub fn new(
        controller: ReactorController,
        sensor: S,
        commands: Receiver<Command>,
        telemetry: Sender<TelemetrySample>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            controller,
            sensor,
            commands,
            telemetry,
            config,
            sample_id: 0,
        }
    }

    /// Run one control step and return the emitted sample.
    ///
    /// Commands queued since the last tick apply before the step, in the
    /// order they arrived. A full telemetry queue drops this sample.
    pub fn tick(&mut self) -> TelemetrySample {
        while let Ok(cmd) = self.commands.try_recv() {
            self.controller.handle_command(cmd);
        }

        let temperature = self.sensor.read_temperature();
        let accel_mag = self.sensor.read_acceleration();

        let sample = self
            .controller
            .step(self.sample_id, temperature, accel_mag);
        self.sample_id = self.sample_id.wrapping_add(1);

        match self.telemetry.try_send(sample) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                warn!(
                    sample_id = dropped.sample_id,
                    "telemetry queue full, dropping sample"
                );
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!("telemetry queue disconnected");
            }
        }

        sample
    }

    /// Run ticks at the configured period until `shutdown` is set.
    ///
    /// The schedule is deadline-based: a slow tick shortens the following
    /// sleep instead of shifting every later deadline.
    pub fn run(&mut self, shutdown: &AtomicBool) {
        info!(period_ms = self.config.period.as_millis() as u64, "control loop started");

        let mut deadline = Instant::now() + self.config.period;
        while !shutdown.load(Ordering::Relaxed) {
            self.tick();

            let now = Instant::now();
            if deadline > now {
                thread::sleep(deadline - now);
            }
            deadline += self.config.period;
        }

        info!("control loop stopped");
    }

    /// Borrow the controller, mainly for inspection in tests.
    pub fn controller(&self) -> &ReactorController {
        &self.controller
    }
}
