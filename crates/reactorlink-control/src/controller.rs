use tracing::{error, info, warn};

use reactorlink_proto::{Command, ReactorState, TelemetrySample};

use crate::sensor::SensorFault;

/// Default warning temperature threshold in °C.
pub const DEFAULT_WARNING_C: f32 = 45.0;
/// Default critical temperature threshold in °C.
pub const DEFAULT_CRITICAL_C: f32 = 50.0;
/// Power setting at startup and after a reset to Normal.
pub const DEFAULT_POWER_PERCENT: u8 = 50;

/// Acceleration above this forces an immediate Scram.
const MAJOR_QUAKE_G: f32 = 2.0;
/// Acceleration above this raises a Warning.
const MINOR_QUAKE_G: f32 = 0.8;
/// Dead band below the warning threshold before Warning clears. Prevents
/// rapid flapping when the temperature sits at the boundary.
const HYSTERESIS_C: f32 = 2.0;

/// The reactor safety state machine.
///
/// One instance per controller node, exclusively owned by the control
/// loop. Scram is sticky: sensor input never leaves it, only an explicit
/// [`Command::ResetNormal`] does.
#[derive(Debug)]
pub struct ReactorController {
    state: ReactorState,
    power_percent: u8,
    warning_threshold: f32,
    critical_threshold: f32,
}

impl Default for ReactorController {
    fn default() -> Self {
        Self::new()
    }
}

impl ReactorController {
    /// Controller with default thresholds, in Normal at default power.
    pub fn new() -> Self {
        Self::with_thresholds(DEFAULT_WARNING_C, DEFAULT_CRITICAL_C)
    }

    /// Controller with explicit temperature thresholds.
    pub fn with_thresholds(warning_c: f32, critical_c: f32) -> Self {
        Self {
            state: ReactorState::Normal,
            power_percent: DEFAULT_POWER_PERCENT,
            warning_threshold: warning_c,
            critical_threshold: critical_c,
        }
    }

    /// Current safety state.
    pub fn state(&self) -> ReactorState {
        self.state
    }

    /// Current power setting, 0..=100.
    pub fn power_percent(&self) -> u8 {
        self.power_percent
    }

    /// Apply an operator command. Commands take priority over sensor-driven
    /// transitions and apply from any prior state.
    pub fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Scram => {
                warn!("cmd: SCRAM");
                self.state = ReactorState::Scram;
                self.power_percent = 0;
            }
            Command::ResetNormal => {
                info!("cmd: RESET_NORMAL");
                self.state = ReactorState::Normal;
                self.power_percent = DEFAULT_POWER_PERCENT;
            }
            Command::SetPower(value) => {
                // Only touches power. While in Scram the next step zeroes
                // it again; the transient acceptance is the observed
                // behavior of the deployed firmware.
                self.power_percent = value.clamp(0, 100) as u8;
                info!(power = self.power_percent, "cmd: SET_POWER");
            }
        }
    }

    /// Run one control step and produce the post-transition sample.
    ///
    /// A temperature fault forces Scram on this step; the emitted sample
    /// then reports 0.0 °C. The caller owns the sample id and increments
    /// it by exactly 1 per step.
    pub fn step(
        &mut self,
        sample_id: u32,
        temperature: Result<f32, SensorFault>,
        accel_mag: f32,
    ) -> TelemetrySample {
        let temperature_c = match temperature {
            Ok(t) => t,
            Err(fault) => {
                error!(%fault, "temperature source failed, forcing scram");
                self.state = ReactorState::Scram;
                self.power_percent = 0;
                0.0
            }
        };

        self.evaluate(temperature_c, accel_mag);

        TelemetrySample {
            sample_id,
            temperature_c,
            accel_mag,
            state: self.state,
            power_percent: self.power_percent,
        }
    }

    fn evaluate(&mut self, temp: f32, accel: f32) {
        let major_quake = accel > MAJOR_QUAKE_G;
        let minor_quake = accel > MINOR_QUAKE_G;

        match self.state {
            ReactorState::Normal => {
                if temp >= self.critical_threshold || major_quake {
                    self.state = ReactorState::Scram;
                    self.power_percent = 0;
                    warn!(temp, accel, "NORMAL -> SCRAM");
                } else if temp >= self.warning_threshold || minor_quake {
                    self.state = ReactorState::Warning;
                    warn!(temp, accel, "NORMAL -> WARNING");
                }
            }
            ReactorState::Warning => {
                if temp >= self.critical_threshold || major_quake {
                    self.state = ReactorState::Scram;
                    self.power_percent = 0;
                    warn!(temp, accel, "WARNING -> SCRAM");
                } else if temp < self.warning_threshold - HYSTERESIS_C {
                    self.state = ReactorState::Normal;
                    info!(temp, "WARNING -> NORMAL");
                }
            }
            ReactorState::Scram => {
                // Sticky until an explicit reset command.
                self.power_percent = 0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_temps(ctrl: &mut ReactorController, temps: &[f32]) -> Vec<ReactorState> {
        temps
            .iter()
            .enumerate()
            .map(|(i, &t)| ctrl.step(i as u32, Ok(t), 0.0).state)
            .collect()
    }

    #[test]
    fn starts_normal_at_default_power() {
        let ctrl = ReactorController::new();
        assert_eq!(ctrl.state(), ReactorState::Normal);
        assert_eq!(ctrl.power_percent(), DEFAULT_POWER_PERCENT);
    }

    #[test]
    fn hysteresis_scenario() {
        // warning=45, critical=50, accel=0 throughout.
        let mut ctrl = ReactorController::new();
        let states = step_temps(&mut ctrl, &[44.0, 46.0, 49.0, 51.0, 47.0, 42.5, 42.0]);
        assert_eq!(
            states,
            vec![
                ReactorState::Normal,
                ReactorState::Warning,
                ReactorState::Warning,
                ReactorState::Scram,
                ReactorState::Scram,
                ReactorState::Scram,
                ReactorState::Scram,
            ]
        );
        assert_eq!(ctrl.power_percent(), 0);
    }

    #[test]
    fn hysteresis_recovery_scenario() {
        // 43.5 is still >= 45 - 2, so Warning holds until below 43.
        let mut ctrl = ReactorController::new();
        let states = step_temps(&mut ctrl, &[46.0, 43.5, 42.9]);
        assert_eq!(
            states,
            vec![
                ReactorState::Warning,
                ReactorState::Warning,
                ReactorState::Normal,
            ]
        );
    }

    #[test]
    fn major_quake_scrams_from_normal() {
        let mut ctrl = ReactorController::new();
        let sample = ctrl.step(0, Ok(25.0), 2.5);
        assert_eq!(sample.state, ReactorState::Scram);
        assert_eq!(sample.power_percent, 0);
    }

    #[test]
    fn minor_quake_warns_but_keeps_power() {
        let mut ctrl = ReactorController::new();
        let sample = ctrl.step(0, Ok(25.0), 1.0);
        assert_eq!(sample.state, ReactorState::Warning);
        assert_eq!(sample.power_percent, DEFAULT_POWER_PERCENT);
    }

    #[test]
    fn major_quake_scrams_from_warning() {
        let mut ctrl = ReactorController::new();
        ctrl.step(0, Ok(46.0), 0.0);
        assert_eq!(ctrl.state(), ReactorState::Warning);

        let sample = ctrl.step(1, Ok(46.0), 2.1);
        assert_eq!(sample.state, ReactorState::Scram);
    }

    #[test]
    fn scram_is_sticky_until_reset() {
        let mut ctrl = ReactorController::new();
        ctrl.handle_command(Command::Scram);
        assert_eq!(ctrl.state(), ReactorState::Scram);
        assert_eq!(ctrl.power_percent(), 0);

        // Perfectly healthy readings do not leave Scram.
        for i in 0..10 {
            let sample = ctrl.step(i, Ok(0.0), 0.0);
            assert_eq!(sample.state, ReactorState::Scram);
            assert_eq!(sample.power_percent, 0);
        }

        ctrl.handle_command(Command::ResetNormal);
        assert_eq!(ctrl.state(), ReactorState::Normal);
        assert_eq!(ctrl.power_percent(), DEFAULT_POWER_PERCENT);
    }

    #[test]
    fn set_power_clamps() {
        let mut ctrl = ReactorController::new();
        ctrl.handle_command(Command::SetPower(150));
        assert_eq!(ctrl.power_percent(), 100);
        ctrl.handle_command(Command::SetPower(-10));
        assert_eq!(ctrl.power_percent(), 0);
        ctrl.handle_command(Command::SetPower(75));
        assert_eq!(ctrl.power_percent(), 75);
    }

    #[test]
    fn set_power_does_not_change_state() {
        let mut ctrl = ReactorController::new();
        ctrl.step(0, Ok(46.0), 0.0);
        assert_eq!(ctrl.state(), ReactorState::Warning);

        ctrl.handle_command(Command::SetPower(80));
        assert_eq!(ctrl.state(), ReactorState::Warning);
        assert_eq!(ctrl.power_percent(), 80);
    }

    #[test]
    fn set_power_in_scram_is_transient() {
        let mut ctrl = ReactorController::new();
        ctrl.handle_command(Command::Scram);

        // Accepted between steps...
        ctrl.handle_command(Command::SetPower(80));
        assert_eq!(ctrl.power_percent(), 80);

        // ...and zeroed again by the next step while Scram persists.
        let sample = ctrl.step(0, Ok(20.0), 0.0);
        assert_eq!(sample.state, ReactorState::Scram);
        assert_eq!(sample.power_percent, 0);
    }

    #[test]
    fn sensor_fault_forces_scram() {
        let mut ctrl = ReactorController::new();
        let sample = ctrl.step(0, Err(SensorFault::ReadFailed), 0.0);
        assert_eq!(sample.state, ReactorState::Scram);
        assert_eq!(sample.power_percent, 0);
        assert_eq!(sample.temperature_c, 0.0);

        // Healthy readings afterwards stay scrammed.
        let sample = ctrl.step(1, Ok(20.0), 0.0);
        assert_eq!(sample.state, ReactorState::Scram);
    }

    #[test]
    fn critical_boundary_is_inclusive() {
        let mut ctrl = ReactorController::new();
        let sample = ctrl.step(0, Ok(50.0), 0.0);
        assert_eq!(sample.state, ReactorState::Scram);
    }

    #[test]
    fn warning_boundary_is_inclusive() {
        let mut ctrl = ReactorController::new();
        let sample = ctrl.step(0, Ok(45.0), 0.0);
        assert_eq!(sample.state, ReactorState::Warning);
    }

    #[test]
    fn sample_reflects_post_transition_state() {
        let mut ctrl = ReactorController::new();
        let sample = ctrl.step(42, Ok(51.0), 0.0);
        assert_eq!(sample.sample_id, 42);
        assert_eq!(sample.temperature_c, 51.0);
        assert_eq!(sample.state, ReactorState::Scram);
        assert_eq!(sample.power_percent, 0);
    }

    #[test]
    fn deterministic_across_runs() {
        let temps = [44.0, 46.0, 43.5, 49.9, 50.0, 20.0];
        let run = || {
            let mut ctrl = ReactorController::new();
            let mut states = Vec::new();
            for (i, &t) in temps.iter().enumerate() {
                if i == 2 {
                    ctrl.handle_command(Command::SetPower(60));
                }
                states.push(ctrl.step(i as u32, Ok(t), 0.1).state);
            }
            states
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn custom_thresholds_respected() {
        let mut ctrl = ReactorController::with_thresholds(30.0, 40.0);
        assert_eq!(ctrl.step(0, Ok(29.0), 0.0).state, ReactorState::Normal);
        assert_eq!(ctrl.step(1, Ok(31.0), 0.0).state, ReactorState::Warning);
        assert_eq!(ctrl.step(2, Ok(41.0), 0.0).state, ReactorState::Scram);
    }
}
