//! Reactor safety state machine.
//!
//! [`ReactorController`] owns the safety state (Normal/Warning/Scram), the
//! power setting and the temperature thresholds. It is exclusively owned by
//! the control loop; all mutation goes through [`ReactorController::step`]
//! and [`ReactorController::handle_command`].

pub mod controller;
pub mod sensor;

pub use controller::{
    ReactorController, DEFAULT_CRITICAL_C, DEFAULT_POWER_PERCENT, DEFAULT_WARNING_C,
};
pub use sensor::{SensorFault, SensorSource};
