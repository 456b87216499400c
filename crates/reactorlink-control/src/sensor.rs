/// A failed sensor read.
///
/// The controller treats a temperature fault as a safety-critical
/// condition, not a transient error: the step that observes it forces a
/// Scram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SensorFault {
    /// The hardware returned no usable reading.
    #[error("temperature read failed")]
    ReadFailed,

    /// The source is disconnected or not yet initialized.
    #[error("sensor unavailable")]
    Unavailable,
}

/// Sensor inputs consumed by the control loop.
///
/// The accelerometer read is infallible: a missing accelerometer reports a
/// fixed magnitude rather than a fault, so seismic handling degrades to
/// "no quake" instead of a forced shutdown.
pub trait SensorSource {
    /// Current core temperature in degrees Celsius.
    fn read_temperature(&mut self) -> Result<f32, SensorFault>;

    /// Current acceleration magnitude in g.
    fn read_acceleration(&mut self) -> f32;
}
