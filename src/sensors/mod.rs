//! Sensor reading types and the host-side simulated sensor bank.
//!
//! Real drivers (DHT-class climate sensor, LDR on an ADC channel, PIR and
//! reed/hall inputs) implement [`SensorPort`](crate::app::ports::SensorPort)
//! in the hardware adapter. Every reading passes through a plausibility
//! check so a bad transaction surfaces as an error instead of a garbage
//! number.

pub mod sim;

use crate::error::SensorError;

const MIN_TEMPERATURE_C: f32 = -40.0;
const MAX_TEMPERATURE_C: f32 = 125.0;

/// One temperature + humidity sample (the sensor returns both per call).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

impl ClimateReading {
    /// Reject NaN and physically implausible values.
    pub fn validated(self) -> Result<Self, SensorError> {
        let t_ok = (MIN_TEMPERATURE_C..=MAX_TEMPERATURE_C).contains(&self.temperature_c);
        let h_ok = (0.0..=100.0).contains(&self.humidity_pct);
        if t_ok && h_ok {
            Ok(self)
        } else {
            Err(SensorError::OutOfRange)
        }
    }
}
