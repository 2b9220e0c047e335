//! Simulated sensor bank for host runs.
//!
//! Values live in atomics so the stdin reader thread of the simulator can
//! inject readings while the control loop samples them. Floats are stored
//! as their bit patterns.

use core::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, Ordering};
use std::sync::Arc;

use super::ClimateReading;
use crate::app::ports::SensorPort;
use crate::error::SensorError;

/// Injection handle shared between the simulator's input thread and
/// [`SimSensors`].
pub struct SimInputs {
    temperature_bits: AtomicU32,
    humidity_bits: AtomicU32,
    light_raw: AtomicU16,
    motion: AtomicBool,
    magnetic: AtomicBool,
    climate_fault: AtomicBool,
}

impl Default for SimInputs {
    fn default() -> Self {
        Self {
            temperature_bits: AtomicU32::new(21.0f32.to_bits()),
            humidity_bits: AtomicU32::new(45.0f32.to_bits()),
            light_raw: AtomicU16::new(512),
            motion: AtomicBool::new(false),
            magnetic: AtomicBool::new(false),
            climate_fault: AtomicBool::new(false),
        }
    }
}

impl SimInputs {
    pub fn set_temperature(&self, celsius: f32) {
        self.temperature_bits.store(celsius.to_bits(), Ordering::Relaxed);
    }

    pub fn set_humidity(&self, pct: f32) {
        self.humidity_bits.store(pct.to_bits(), Ordering::Relaxed);
    }

    pub fn set_light(&self, raw: u16) {
        self.light_raw.store(raw, Ordering::Relaxed);
    }

    pub fn set_motion(&self, detected: bool) {
        self.motion.store(detected, Ordering::Relaxed);
    }

    pub fn set_magnetic(&self, detected: bool) {
        self.magnetic.store(detected, Ordering::Relaxed);
    }

    /// Make every climate read fail until cleared.
    pub fn set_climate_fault(&self, failing: bool) {
        self.climate_fault.store(failing, Ordering::Relaxed);
    }
}

pub struct SimSensors {
    inputs: Arc<SimInputs>,
}

impl SimSensors {
    pub fn new(inputs: Arc<SimInputs>) -> Self {
        Self { inputs }
    }
}

impl SensorPort for SimSensors {
    fn read_climate(&mut self) -> Result<ClimateReading, SensorError> {
        if self.inputs.climate_fault.load(Ordering::Relaxed) {
            return Err(SensorError::ReadFailed);
        }
        ClimateReading {
            temperature_c: f32::from_bits(self.inputs.temperature_bits.load(Ordering::Relaxed)),
            humidity_pct: f32::from_bits(self.inputs.humidity_bits.load(Ordering::Relaxed)),
        }
        .validated()
    }

    fn read_light(&mut self) -> Result<u16, SensorError> {
        Ok(self.inputs.light_raw.load(Ordering::Relaxed))
    }

    fn read_motion(&mut self) -> Result<bool, SensorError> {
        Ok(self.inputs.motion.load(Ordering::Relaxed))
    }

    fn read_magnetic(&mut self) -> Result<bool, SensorError> {
        Ok(self.inputs.magnetic.load(Ordering::Relaxed))
    }
}
