//! Single status LED on a GPIO output.
//!
//! The blink cadence is owned by the scheduler (`LockedBlink`,
//! `AlarmBlink`); this driver only mirrors the commanded level.

use embedded_hal::digital::OutputPin;

use crate::error::OutputError;

pub struct StatusLed<P> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> StatusLed<P> {
    pub fn new(pin: P) -> Self {
        Self { pin, on: false }
    }

    pub fn set(&mut self, on: bool) -> Result<(), OutputError> {
        let result = if on { self.pin.set_high() } else { self.pin.set_low() };
        result.map_err(|_| OutputError::GpioWriteFailed)?;
        self.on = on;
        Ok(())
    }

    pub fn off(&mut self) -> Result<(), OutputError> {
        self.set(false)
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
