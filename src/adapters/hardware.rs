//! Hardware adapter — bridges peripherals to domain port traits.
//!
//! Owns the sensor bank, the keypad and every output driver, exposing them
//! through [`SensorPort`], [`KeypadPort`] and [`OutputPort`]. On the host
//! the collaborators come from [`super::sim`]; on a board they would be
//! HAL-backed pins, an HD44780 driver and a PWM tone channel.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::{KeypadPort, OutputPort, SensorPort};
use crate::drivers::buzzer::{Buzzer, ToneGenerator};
use crate::drivers::display::{CharacterDisplay, DisplayFrame, LCD_ROWS};
use crate::drivers::keypad::Key;
use crate::drivers::status_led::StatusLed;
use crate::error::{OutputError, SensorError};
use crate::sensors::ClimateReading;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<S, K, D, L, T> {
    sensors: S,
    keypad: K,
    display: D,
    led: StatusLed<L>,
    buzzer: Buzzer<T>,
}

impl<S, K, D, L, T> HardwareAdapter<S, K, D, L, T>
where
    S: SensorPort,
    K: KeypadPort,
    D: CharacterDisplay,
    L: OutputPin,
    T: ToneGenerator,
{
    pub fn new(sensors: S, keypad: K, display: D, led: StatusLed<L>, buzzer: Buzzer<T>) -> Self {
        Self {
            sensors,
            keypad,
            display,
            led,
            buzzer,
        }
    }

    pub fn is_led_on(&self) -> bool {
        self.led.is_on()
    }

    pub fn current_tone(&self) -> Option<u16> {
        self.buzzer.current()
    }

    fn write_frame(&mut self, frame: &DisplayFrame) -> Result<(), OutputError> {
        self.display
            .clear()
            .map_err(|_| OutputError::DisplayWriteFailed)?;
        for row in 0..LCD_ROWS {
            self.display
                .write_row(row as u8, frame.row(row))
                .map_err(|_| OutputError::DisplayWriteFailed)?;
        }
        Ok(())
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<S, K, D, L, T> SensorPort for HardwareAdapter<S, K, D, L, T>
where
    S: SensorPort,
{
    fn read_climate(&mut self) -> Result<ClimateReading, SensorError> {
        self.sensors.read_climate()
    }

    fn read_light(&mut self) -> Result<u16, SensorError> {
        self.sensors.read_light()
    }

    fn read_motion(&mut self) -> Result<bool, SensorError> {
        self.sensors.read_motion()
    }

    fn read_magnetic(&mut self) -> Result<bool, SensorError> {
        self.sensors.read_magnetic()
    }
}

// ── KeypadPort implementation ─────────────────────────────────

impl<S, K, D, L, T> KeypadPort for HardwareAdapter<S, K, D, L, T>
where
    K: KeypadPort,
{
    fn read_key(&mut self) -> Option<Key> {
        self.keypad.read_key()
    }
}

// ── OutputPort implementation ─────────────────────────────────
//
// Output failures are logged and swallowed: the next change retries.

impl<S, K, D, L, T> OutputPort for HardwareAdapter<S, K, D, L, T>
where
    S: SensorPort,
    K: KeypadPort,
    D: CharacterDisplay,
    L: OutputPin,
    T: ToneGenerator,
{
    fn show(&mut self, frame: &DisplayFrame) {
        if let Err(e) = self.write_frame(frame) {
            warn!("Display: {}", e);
        }
    }

    fn set_led(&mut self, on: bool) {
        if let Err(e) = self.led.set(on) {
            warn!("LED: {}", e);
        }
    }

    fn set_buzzer(&mut self, tone_hz: Option<u16>) {
        if let Err(e) = self.buzzer.set(tone_hz) {
            warn!("Buzzer: {}", e);
        }
    }
}
