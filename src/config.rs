//! System configuration parameters
//!
//! Every fixed constant of the controller lives here. The configuration is
//! read once at startup; nothing changes it while the loop is running.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Password length accepted by the keypad handler.
pub const PASSWORD_LEN: usize = 4;

/// Factory password.
pub const DEFAULT_PASSWORD: &str = "1234";

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Access control ---
    /// Exact digit sequence that unlocks the system.
    pub password: String<PASSWORD_LEN>,
    /// Consecutive wrong submissions that force a lockout.
    pub max_failed_attempts: u8,
    /// Lockout duration (milliseconds)
    pub lockout_ms: u32,

    // --- Thresholds ---
    /// Temperature (Celsius) strictly above which the alarm is raised
    pub temperature_alarm_c: f32,

    // --- Monitoring cycle ---
    /// Time spent in environmental monitoring before switching (milliseconds)
    pub environment_cycle_ms: u32,
    /// Time spent in event monitoring before switching back (milliseconds)
    pub event_cycle_ms: u32,

    // --- Sensor polling ---
    pub climate_poll_ms: u32,
    pub light_poll_ms: u32,
    pub motion_poll_ms: u32,

    // --- Outputs ---
    /// LED blink period while locked out (milliseconds)
    pub locked_blink_ms: u32,
    /// LED blink and tone alternation period during an alarm (milliseconds)
    pub alarm_blink_ms: u32,
    /// How long the full-screen alarm banner stays up (milliseconds)
    pub alarm_banner_ms: u32,
    /// Constant buzzer tone while locked out (Hz)
    pub locked_tone_hz: u16,
    /// Alternating alarm tones (Hz)
    pub alarm_tones_hz: (u16, u16),

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // An oversized literal would leave it empty and fail `validate()`.
            password: String::try_from(DEFAULT_PASSWORD).unwrap_or_default(),
            max_failed_attempts: 3,
            lockout_ms: 7000,

            temperature_alarm_c: 30.0,

            environment_cycle_ms: 5000,
            event_cycle_ms: 3000,

            climate_poll_ms: 500,
            light_poll_ms: 500,
            motion_poll_ms: 500,

            locked_blink_ms: 500,
            alarm_blink_ms: 150,
            alarm_banner_ms: 2000,
            locked_tone_hz: 1000,
            alarm_tones_hz: (1000, 1500),

            control_loop_interval_ms: 10,
        }
    }
}

impl SystemConfig {
    /// Reject values the controller cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.password.len() != PASSWORD_LEN
            || !self.password.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(Error::Config("password must be exactly 4 digits"));
        }
        if self.max_failed_attempts == 0 {
            return Err(Error::Config("max_failed_attempts must be non-zero"));
        }
        if !self.temperature_alarm_c.is_finite() {
            return Err(Error::Config("temperature_alarm_c must be finite"));
        }
        let intervals = [
            self.lockout_ms,
            self.environment_cycle_ms,
            self.event_cycle_ms,
            self.climate_poll_ms,
            self.light_poll_ms,
            self.motion_poll_ms,
            self.locked_blink_ms,
            self.alarm_blink_ms,
            self.alarm_banner_ms,
            self.control_loop_interval_ms,
        ];
        if intervals.contains(&0) {
            return Err(Error::Config("intervals must be non-zero"));
        }
        if self.locked_tone_hz == 0 || self.alarm_tones_hz.0 == 0 || self.alarm_tones_hz.1 == 0 {
            return Err(Error::Config("tone frequencies must be non-zero"));
        }
        Ok(())
    }
}
