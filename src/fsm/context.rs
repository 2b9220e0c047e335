//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` replaces free-standing globals: the pending input signal,
//! the latest sensor snapshot, the password buffer and failed-attempt
//! counter, output commands, and the task table all live here and are
//! passed by `&mut` to guards' snapshot builder, actions, key handlers and
//! task callbacks. Only the control loop thread touches it.

use heapless::String;

use super::SignalSource;
use crate::config::{PASSWORD_LEN, SystemConfig};
use crate::drivers::display::DisplayFrame;
use crate::error::SensorFault;
use crate::events::{InputRegister, InputSignal};
use crate::scheduler::Scheduler;
use crate::sensors::ClimateReading;

// ---------------------------------------------------------------------------
// Guard snapshot
// ---------------------------------------------------------------------------

/// Everything a guard may look at. `Copy`, so guards cannot mutate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Signals {
    pub input: InputSignal,
    pub cycle_elapsed: bool,
}

// ---------------------------------------------------------------------------
// Sensor snapshot (written by task callbacks)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorSnapshot {
    /// `None` until the first good read, and after a failed read.
    pub climate: Option<ClimateReading>,
    /// Raw light level; `None` after a failed read.
    pub light: Option<u16>,
    pub motion: bool,
    pub magnetic: bool,
    /// Accumulated [`SensorFault`] bits.
    pub faults: u8,
}

impl SensorSnapshot {
    pub fn set_fault(&mut self, fault: SensorFault) {
        self.faults |= fault.mask();
    }

    pub fn clear_fault(&mut self, fault: SensorFault) {
        self.faults &= !fault.mask();
    }

    pub fn has_fault(&self, fault: SensorFault) -> bool {
        self.faults & fault.mask() != 0
    }
}

// ---------------------------------------------------------------------------
// Output commands (written by handlers; applied by the controller)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputCommands {
    pub display: DisplayFrame,
    pub led_on: bool,
    pub buzzer_hz: Option<u16>,
}

impl OutputCommands {
    /// Blank display, LED off, buzzer silent.
    pub fn all_off() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Password entry
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct PasswordEntry {
    buffer: String<PASSWORD_LEN>,
    failed_attempts: u8,
}

impl PasswordEntry {
    /// Append a digit. Returns `false` once the buffer is full.
    pub fn push_digit(&mut self, digit: u8) -> bool {
        debug_assert!(digit < 10);
        self.buffer.push(char::from(b'0' + digit)).is_ok()
    }

    pub fn clear_buffer(&mut self) {
        self.buffer.clear();
    }

    pub fn entered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Exact comparison against the configured password.
    pub fn matches(&self, password: &str) -> bool {
        self.buffer.as_str() == password
    }

    pub fn failed_attempts(&self) -> u8 {
        self.failed_attempts
    }

    /// Count one more failure and return the new total.
    pub fn record_failure(&mut self) -> u8 {
        self.failed_attempts = self.failed_attempts.saturating_add(1);
        self.failed_attempts
    }

    pub fn reset_failures(&mut self) {
        self.failed_attempts = 0;
    }
}

/// What raised the alarm; recorded on alarm entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmCause {
    Temperature,
    Intrusion,
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

pub struct FsmContext {
    // -- Timing --
    /// Loop timestamp (milliseconds since boot), set before each iteration.
    pub now_ms: u64,

    // -- Configuration --
    pub config: SystemConfig,

    // -- Signals --
    pub input: InputRegister,

    // -- Sensor data --
    pub sensors: SensorSnapshot,

    // -- Access control --
    pub password: PasswordEntry,

    // -- Alarm --
    pub alarm_cause: Option<AlarmCause>,
    /// Tone currently selected by the alarm alternation.
    pub alarm_tone_high: bool,

    // -- Outputs --
    pub outputs: OutputCommands,

    // -- Timers --
    pub tasks: Scheduler,
}

impl FsmContext {
    pub fn new(config: SystemConfig) -> Self {
        let tasks = Scheduler::new(super::states::build_task_table(&config));
        Self {
            now_ms: 0,
            config,
            input: InputRegister::new(),
            sensors: SensorSnapshot::default(),
            password: PasswordEntry::default(),
            alarm_cause: None,
            alarm_tone_high: false,
            outputs: OutputCommands::all_off(),
            tasks,
        }
    }
}

impl SignalSource for FsmContext {
    fn signals(&self) -> Signals {
        Signals {
            input: self.input.signal(),
            cycle_elapsed: self.input.cycle_elapsed(),
        }
    }
}
