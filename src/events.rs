//! Input signal register.
//!
//! Signals are produced by:
//! - the per-state keypad handler (password accepted, lockout, acknowledge)
//! - periodic task callbacks (lockout timer, sensor thresholds)
//!
//! and consumed by the state machine guards in the same loop iteration.
//!
//! ```text
//! ┌─────────────┐     ┌───────────────┐     ┌──────────────┐
//! │ Keypad      │────▶│               │     │              │
//! │ Task timers │────▶│ InputRegister │────▶│ FSM guards   │
//! │ Sensor poll │────▶│  (one slot)   │     │              │
//! └─────────────┘     └───────────────┘     └──────────────┘
//!                            ▲
//!                            └── clear() at end of every iteration
//! ```
//!
//! There is exactly one slot. If two producers write in the same iteration,
//! the last write wins; the overwrite is logged and counted so the race is
//! observable. A signal that no guard of the current state matches is
//! dropped when the slot is cleared.

use log::warn;

/// The pending discrete trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputSignal {
    #[default]
    None,
    /// A timer elapsed or the user confirmed (password accepted, `#` ack).
    TimeExpired,
    /// Primary sensor threshold crossed (temperature above the limit).
    PrimaryThresholdEvent,
    /// Secondary event: lockout in Idle, motion/field in event monitoring.
    SecondaryEvent,
}

impl InputSignal {
    pub fn is_none(self) -> bool {
        self == Self::None
    }
}

/// Single-slot register plus the monitoring-cycle trigger flag.
#[derive(Debug, Default)]
pub struct InputRegister {
    signal: InputSignal,
    /// Trigger flag for the monitoring cycle timers. Never overwrites
    /// `signal`; when both are set, transition registration order decides.
    cycle_elapsed: bool,
    overwrites: u32,
}

impl InputRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deposit a signal. Returns the signal it displaced, if any.
    pub fn set(&mut self, signal: InputSignal) -> Option<InputSignal> {
        let previous = self.signal;
        self.signal = signal;
        if previous.is_none() || previous == signal {
            return None;
        }
        self.overwrites = self.overwrites.wrapping_add(1);
        warn!("Input: {:?} overwritten by {:?} before consumption", previous, signal);
        Some(previous)
    }

    pub fn signal(&self) -> InputSignal {
        self.signal
    }

    pub fn mark_cycle_elapsed(&mut self) {
        self.cycle_elapsed = true;
    }

    pub fn cycle_elapsed(&self) -> bool {
        self.cycle_elapsed
    }

    /// Reset the slot and the cycle flag unconditionally.
    /// Returns whatever signal was still pending.
    pub fn clear(&mut self) -> InputSignal {
        self.cycle_elapsed = false;
        core::mem::take(&mut self.signal)
    }

    /// Total overwrites since startup.
    pub fn overwrites(&self) -> u32 {
        self.overwrites
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let reg = InputRegister::new();
        assert_eq!(reg.signal(), InputSignal::None);
        assert!(!reg.cycle_elapsed());
    }

    #[test]
    fn last_write_wins() {
        let mut reg = InputRegister::new();
        assert_eq!(reg.set(InputSignal::PrimaryThresholdEvent), None);
        assert_eq!(
            reg.set(InputSignal::TimeExpired),
            Some(InputSignal::PrimaryThresholdEvent)
        );
        assert_eq!(reg.signal(), InputSignal::TimeExpired);
        assert_eq!(reg.overwrites(), 1);
    }

    #[test]
    fn rewriting_same_signal_is_not_an_overwrite() {
        let mut reg = InputRegister::new();
        reg.set(InputSignal::SecondaryEvent);
        assert_eq!(reg.set(InputSignal::SecondaryEvent), None);
        assert_eq!(reg.overwrites(), 0);
    }

    #[test]
    fn clear_returns_pending_and_resets() {
        let mut reg = InputRegister::new();
        reg.set(InputSignal::SecondaryEvent);
        reg.mark_cycle_elapsed();
        assert_eq!(reg.clear(), InputSignal::SecondaryEvent);
        assert_eq!(reg.signal(), InputSignal::None);
        assert!(!reg.cycle_elapsed());
        assert_eq!(reg.clear(), InputSignal::None);
    }
}
