//! Outbound application events.
//!
//! The [`Controller`](super::service::Controller) emits these through the
//! [`EventSink`](super::ports::EventSink) port.

use crate::events::InputSignal;
use crate::fsm::StateId;

pub use crate::fsm::context::AlarmCause;

/// Structured events emitted by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The controller has started (carries initial state).
    Started(StateId),

    /// The state machine fired a transition.
    StateChanged { from: StateId, to: StateId },

    /// A wrong password was submitted.
    PasswordRejected { attempts: u8, max: u8 },

    /// Too many wrong passwords; lockout begins.
    LockedOut,

    AlarmRaised(AlarmCause),

    /// One or more sensors failed to read (fault bitmask).
    SensorFault(u8),

    /// All sensor faults have cleared.
    SensorRecovered,

    /// A signal was set but no guard of the current state consumed it.
    InputDropped { state: StateId, signal: InputSignal },
}
