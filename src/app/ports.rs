//! Port traits — the boundary between the controller and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Driven adapters (sensors, keypad, outputs, event sinks) implement these
//! traits. The [`Controller`](super::service::Controller) consumes them via
//! generics, so the state machine never touches hardware directly.

use crate::drivers::display::DisplayFrame;
use crate::drivers::keypad::Key;
use crate::error::SensorError;
use crate::scheduler::TaskId;
use crate::sensors::ClimateReading;

// ───────────────────────────────────────────────────────────────
// Sensor port (hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port. Called only from periodic task callbacks, never from
/// guards.
pub trait SensorPort {
    /// Temperature and humidity in one transaction.
    fn read_climate(&mut self) -> Result<ClimateReading, SensorError>;

    /// Raw light level (ADC counts).
    fn read_light(&mut self) -> Result<u16, SensorError>;

    fn read_motion(&mut self) -> Result<bool, SensorError>;

    fn read_magnetic(&mut self) -> Result<bool, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Keypad port (hardware → domain)
// ───────────────────────────────────────────────────────────────

pub trait KeypadPort {
    /// At most one newly pressed key per call.
    fn read_key(&mut self) -> Option<Key>;
}

// ───────────────────────────────────────────────────────────────
// Output port (domain → hardware)
// ───────────────────────────────────────────────────────────────

pub trait OutputPort {
    /// Clear the panel and write both rows.
    fn show(&mut self, frame: &DisplayFrame);

    fn set_led(&mut self, on: bool);

    /// `Some(hz)` for a tone, `None` for silence.
    fn set_buzzer(&mut self, tone_hz: Option<u16>);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging)
// ───────────────────────────────────────────────────────────────

pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate
// ───────────────────────────────────────────────────────────────

/// Callback trait that the [`Scheduler`](crate::scheduler::Scheduler)
/// invokes when a task fires. The scheduler itself knows nothing about
/// sensors, signals, or outputs.
pub trait SchedulerDelegate {
    fn on_task_fired(&mut self, task: TaskId);
}
