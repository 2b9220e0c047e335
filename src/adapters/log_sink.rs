//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (stderr on the host, UART on a board). A networked
//! reporter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] as one line.
#[derive(Debug, Default)]
pub struct LogEventSink {
    emitted: u64,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events written since construction.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        self.emitted += 1;
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={}", state.name());
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {} -> {}", from.name(), to.name());
            }
            AppEvent::PasswordRejected { attempts, max } => {
                warn!("AUTH  | password rejected ({attempts}/{max})");
            }
            AppEvent::LockedOut => {
                warn!("AUTH  | locked out");
            }
            AppEvent::AlarmRaised(cause) => {
                warn!("ALARM | cause={:?}", cause);
            }
            AppEvent::SensorFault(flags) => {
                warn!("FAULT | sensor flags=0b{:04b}", flags);
            }
            AppEvent::SensorRecovered => {
                info!("FAULT | all cleared");
            }
            AppEvent::InputDropped { state, signal } => {
                info!("INPUT | {:?} dropped in {}", signal, state.name());
            }
        }
    }
}
