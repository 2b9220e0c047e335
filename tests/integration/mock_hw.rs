//! Mock hardware adapter for integration tests.
//!
//! Implements every port: sensors return settable values, the keypad
//! replays a scripted queue (one key per scan), and every output call is
//! recorded so tests can assert on the full command history.

use std::collections::VecDeque;

use secmon::app::events::AppEvent;
use secmon::app::ports::{EventSink, KeypadPort, OutputPort, SensorPort};
use secmon::app::service::Controller;
use secmon::config::SystemConfig;
use secmon::drivers::display::DisplayFrame;
use secmon::drivers::keypad::Key;
use secmon::error::SensorError;
use secmon::fsm::StateId;
use secmon::sensors::ClimateReading;

// ── Output call record ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum OutputCall {
    Show(DisplayFrame),
    Led(bool),
    Buzzer(Option<u16>),
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub climate: Result<ClimateReading, SensorError>,
    pub light: Result<u16, SensorError>,
    pub motion: bool,
    pub magnetic: bool,
    pub keys: VecDeque<Key>,
    pub calls: Vec<OutputCall>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            climate: Ok(ClimateReading {
                temperature_c: 22.0,
                humidity_pct: 40.0,
            }),
            light: Ok(512),
            motion: false,
            magnetic: false,
            keys: VecDeque::new(),
            calls: Vec::new(),
        }
    }

    pub fn set_temperature(&mut self, temperature_c: f32) {
        self.climate = Ok(ClimateReading {
            temperature_c,
            humidity_pct: 40.0,
        });
    }

    pub fn queue_keys(&mut self, keys: &str) {
        self.keys
            .extend(keys.chars().filter_map(Key::from_char));
    }

    /// Most recent frame pushed to the display.
    pub fn screen(&self) -> Option<&DisplayFrame> {
        self.calls.iter().rev().find_map(|c| match c {
            OutputCall::Show(f) => Some(f),
            _ => None,
        })
    }

    pub fn led(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                OutputCall::Led(on) => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn buzzer(&self) -> Option<u16> {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                OutputCall::Buzzer(hz) => Some(*hz),
                _ => None,
            })
            .flatten()
    }

    pub fn tones_played(&self) -> Vec<u16> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                OutputCall::Buzzer(Some(hz)) => Some(*hz),
                _ => None,
            })
            .collect()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_climate(&mut self) -> Result<ClimateReading, SensorError> {
        self.climate
    }

    fn read_light(&mut self) -> Result<u16, SensorError> {
        self.light
    }

    fn read_motion(&mut self) -> Result<bool, SensorError> {
        Ok(self.motion)
    }

    fn read_magnetic(&mut self) -> Result<bool, SensorError> {
        Ok(self.magnetic)
    }
}

impl KeypadPort for MockHardware {
    fn read_key(&mut self) -> Option<Key> {
        self.keys.pop_front()
    }
}

impl OutputPort for MockHardware {
    fn show(&mut self, frame: &DisplayFrame) {
        self.calls.push(OutputCall::Show(frame.clone()));
    }

    fn set_led(&mut self, on: bool) {
        self.calls.push(OutputCall::Led(on));
    }

    fn set_buzzer(&mut self, tone_hz: Option<u16>) {
        self.calls.push(OutputCall::Buzzer(tone_hz));
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

// ── Rig: controller + mocks + simulated clock ─────────────────

/// Control-loop period used by every rig.
pub const STEP_MS: u64 = 10;

pub struct Rig {
    pub ctl: Controller,
    pub hw: MockHardware,
    pub sink: RecordingSink,
    /// Timestamp of the next iteration.
    pub now: u64,
    /// Timestamp of the last iteration that ran.
    pub last: u64,
}

#[allow(dead_code)]
impl Rig {
    pub fn new() -> Self {
        Self::with_config(SystemConfig::default())
    }

    pub fn with_config(config: SystemConfig) -> Self {
        let mut ctl = Controller::new(config).expect("valid config");
        let mut sink = RecordingSink::default();
        ctl.start(&mut sink);
        Self {
            ctl,
            hw: MockHardware::new(),
            sink,
            now: 0,
            last: 0,
        }
    }

    pub fn state(&self) -> StateId {
        self.ctl.state()
    }

    pub fn step(&mut self) {
        self.ctl.run_once(self.now, &mut self.hw, &mut self.sink);
        self.last = self.now;
        self.now += STEP_MS;
    }

    /// Run iterations up to and including timestamp `t`.
    pub fn run_through(&mut self, t: u64) {
        while self.now <= t {
            self.step();
        }
    }

    /// Run for `ms` milliseconds of simulated time.
    pub fn run_for(&mut self, ms: u64) {
        let end = self.now + ms;
        while self.now < end {
            self.step();
        }
    }

    /// Type `keys` and run until the last one has been handled.
    pub fn press(&mut self, keys: &str) {
        self.hw.queue_keys(keys);
        while !self.hw.keys.is_empty() {
            self.step();
        }
    }

    /// Log in and return the timestamp monitoring started at.
    pub fn login(&mut self) -> u64 {
        self.press("1234#");
        assert_eq!(self.state(), StateId::EnvironmentalMonitoring);
        self.last
    }
}
