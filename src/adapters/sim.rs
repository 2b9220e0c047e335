//! Host simulation collaborators.
//!
//! Stands in for the board so the full controller runs in a terminal:
//!
//! | Collaborator      | Replaces                    | Backed by            |
//! |-------------------|-----------------------------|----------------------|
//! | `ChannelKeypad`   | 4×4 matrix keypad           | stdin reader thread  |
//! | `TerminalDisplay` | 16×2 HD44780 panel          | stdout               |
//! | `SimPin`          | status LED GPIO             | `log` at debug       |
//! | `SimTone`         | LEDC tone channel           | `log` at debug       |
//! | `SimSensors`      | DHT / LDR / PIR / reed      | [`SimInputs`] atomics|
//!
//! Each stdin line is either keypad characters (`1234#`) or a sensor
//! command: `t=31.5`, `h=60`, `l=800`, `m=1`, `f=1`, `fault=1`, `quit`.

use core::convert::Infallible;
use std::io::{BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use embedded_hal::digital::{ErrorType, OutputPin};
use log::{debug, info, warn};

use super::hardware::HardwareAdapter;
use crate::app::ports::KeypadPort;
use crate::drivers::buzzer::{Buzzer, ToneGenerator};
use crate::drivers::display::CharacterDisplay;
use crate::drivers::keypad::Key;
use crate::drivers::status_led::StatusLed;
use crate::sensors::sim::{SimInputs, SimSensors};

/// The full simulated board.
pub type SimHardware = HardwareAdapter<SimSensors, ChannelKeypad, TerminalDisplay, SimPin, SimTone>;

/// Assemble the simulated board around shared sensor inputs and a key feed.
pub fn build_hardware(inputs: Arc<SimInputs>, keys: Receiver<Key>) -> SimHardware {
    HardwareAdapter::new(
        SimSensors::new(inputs),
        ChannelKeypad::new(keys),
        TerminalDisplay::default(),
        StatusLed::new(SimPin::new("led")),
        Buzzer::new(SimTone),
    )
}

// ───────────────────────────────────────────────────────────────
// Keypad
// ───────────────────────────────────────────────────────────────

/// Keypad fed through a channel; yields at most one key per scan.
pub struct ChannelKeypad {
    keys: Receiver<Key>,
    disconnected: bool,
}

impl ChannelKeypad {
    pub fn new(keys: Receiver<Key>) -> Self {
        Self {
            keys,
            disconnected: false,
        }
    }
}

impl KeypadPort for ChannelKeypad {
    fn read_key(&mut self) -> Option<Key> {
        match self.keys.try_recv() {
            Ok(key) => Some(key),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                if !self.disconnected {
                    warn!("Keypad feed closed");
                    self.disconnected = true;
                }
                None
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Display
// ───────────────────────────────────────────────────────────────

/// Prints the panel to stdout after the bottom row is written.
#[derive(Default)]
pub struct TerminalDisplay {
    top: String,
}

impl CharacterDisplay for TerminalDisplay {
    type Error = std::io::Error;

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.top.clear();
        Ok(())
    }

    fn write_row(&mut self, row: u8, text: &str) -> Result<(), Self::Error> {
        if row == 0 {
            self.top = text.to_owned();
            return Ok(());
        }
        let mut out = std::io::stdout().lock();
        writeln!(out, "+----------------+")?;
        writeln!(out, "|{:<16}|", self.top)?;
        writeln!(out, "|{:<16}|", text)?;
        writeln!(out, "+----------------+")?;
        out.flush()
    }
}

// ───────────────────────────────────────────────────────────────
// LED pin / tone channel
// ───────────────────────────────────────────────────────────────

pub struct SimPin {
    name: &'static str,
}

impl SimPin {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        debug!("[sim] {} off", self.name);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        debug!("[sim] {} on", self.name);
        Ok(())
    }
}

pub struct SimTone;

impl ToneGenerator for SimTone {
    type Error = Infallible;

    fn start_tone(&mut self, hz: u16) -> Result<(), Infallible> {
        debug!("[sim] buzzer {hz} Hz");
        Ok(())
    }

    fn stop_tone(&mut self) -> Result<(), Infallible> {
        debug!("[sim] buzzer silent");
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// stdin command parsing
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum SimCommand {
    Keys(Vec<Key>),
    Temperature(f32),
    Humidity(f32),
    Light(u16),
    Motion(bool),
    Field(bool),
    ClimateFault(bool),
    Quit,
}

/// Parse one stdin line. `None` for blank or unrecognised input.
pub fn parse_line(line: &str) -> Option<SimCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("q") {
        return Some(SimCommand::Quit);
    }

    if let Some((name, value)) = line.split_once('=') {
        let value = value.trim();
        let flag = || match value {
            "1" | "on" | "true" => Some(true),
            "0" | "off" | "false" => Some(false),
            _ => None,
        };
        return match name.trim() {
            "t" => value.parse().ok().map(SimCommand::Temperature),
            "h" => value.parse().ok().map(SimCommand::Humidity),
            "l" => value.parse().ok().map(SimCommand::Light),
            "m" => flag().map(SimCommand::Motion),
            "f" => flag().map(SimCommand::Field),
            "fault" => flag().map(SimCommand::ClimateFault),
            _ => None,
        };
    }

    let keys: Vec<Key> = line
        .chars()
        .map(|c| Key::from_char(c.to_ascii_uppercase()))
        .collect::<Option<_>>()?;
    Some(SimCommand::Keys(keys))
}

/// Read stdin on a background thread, routing keys into `keys` and sensor
/// commands into `inputs`. Sets `quit` on `quit` or end of input.
pub fn spawn_stdin_reader(
    inputs: Arc<SimInputs>,
    keys: Sender<Key>,
    quit: Arc<AtomicBool>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("sim-stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                match parse_line(&line) {
                    Some(SimCommand::Quit) => break,
                    Some(cmd) => {
                        if apply(&inputs, &keys, cmd).is_err() {
                            break;
                        }
                    }
                    None => warn!("[sim] unrecognised input: {line:?}"),
                }
            }
            quit.store(true, Ordering::Relaxed);
        })
}

/// Apply a non-quit command. Fails once the key receiver is gone.
fn apply(
    inputs: &SimInputs,
    keys: &Sender<Key>,
    cmd: SimCommand,
) -> Result<(), std::sync::mpsc::SendError<Key>> {
    match cmd {
        SimCommand::Keys(list) => {
            for key in list {
                keys.send(key)?;
            }
        }
        SimCommand::Temperature(c) => {
            info!("[sim] temperature {c:.1}C");
            inputs.set_temperature(c);
        }
        SimCommand::Humidity(p) => inputs.set_humidity(p),
        SimCommand::Light(raw) => inputs.set_light(raw),
        SimCommand::Motion(on) => {
            info!("[sim] motion {on}");
            inputs.set_motion(on);
        }
        SimCommand::Field(on) => {
            info!("[sim] magnetic field {on}");
            inputs.set_magnetic(on);
        }
        SimCommand::ClimateFault(on) => {
            info!("[sim] climate sensor fault {on}");
            inputs.set_climate_fault(on);
        }
        SimCommand::Quit => {}
    }
    Ok(())
}
