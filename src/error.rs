//! Unified error types for the secmon controller.
//!
//! A single `Error` enum that every subsystem converts into. All variants
//! are `Copy` so they can be passed through the control loop without
//! allocation.
//!
//! A rejected password is *not* an error: it is a counted event that drives
//! a state transition (see `fsm::states`).

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read or returned implausible data.
    Sensor(SensorError),
    /// State machine table registration failed.
    Fsm(FsmError),
    /// An output device (display, LED, buzzer) rejected a write.
    Output(OutputError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Fsm(e) => write!(f, "fsm: {e}"),
            Self::Output(e) => write!(f, "output: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The bus transaction failed or timed out (e.g. DHT checksum).
    ReadFailed,
    /// GPIO read returned an error.
    GpioReadFailed,
    /// Reading is outside the physically plausible range (NaN included).
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed => write!(f, "read failed"),
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor faults
// ---------------------------------------------------------------------------

/// Per-sensor fault bits, accumulated in `SensorSnapshot::faults`.
///
/// A failed read sets the bit and clears the cached value; the next good
/// read clears the bit again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SensorFault {
    Climate = 0b0000_0001,
    Light = 0b0000_0010,
    Motion = 0b0000_0100,
    Magnetic = 0b0000_1000,
}

impl SensorFault {
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for SensorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Climate => write!(f, "temperature/humidity"),
            Self::Light => write!(f, "light"),
            Self::Motion => write!(f, "motion"),
            Self::Magnetic => write!(f, "magnetic field"),
        }
    }
}

// ---------------------------------------------------------------------------
// State machine errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsmError {
    /// The fixed-capacity transition table has no free slot.
    TableFull,
    /// Registration attempted after the machine was started.
    Sealed,
}

impl fmt::Display for FsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TableFull => write!(f, "transition table full"),
            Self::Sealed => write!(f, "machine already started"),
        }
    }
}

impl From<FsmError> for Error {
    fn from(e: FsmError) -> Self {
        Self::Fsm(e)
    }
}

// ---------------------------------------------------------------------------
// Output errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputError {
    DisplayWriteFailed,
    GpioWriteFailed,
    ToneFailed,
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DisplayWriteFailed => write!(f, "display write failed"),
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
            Self::ToneFailed => write!(f, "tone generation failed"),
        }
    }
}

impl From<OutputError> for Error {
    fn from(e: OutputError) -> Self {
        Self::Output(e)
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
