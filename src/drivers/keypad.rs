//! 4×4 matrix keypad driver with press-edge detection.
//!
//! ## Hardware
//!
//! Rows are inputs with pull-ups, columns are outputs idling high. A scan
//! drives one column low at a time and reads the rows; a pressed key pulls
//! its row low.
//!
//! ```text
//!          C0  C1  C2  C3
//!   R0  [  1   2   3   A ]
//!   R1  [  4   5   6   B ]
//!   R2  [  7   8   9   C ]
//!   R3  [  *   0   #   D ]
//! ```
//!
//! `scan()` reports a key only on the scan where it first appears, so a
//! held key yields exactly one character. At most one key is reported per
//! scan (first hit in column-major order).

use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::app::ports::KeypadPort;
use crate::error::SensorError;

pub const ROWS: usize = 4;
pub const COLS: usize = 4;

pub const KEYMAP: [[char; COLS]; ROWS] = [
    ['1', '2', '3', 'A'],
    ['4', '5', '6', 'B'],
    ['7', '8', '9', 'C'],
    ['*', '0', '#', 'D'],
];

/// A classified keypad character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// `0`–`9`.
    Digit(u8),
    /// `A`–`D`; data keys with no meaning to password entry.
    Letter(char),
    /// `#`: submit / acknowledge.
    Submit,
    /// `*`: clear.
    Clear,
}

impl Key {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0'..='9' => Some(Self::Digit(c as u8 - b'0')),
            'A'..='D' => Some(Self::Letter(c)),
            '#' => Some(Self::Submit),
            '*' => Some(Self::Clear),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Digit(d) => char::from(b'0' + d),
            Self::Letter(c) => c,
            Self::Submit => '#',
            Self::Clear => '*',
        }
    }
}

pub struct MatrixKeypad<R, C> {
    rows: [R; ROWS],
    cols: [C; COLS],
    /// Key seen on the previous scan, used for edge detection.
    held: Option<Key>,
}

impl<R: InputPin, C: OutputPin> MatrixKeypad<R, C> {
    /// Take ownership of the pins and park every column high.
    pub fn new(rows: [R; ROWS], mut cols: [C; COLS]) -> Result<Self, SensorError> {
        for col in &mut cols {
            col.set_high().map_err(|_| SensorError::GpioReadFailed)?;
        }
        Ok(Self {
            rows,
            cols,
            held: None,
        })
    }

    /// Scan the matrix once. Returns a key only on its press edge.
    pub fn scan(&mut self) -> Result<Option<Key>, SensorError> {
        let pressed = self.read_matrix()?;
        let edge = match (self.held, pressed) {
            (None, Some(k)) => Some(k),
            (Some(prev), Some(k)) if prev != k => Some(k),
            _ => None,
        };
        self.held = pressed;
        Ok(edge)
    }

    fn read_matrix(&mut self) -> Result<Option<Key>, SensorError> {
        for c in 0..COLS {
            self.cols[c]
                .set_low()
                .map_err(|_| SensorError::GpioReadFailed)?;
            let hit = self.first_low_row();
            // Release the column even when the row read failed.
            self.cols[c]
                .set_high()
                .map_err(|_| SensorError::GpioReadFailed)?;
            if let Some(r) = hit? {
                return Ok(Key::from_char(KEYMAP[r][c]));
            }
        }
        Ok(None)
    }

    fn first_low_row(&mut self) -> Result<Option<usize>, SensorError> {
        for (r, row) in self.rows.iter_mut().enumerate() {
            if row.is_low().map_err(|_| SensorError::GpioReadFailed)? {
                return Ok(Some(r));
            }
        }
        Ok(None)
    }
}

impl<R: InputPin, C: OutputPin> KeypadPort for MatrixKeypad<R, C> {
    fn read_key(&mut self) -> Option<Key> {
        match self.scan() {
            Ok(key) => key,
            Err(e) => {
                warn!("Keypad scan failed: {}", e);
                None
            }
        }
    }
}
