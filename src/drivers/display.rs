//! 16×2 character display frame and the LCD collaborator trait.
//!
//! State handlers write a [`DisplayFrame`] into the context; the controller
//! pushes it to the panel only when it changed. Text longer than a row is
//! truncated, never wrapped.

use core::fmt::{self, Write};

use heapless::String;

pub const LCD_COLUMNS: usize = 16;
pub const LCD_ROWS: usize = 2;

pub type Row = String<LCD_COLUMNS>;

/// Full contents of the panel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayFrame {
    rows: [Row; LCD_ROWS],
}

impl DisplayFrame {
    pub fn new(top: &str, bottom: &str) -> Self {
        let mut frame = Self::default();
        frame.set_row(0, top);
        frame.set_row(1, bottom);
        frame
    }

    pub fn blank() -> Self {
        Self::default()
    }

    /// Replace one row. Out-of-range rows are ignored.
    pub fn set_row(&mut self, row: usize, text: &str) {
        let Some(slot) = self.rows.get_mut(row) else {
            return;
        };
        slot.clear();
        for c in text.chars() {
            if slot.push(c).is_err() {
                break;
            }
        }
    }

    /// Format straight into a row, truncating at the panel width.
    pub fn set_row_fmt(&mut self, row: usize, args: fmt::Arguments<'_>) {
        let mut buf: String<{ LCD_COLUMNS * 3 }> = String::new();
        // Overflow only loses text past the panel width.
        let _ = buf.write_fmt(args);
        self.set_row(row, &buf);
    }

    pub fn row(&self, row: usize) -> &str {
        self.rows.get(row).map_or("", Row::as_str)
    }

    pub fn is_blank(&self) -> bool {
        self.rows.iter().all(|r| r.is_empty())
    }
}

/// Text LCD driven by the hardware adapter (HD44780-class panel).
pub trait CharacterDisplay {
    type Error: fmt::Debug;

    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Write `text` starting at column 0 of `row`.
    fn write_row(&mut self, row: u8, text: &str) -> Result<(), Self::Error>;
}
