//! Input Editor — bounded text buffer with cursor-based in-place editing.
//!
//! Shared by every configuration screen.  Characters at the cursor are
//! overwritten; at the end of the buffer they are appended.
//!
//! ```text
//!   row 1:  Pump at:08:3_
//!           └prompt┘└buf┘^ cursor = prompt.len() + cursor
//! ```

use heapless::Vec;

use crate::app::ports::DisplayPort;

use super::{EDIT_ROW, LCD_COLS};

/// Longest accepted entry (`HH:MM`, or a five-digit duration plus one).
pub const EDIT_CAPACITY: usize = 6;

/// Character produced by the separator key.
pub const SEPARATOR: u8 = b':';

#[derive(Debug, Default, Clone)]
pub struct InputEditor {
    buf: Vec<u8, EDIT_CAPACITY>,
    cursor: usize,
}

impl InputEditor {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            cursor: 0,
        }
    }

    /// Overwrite at the cursor, or append when the cursor is at the end.
    ///
    /// Appending to a full buffer is ignored.
    pub fn insert_or_replace(&mut self, c: u8) {
        if let Some(slot) = self.buf.get_mut(self.cursor) {
            *slot = c;
            self.cursor += 1;
        } else if self.buf.push(c).is_ok() {
            self.cursor = self.buf.len();
        }
    }

    pub fn insert_digit(&mut self, digit: u8) {
        self.insert_or_replace(b'0' + digit.min(9));
    }

    pub fn insert_separator(&mut self) {
        self.insert_or_replace(SEPARATOR);
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.buf.len() {
            self.cursor += 1;
        }
    }

    pub fn reset(&mut self) {
        self.buf.clear();
        self.cursor = 0;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Buffer contents.  Only ASCII ever enters the buffer.
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf).unwrap_or("")
    }

    /// Draw `prompt` and the buffer on the edit row and park the blinking
    /// cursor at the edit position.
    pub fn render(&self, display: &mut impl DisplayPort, prompt: &str) {
        display.clear_row(EDIT_ROW);
        display.print(prompt);
        display.print(self.as_str());
        let col = (prompt.len() + self.cursor).min(LCD_COLS as usize - 1);
        display.set_cursor(col as u8, EDIT_ROW);
        display.set_cursor_visible(true);
    }
}
