//! Front panel: keypad symbols, the Input Editor, entry validation, and
//! everything drawn on the 16x2 LCD.

pub mod editor;
pub mod keys;
pub mod parse;
pub mod screens;

pub const LCD_COLS: u8 = 16;
pub const LCD_ROWS: u8 = 2;

/// Row carrying the prompt and edit buffer on edit screens.
pub const EDIT_ROW: u8 = 1;

/// One LCD row of text.
pub type Line = heapless::String<{ LCD_COLS as usize }>;

/// Build a row from `text`, truncating at the display width.
pub fn line(text: &str) -> Line {
    let mut out = Line::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
