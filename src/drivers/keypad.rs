//! 4×4 matrix keypad scanner.
//!
//! Rows are driven low one at a time; columns are inputs with pull-ups,
//! so a pressed key reads low on its column while its row is selected.
//! A key is reported once, after its reading has been stable for the
//! configured number of polls, and not again until every key has been
//! released.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::ui::keys::{Key, KEYMAP};

#[derive(Debug, Clone, Copy)]
pub struct KeypadConfig {
    debounce_polls: u8,
}

impl Default for KeypadConfig {
    fn default() -> Self {
        Self { debounce_polls: 2 }
    }
}

impl KeypadConfig {
    pub const fn with_debounce_polls(mut self, debounce_polls: u8) -> Self {
        self.debounce_polls = debounce_polls;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeypadError<RowErr, ColErr> {
    Row(RowErr),
    Col(ColErr),
}

type KeypadResult<RowErr, ColErr, T> = Result<T, KeypadError<RowErr, ColErr>>;

/// Matrix position `(row, col)`.
type Position = (usize, usize);

pub struct MatrixKeypad<R, C> {
    rows: [R; 4],
    cols: [C; 4],
    config: KeypadConfig,
    raw: Option<Position>,
    stable: Option<Position>,
    stable_count: u8,
}

impl<R, C> MatrixKeypad<R, C>
where
    R: OutputPin,
    C: InputPin,
{
    /// Take the pins and park every row high (deselected).
    pub fn new(
        mut rows: [R; 4],
        cols: [C; 4],
        config: KeypadConfig,
    ) -> KeypadResult<R::Error, C::Error, Self> {
        for row in rows.iter_mut() {
            row.set_high().map_err(KeypadError::Row)?;
        }
        Ok(Self {
            rows,
            cols,
            config,
            raw: None,
            stable: None,
            stable_count: 0,
        })
    }

    /// Scan once.  Returns a key on the debounced press edge only.
    pub fn poll(&mut self) -> KeypadResult<R::Error, C::Error, Option<Key>> {
        let reading = self.scan()?;

        if reading == self.raw {
            self.stable_count = self.stable_count.saturating_add(1);
        } else {
            self.raw = reading;
            self.stable_count = 0;
        }

        let threshold = self.config.debounce_polls.max(1);
        if self.stable_count.saturating_add(1) < threshold || self.stable == self.raw {
            return Ok(None);
        }

        let pressed_now = self.stable.is_none();
        self.stable = self.raw;
        match self.stable {
            // A roll-over from one key to another without a release is
            // not a new press.
            Some((r, c)) if pressed_now => Ok(Key::from_char(KEYMAP[r][c])),
            _ => Ok(None),
        }
    }

    /// First pressed position in row-major order.
    fn scan(&mut self) -> KeypadResult<R::Error, C::Error, Option<Position>> {
        let mut found = None;
        for r in 0..self.rows.len() {
            self.rows[r].set_low().map_err(KeypadError::Row)?;
            for c in 0..self.cols.len() {
                if found.is_none() && self.cols[c].is_low().map_err(KeypadError::Col)? {
                    found = Some((r, c));
                }
            }
            self.rows[r].set_high().map_err(KeypadError::Row)?;
        }
        Ok(found)
    }
}
