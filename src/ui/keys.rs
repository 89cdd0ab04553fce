//! Keypad symbol set.
//!
//! The front panel is a 4x4 matrix:
//!
//! ```text
//!   ┌───┬───┬───┬───┐
//!   │ 1 │ 2 │ 3 │ A │   A = Up
//!   ├───┼───┼───┼───┤
//!   │ 4 │ 5 │ 6 │ B │   B = Down
//!   ├───┼───┼───┼───┤
//!   │ 7 │ 8 │ 9 │ C │   C = Escape
//!   ├───┼───┼───┼───┤
//!   │ * │ 0 │ # │ D │   * = separator / pause   # = Enter   D = Menu
//!   └───┴───┴───┴───┘
//! ```

/// Characters of the matrix, row-major.
pub const KEYMAP: [[char; 4]; 4] = [
    ['1', '2', '3', 'A'],
    ['4', '5', '6', 'B'],
    ['7', '8', '9', 'C'],
    ['*', '0', '#', 'D'],
];

/// A single key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// `0`–`9`.
    Digit(u8),
    /// `*`: time separator in edit screens, pause/resume on the main display.
    Star,
    /// `#`: commit / open menu / confirm "yes".
    Enter,
    /// `A`
    Up,
    /// `B`
    Down,
    /// `C`: back out one level, or "no" in the cancel overlay.
    Escape,
    /// `D`: ask to cancel the active runs.
    Menu,
}

impl Key {
    /// Map a keypad character to its symbol.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0'..='9' => Some(Self::Digit(c as u8 - b'0')),
            '*' => Some(Self::Star),
            '#' => Some(Self::Enter),
            'A' => Some(Self::Up),
            'B' => Some(Self::Down),
            'C' => Some(Self::Escape),
            'D' => Some(Self::Menu),
            _ => None,
        }
    }

    /// The printed legend on the key.
    pub fn legend(self) -> char {
        match self {
            Self::Digit(d) => char::from(b'0' + d.min(9)),
            Self::Star => '*',
            Self::Enter => '#',
            Self::Up => 'A',
            Self::Down => 'B',
            Self::Escape => 'C',
            Self::Menu => 'D',
        }
    }
}
