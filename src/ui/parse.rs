//! Tokenizer and per-field validators for the edit buffer.
//!
//! Time entries are `HH<sep>MM` with exactly one separator after at least
//! one digit.  Numeric entries are plain digit strings.  Nothing falls back
//! to zero: every malformed input maps to an [`InputError`].

use core::fmt;

use crate::settings::{MAX_FEED_QUANTITY, TimeOfDay};

use super::editor::SEPARATOR;

/// Why an entry was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    /// A time entry has no separator.
    NoSeparator,
    /// More than one separator, or the separator comes first.
    BadFormat,
    /// A token is empty or contains something other than digits.
    NotANumber,
    /// The number parsed but lies outside the field's range.
    OutOfRange,
}

impl InputError {
    /// Whether the user should be shown the `HH:MM` format hint rather
    /// than a plain "invalid" message.
    pub const fn is_format(self) -> bool {
        matches!(self, Self::NoSeparator | Self::BadFormat)
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSeparator => write!(f, "missing separator"),
            Self::BadFormat => write!(f, "malformed time"),
            Self::NotANumber => write!(f, "not a number"),
            Self::OutOfRange => write!(f, "out of range"),
        }
    }
}

/// Parse an `HH:MM` entry.
pub fn parse_time(input: &[u8]) -> Result<TimeOfDay, InputError> {
    let mut parts = input.split(|&c| c == SEPARATOR);
    let hour = parts.next().unwrap_or_default();
    let Some(minute) = parts.next() else {
        return Err(InputError::NoSeparator);
    };
    if parts.next().is_some() || hour.is_empty() {
        return Err(InputError::BadFormat);
    }

    let hour = parse_number(hour)?;
    let minute = parse_number(minute)?;
    if hour > 23 || minute > 59 {
        return Err(InputError::OutOfRange);
    }
    TimeOfDay::new(hour as u8, minute as u8).ok_or(InputError::OutOfRange)
}

/// Parse a pump duration in seconds (`> 0`, fits the 16-bit store slot).
pub fn parse_duration(input: &[u8]) -> Result<u16, InputError> {
    match parse_number(input)? {
        0 => Err(InputError::OutOfRange),
        secs => u16::try_from(secs).map_err(|_| InputError::OutOfRange),
    }
}

/// Parse a feed quantity (`1..=999`).
pub fn parse_quantity(input: &[u8]) -> Result<u16, InputError> {
    let qty = parse_number(input)?;
    if (1..=u32::from(MAX_FEED_QUANTITY)).contains(&qty) {
        Ok(qty as u16)
    } else {
        Err(InputError::OutOfRange)
    }
}

fn parse_number(token: &[u8]) -> Result<u32, InputError> {
    if token.is_empty() {
        return Err(InputError::NotANumber);
    }
    token.iter().try_fold(0u32, |acc, &c| {
        if !c.is_ascii_digit() {
            return Err(InputError::NotANumber);
        }
        acc.checked_mul(10)
            .and_then(|v| v.checked_add(u32::from(c - b'0')))
            .ok_or(InputError::OutOfRange)
    })
}
