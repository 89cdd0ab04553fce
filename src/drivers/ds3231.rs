//! DS3231 real-time clock over I²C.
//!
//! Time is kept in BCD registers 0x00–0x06.  The oscillator-stop flag
//! (status bit 7) is set whenever the chip lost both supplies; it is the
//! "power lost" signal and is cleared on every [`Ds3231::set_datetime`].
//!
//! The bus is borrowed per call so the RTC and the LCD can share one
//! I²C peripheral without a bus manager.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use embedded_hal::i2c::I2c;

/// Fixed 7-bit bus address.
pub const ADDRESS: u8 = 0x68;

mod reg {
    pub const SECONDS: u8 = 0x00;
    pub const STATUS: u8 = 0x0F;
}

const STATUS_OSF: u8 = 0x80;
const HOUR_12H: u8 = 0x40;
const HOUR_PM: u8 = 0x20;
const MONTH_CENTURY: u8 = 0x80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ds3231Error<E> {
    I2c(E),
    /// Registers hold an impossible date, or the date is outside 2000–2199.
    InvalidTime,
}

impl<E> From<E> for Ds3231Error<E> {
    fn from(e: E) -> Self {
        Self::I2c(e)
    }
}

#[derive(Debug, Default)]
pub struct Ds3231;

impl Ds3231 {
    pub const fn new() -> Self {
        Self
    }

    /// Whether the oscillator stopped since the flag was last cleared.
    pub fn lost_power<I: I2c>(&self, i2c: &mut I) -> Result<bool, Ds3231Error<I::Error>> {
        Ok(self.read_status(i2c)? & STATUS_OSF != 0)
    }

    pub fn datetime<I: I2c>(&self, i2c: &mut I) -> Result<NaiveDateTime, Ds3231Error<I::Error>> {
        let mut r = [0u8; 7];
        i2c.write_read(ADDRESS, &[reg::SECONDS], &mut r)?;
        decode(&r).ok_or(Ds3231Error::InvalidTime)
    }

    /// Write the time in 24-hour mode and clear the oscillator-stop flag.
    pub fn set_datetime<I: I2c>(
        &self,
        i2c: &mut I,
        at: &NaiveDateTime,
    ) -> Result<(), Ds3231Error<I::Error>> {
        let regs = encode(at).ok_or(Ds3231Error::InvalidTime)?;
        let mut frame = [0u8; 8];
        frame[0] = reg::SECONDS;
        frame[1..].copy_from_slice(&regs);
        i2c.write(ADDRESS, &frame)?;

        let status = self.read_status(i2c)?;
        i2c.write(ADDRESS, &[reg::STATUS, status & !STATUS_OSF])?;
        Ok(())
    }

    fn read_status<I: I2c>(&self, i2c: &mut I) -> Result<u8, Ds3231Error<I::Error>> {
        let mut status = [0u8; 1];
        i2c.write_read(ADDRESS, &[reg::STATUS], &mut status)?;
        Ok(status[0])
    }
}

const fn from_bcd(v: u8) -> u8 {
    (v >> 4) * 10 + (v & 0x0F)
}

const fn to_bcd(v: u8) -> u8 {
    ((v / 10) << 4) | (v % 10)
}

fn decode(r: &[u8; 7]) -> Option<NaiveDateTime> {
    let second = from_bcd(r[0] & 0x7F);
    let minute = from_bcd(r[1] & 0x7F);
    let hour = if r[2] & HOUR_12H != 0 {
        let h12 = from_bcd(r[2] & 0x1F) % 12;
        if r[2] & HOUR_PM != 0 { h12 + 12 } else { h12 }
    } else {
        from_bcd(r[2] & 0x3F)
    };
    let day = from_bcd(r[4] & 0x3F);
    let month = from_bcd(r[5] & 0x1F);
    let century = if r[5] & MONTH_CENTURY != 0 { 100 } else { 0 };
    let year = 2000 + century + i32::from(from_bcd(r[6]));

    NaiveDate::from_ymd_opt(year, u32::from(month), u32::from(day))?.and_hms_opt(
        u32::from(hour),
        u32::from(minute),
        u32::from(second),
    )
}

fn encode(at: &NaiveDateTime) -> Option<[u8; 7]> {
    let offset = at.year().checked_sub(2000)?;
    if !(0..200).contains(&offset) {
        return None;
    }
    let century = if offset >= 100 { MONTH_CENTURY } else { 0 };
    Some([
        to_bcd(at.second() as u8),
        to_bcd(at.minute() as u8),
        to_bcd(at.hour() as u8),
        at.weekday().number_from_monday() as u8,
        to_bcd(at.day() as u8),
        to_bcd(at.month() as u8) | century,
        to_bcd((offset % 100) as u8),
    ])
}
