//! HD44780 16×2 character LCD behind a PCF8574 I²C backpack.
//!
//! The expander drives the panel in 4-bit mode:
//!
//! ```text
//!   P7 P6 P5 P4 │ P3 │ P2 │ P1 │ P0
//!   D7 D6 D5 D4 │ BL │ EN │ RW │ RS
//! ```
//!
//! Every nibble is clocked by writing it once with EN high and once with
//! EN low.  RW is held low; the busy flag is never read, so commands are
//! followed by a fixed delay instead.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

/// Default 7-bit address of the common PCF8574T backpack.
pub const DEFAULT_ADDRESS: u8 = 0x27;

const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

mod cmd {
    pub const CLEAR: u8 = 0x01;
    pub const ENTRY_LEFT: u8 = 0x06;
    pub const DISPLAY_ON: u8 = 0x0C;
    pub const DISPLAY_ON_BLINK: u8 = 0x0F;
    pub const FUNCTION_4BIT_2LINE: u8 = 0x28;
    pub const SET_DDRAM: u8 = 0x80;
}

/// DDRAM offset of each row.
const ROW_OFFSETS: [u8; 2] = [0x00, 0x40];

pub struct Lcd {
    address: u8,
    backlight: bool,
}

impl Lcd {
    pub const fn new(address: u8) -> Self {
        Self {
            address,
            backlight: true,
        }
    }

    /// Run the 4-bit power-on sequence and leave the panel cleared with
    /// the cursor hidden.
    pub fn init<I: I2c, D: DelayNs>(&mut self, i2c: &mut I, delay: &mut D) -> Result<(), I::Error> {
        delay.delay_ms(50);
        for _ in 0..3 {
            self.write_nibble(i2c, 0x30, 0)?;
            delay.delay_ms(5);
        }
        self.write_nibble(i2c, 0x20, 0)?;
        delay.delay_us(100);

        self.command(i2c, cmd::FUNCTION_4BIT_2LINE)?;
        self.command(i2c, cmd::DISPLAY_ON)?;
        self.clear(i2c, delay)?;
        self.command(i2c, cmd::ENTRY_LEFT)
    }

    pub fn clear<I: I2c, D: DelayNs>(&mut self, i2c: &mut I, delay: &mut D) -> Result<(), I::Error> {
        self.command(i2c, cmd::CLEAR)?;
        delay.delay_ms(2);
        Ok(())
    }

    /// Row is clamped to the last row; the controller wraps columns.
    pub fn set_cursor<I: I2c>(&mut self, i2c: &mut I, col: u8, row: u8) -> Result<(), I::Error> {
        let row = usize::from(row).min(ROW_OFFSETS.len() - 1);
        self.command(i2c, cmd::SET_DDRAM | (col + ROW_OFFSETS[row]))
    }

    /// Blinking block cursor at the write position.
    pub fn set_blink<I: I2c>(&mut self, i2c: &mut I, on: bool) -> Result<(), I::Error> {
        self.command(
            i2c,
            if on {
                cmd::DISPLAY_ON_BLINK
            } else {
                cmd::DISPLAY_ON
            },
        )
    }

    /// Print ASCII text.  Anything outside printable ASCII is shown as `?`.
    pub fn print<I: I2c>(&mut self, i2c: &mut I, text: &str) -> Result<(), I::Error> {
        for ch in text.chars() {
            let b = if ch.is_ascii() && !ch.is_ascii_control() {
                ch as u8
            } else {
                b'?'
            };
            self.send(i2c, b, RS)?;
        }
        Ok(())
    }

    pub fn set_backlight<I: I2c>(&mut self, i2c: &mut I, on: bool) -> Result<(), I::Error> {
        self.backlight = on;
        i2c.write(self.address, &[self.bl()])
    }

    fn command<I: I2c>(&mut self, i2c: &mut I, value: u8) -> Result<(), I::Error> {
        self.send(i2c, value, 0)
    }

    fn send<I: I2c>(&mut self, i2c: &mut I, value: u8, mode: u8) -> Result<(), I::Error> {
        self.write_nibble(i2c, value & 0xF0, mode)?;
        self.write_nibble(i2c, (value << 4) & 0xF0, mode)
    }

    fn write_nibble<I: I2c>(&mut self, i2c: &mut I, high_bits: u8, mode: u8) -> Result<(), I::Error> {
        let b = high_bits | mode | self.bl();
        i2c.write(self.address, &[b | EN, b])
    }

    fn bl(&self) -> u8 {
        if self.backlight { BACKLIGHT } else { 0 }
    }
}
