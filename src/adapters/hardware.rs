//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the shared I²C bus (RTC + LCD backpack), the keypad matrix, the
//! pump relay, the feeder servo, the settings store and a blocking delay,
//! exposing them through the ports that make up a [`Board`].  This is the
//! only module in the system that touches actual hardware.
//!
//! Peripheral faults after startup are logged and absorbed: a failed RTC
//! read yields the last good time, a failed LCD write is dropped.
//!
//! [`Board`]: crate::app::ports::Board

use chrono::NaiveDateTime;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::i2c::I2c;
use embedded_hal::pwm::SetDutyCycle;
use log::{info, warn};

use crate::adapters::time::MonotonicClock;
use crate::app::ports::{
    ActuatorPort, ClockError, DisplayPort, FeederPosition, KeypadPort, SettingsPort, StorageError,
    TimePort,
};
use crate::drivers::ds3231::{Ds3231, Ds3231Error};
use crate::drivers::feeder::FeederServo;
use crate::drivers::keypad::MatrixKeypad;
use crate::drivers::lcd::Lcd;
use crate::drivers::pump::PumpRelay;
use crate::ui::keys::Key;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<I2C, R, C, P, S, D, St> {
    i2c: I2C,
    lcd: Lcd,
    rtc: Ds3231,
    keypad: MatrixKeypad<R, C>,
    pump: PumpRelay<P>,
    feeder: FeederServo<S>,
    delay: D,
    store: St,
    clock: MonotonicClock,
    last_time: NaiveDateTime,
    rtc_faulted: bool,
}

impl<I2C, R, C, P, S, D, St> HardwareAdapter<I2C, R, C, P, S, D, St>
where
    I2C: I2c,
    R: OutputPin,
    C: InputPin,
    P: OutputPin,
    S: SetDutyCycle,
    D: DelayNs,
    St: SettingsPort,
{
    /// Take ownership of the peripherals and initialise the LCD.
    pub fn new(
        i2c: I2C,
        lcd: Lcd,
        keypad: MatrixKeypad<R, C>,
        pump: PumpRelay<P>,
        feeder: FeederServo<S>,
        delay: D,
        store: St,
    ) -> Self {
        let mut hw = Self {
            i2c,
            lcd,
            rtc: Ds3231::new(),
            keypad,
            pump,
            feeder,
            delay,
            store,
            clock: MonotonicClock::new(),
            last_time: NaiveDateTime::default(),
            rtc_faulted: false,
        };
        match hw.lcd.init(&mut hw.i2c, &mut hw.delay) {
            Ok(()) => info!("HardwareAdapter: LCD ready"),
            Err(e) => warn!("HardwareAdapter: LCD init failed: {:?}", e),
        }
        hw
    }

    fn lcd_result(&self, result: Result<(), I2C::Error>) {
        if let Err(e) = result {
            warn!("LCD write failed: {:?}", e);
        }
    }
}

// ── TimePort implementation ───────────────────────────────────

impl<I2C, R, C, P, S, D, St> TimePort for HardwareAdapter<I2C, R, C, P, S, D, St>
where
    I2C: I2c,
    R: OutputPin,
    C: InputPin,
    P: OutputPin,
    S: SetDutyCycle,
    D: DelayNs,
    St: SettingsPort,
{
    fn begin(&mut self) -> Result<(), ClockError> {
        match self.rtc.datetime(&mut self.i2c) {
            Ok(at) => {
                self.last_time = at;
                info!("RTC found, time {}", at);
                Ok(())
            }
            // Garbage registers after a power loss still prove the chip answers.
            Err(Ds3231Error::InvalidTime) => {
                warn!("RTC found, registers invalid");
                Ok(())
            }
            Err(Ds3231Error::I2c(e)) => {
                warn!("RTC probe failed: {:?}", e);
                Err(ClockError::NotFound)
            }
        }
    }

    fn now(&mut self) -> NaiveDateTime {
        match self.rtc.datetime(&mut self.i2c) {
            Ok(at) => {
                if self.rtc_faulted {
                    info!("RTC readable again");
                    self.rtc_faulted = false;
                }
                self.last_time = at;
            }
            Err(e) => {
                if !self.rtc_faulted {
                    warn!("RTC read failed ({:?}), holding {}", e, self.last_time);
                    self.rtc_faulted = true;
                }
            }
        }
        self.last_time
    }

    fn lost_power(&mut self) -> bool {
        match self.rtc.lost_power(&mut self.i2c) {
            Ok(lost) => lost,
            Err(e) => {
                warn!("RTC status read failed: {:?}", e);
                false
            }
        }
    }

    fn adjust(&mut self, at: NaiveDateTime) {
        match self.rtc.set_datetime(&mut self.i2c, &at) {
            Ok(()) => info!("RTC set to {}", at),
            Err(e) => warn!("RTC set failed: {:?}", e),
        }
        self.last_time = at;
    }

    fn uptime_ms(&self) -> u64 {
        self.clock.uptime_ms()
    }
}

// ── SettingsPort implementation ───────────────────────────────

impl<I2C, R, C, P, S, D, St> SettingsPort for HardwareAdapter<I2C, R, C, P, S, D, St>
where
    St: SettingsPort,
{
    fn read_byte(&mut self, addr: u16) -> Result<u8, StorageError> {
        self.store.read_byte(addr)
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), StorageError> {
        self.store.write_byte(addr, value)
    }
}

// ── DisplayPort implementation ────────────────────────────────

impl<I2C, R, C, P, S, D, St> DisplayPort for HardwareAdapter<I2C, R, C, P, S, D, St>
where
    I2C: I2c,
    R: OutputPin,
    C: InputPin,
    P: OutputPin,
    S: SetDutyCycle,
    D: DelayNs,
    St: SettingsPort,
{
    fn clear(&mut self) {
        let r = self.lcd.clear(&mut self.i2c, &mut self.delay);
        self.lcd_result(r);
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        let r = self.lcd.set_cursor(&mut self.i2c, col, row);
        self.lcd_result(r);
    }

    fn print(&mut self, text: &str) {
        let r = self.lcd.print(&mut self.i2c, text);
        self.lcd_result(r);
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        let r = self.lcd.set_blink(&mut self.i2c, visible);
        self.lcd_result(r);
    }
}

// ── KeypadPort implementation ─────────────────────────────────

impl<I2C, R, C, P, S, D, St> KeypadPort for HardwareAdapter<I2C, R, C, P, S, D, St>
where
    R: OutputPin,
    C: InputPin,
{
    fn poll_key(&mut self) -> Option<Key> {
        match self.keypad.poll() {
            Ok(key) => key,
            Err(e) => {
                warn!("Keypad scan failed: {:?}", e);
                None
            }
        }
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<I2C, R, C, P, S, D, St> ActuatorPort for HardwareAdapter<I2C, R, C, P, S, D, St>
where
    P: OutputPin,
    S: SetDutyCycle,
{
    fn set_pump(&mut self, on: bool) {
        if let Err(e) = self.pump.set(on) {
            warn!("Pump relay write failed: {:?}", e);
        }
    }

    fn set_feeder(&mut self, position: FeederPosition) {
        if let Err(e) = self.feeder.move_to(position) {
            warn!("Feeder servo write failed: {:?}", e);
        }
    }
}

// ── Blocking delay ────────────────────────────────────────────

impl<I2C, R, C, P, S, D, St> DelayNs for HardwareAdapter<I2C, R, C, P, S, D, St>
where
    D: DelayNs,
{
    fn delay_ns(&mut self, ns: u32) {
        self.delay.delay_ns(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
