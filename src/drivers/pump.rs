//! Water pump relay driver.
//!
//! A single GPIO switches the pump relay coil.  Relay modules come in
//! both polarities, so the level that closes the contact is configured.
//!
//! The driver tracks the commanded state and only touches the pin when
//! it changes.

use embedded_hal::digital::OutputPin;
use log::info;

/// Pin level that energises the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveLevel {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpState {
    Stopped,
    Running,
}

pub struct PumpRelay<P> {
    pin: P,
    active: ActiveLevel,
    state: PumpState,
}

impl<P: OutputPin> PumpRelay<P> {
    /// Take the pin and force the relay open.
    pub fn new(pin: P, active: ActiveLevel) -> Result<Self, P::Error> {
        let mut relay = Self {
            pin,
            active,
            state: PumpState::Running,
        };
        relay.stop()?;
        Ok(relay)
    }

    pub fn start(&mut self) -> Result<(), P::Error> {
        self.set(true)
    }

    pub fn stop(&mut self) -> Result<(), P::Error> {
        self.set(false)
    }

    pub fn set(&mut self, on: bool) -> Result<(), P::Error> {
        let target = if on {
            PumpState::Running
        } else {
            PumpState::Stopped
        };
        if target == self.state {
            return Ok(());
        }

        match (on, self.active) {
            (true, ActiveLevel::High) | (false, ActiveLevel::Low) => self.pin.set_high()?,
            (true, ActiveLevel::Low) | (false, ActiveLevel::High) => self.pin.set_low()?,
        }
        self.state = target;
        info!("Pump relay {}", if on { "ON" } else { "OFF" });
        Ok(())
    }

    pub fn state(&self) -> PumpState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PumpState::Running
    }
}
