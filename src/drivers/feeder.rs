//! Feeder servo driver.
//!
//! A hobby servo on a 50 Hz PWM channel turns the food hopper.  The
//! pulse width maps linearly to angle:
//!
//! ```text
//!   500 µs ──────── 1500 µs ──────── 2500 µs
//!     0°               90°             180°
//! ```
//!
//! Only two positions are used: rest (hopper closed) and dispense.

use embedded_hal::pwm::SetDutyCycle;

use crate::app::ports::FeederPosition;

pub const SERVO_PERIOD_US: u32 = 20_000;
pub const MIN_PULSE_US: u32 = 500;
pub const MAX_PULSE_US: u32 = 2_500;

pub const REST_DEGREES: u8 = 0;
pub const DISPENSE_DEGREES: u8 = 90;

pub struct FeederServo<P> {
    pwm: P,
    position: Option<FeederPosition>,
}

impl<P: SetDutyCycle> FeederServo<P> {
    /// Take the channel and move to rest.
    pub fn new(pwm: P) -> Result<Self, P::Error> {
        let mut servo = Self {
            pwm,
            position: None,
        };
        servo.move_to(FeederPosition::Rest)?;
        Ok(servo)
    }

    pub fn move_to(&mut self, position: FeederPosition) -> Result<(), P::Error> {
        let degrees = match position {
            FeederPosition::Rest => REST_DEGREES,
            FeederPosition::Dispense => DISPENSE_DEGREES,
        };
        self.set_angle(degrees)?;
        self.position = Some(position);
        Ok(())
    }

    /// Drive to an arbitrary angle, clamped to 0–180°.
    pub fn set_angle(&mut self, degrees: u8) -> Result<(), P::Error> {
        let duty = duty_for_angle(degrees, self.pwm.max_duty_cycle());
        self.pwm.set_duty_cycle(duty)
    }

    pub fn position(&self) -> Option<FeederPosition> {
        self.position
    }
}

fn pulse_us(degrees: u8) -> u32 {
    let degrees = u32::from(degrees.min(180));
    MIN_PULSE_US + (MAX_PULSE_US - MIN_PULSE_US) * degrees / 180
}

fn duty_for_angle(degrees: u8, max_duty: u16) -> u16 {
    (pulse_us(degrees) * u32::from(max_duty) / SERVO_PERIOD_US) as u16
}
