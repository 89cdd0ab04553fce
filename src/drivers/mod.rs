//! Peripheral drivers, generic over `embedded-hal` 1.0.
//!
//! I²C drivers borrow the bus per call so the RTC and the LCD backpack
//! can share one peripheral.

pub mod ds3231;
pub mod feeder;
pub mod keypad;
pub mod lcd;
pub mod pump;
