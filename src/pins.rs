//! GPIO / peripheral pin assignments for the AquaFeed controller board.
//!
//! Single source of truth: `main` references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// I²C bus (DS3231 RTC at 0x68, PCF8574 LCD backpack at 0x27)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 8;
pub const I2C_SCL_GPIO: i32 = 9;
/// Both devices are happy at standard-mode speed.
pub const I2C_BAUD_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// 4×4 keypad matrix
// ---------------------------------------------------------------------------

/// Row outputs, top to bottom.  Driven low one at a time while scanning.
pub const KEYPAD_ROW_GPIOS: [i32; 4] = [4, 5, 6, 7];
/// Column inputs, left to right.  Internal pull-ups; a press reads LOW.
pub const KEYPAD_COL_GPIOS: [i32; 4] = [15, 16, 17, 18];

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

/// Pump relay coil driver.  HIGH = pump on.
pub const PUMP_RELAY_GPIO: i32 = 10;
/// Feeder servo signal (LEDC channel 0).
pub const FEEDER_SERVO_GPIO: i32 = 11;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// Hobby-servo frame rate.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// LEDC timer resolution (bits).  14 bits gives ~1.2 µs steps at 50 Hz.
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;
