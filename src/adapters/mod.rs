//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                  |
//! |----------------|--------------------|------------------------------|
//! | `hardware`     | TimePort           | DS3231 RTC (I²C)             |
//! |                | DisplayPort        | HD44780 LCD via PCF8574 (I²C)|
//! |                | KeypadPort         | 4×4 matrix, GPIO             |
//! |                | ActuatorPort       | Pump relay GPIO, servo LEDC  |
//! |                | SettingsPort       | delegates to `nvs`           |
//! | `log_sink`     | EventSink          | Serial log output            |
//! | `nvs`          | SettingsPort       | NVS / in-memory store        |
//! |                | ConfigPort         |                              |
//! | `time`         | (monotonic clock)  | ESP32 high-resolution timer  |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;
