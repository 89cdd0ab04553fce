//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (RTC, byte store, LCD, keypad, relay, servo, event
//! sinks) implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly and every screen flow can be exercised on the host.

use chrono::NaiveDateTime;
use embedded_hal::delay::DelayNs;

use crate::config::FirmwareConfig;
use crate::ui::keys::Key;

// ───────────────────────────────────────────────────────────────
// Time port (driven adapter: RTC + monotonic timer → domain)
// ───────────────────────────────────────────────────────────────

/// Wall-clock and monotonic time.
pub trait TimePort {
    /// Probe the real-time clock.  Failure is fatal at startup.
    fn begin(&mut self) -> Result<(), ClockError>;

    /// Current wall-clock time.  Adapters return the last good reading
    /// if the clock cannot be read.
    fn now(&mut self) -> NaiveDateTime;

    /// `true` if the clock lost power and its time is meaningless.
    /// Checked once at startup.
    fn lost_power(&mut self) -> bool;

    /// Set the wall clock.
    fn adjust(&mut self, at: NaiveDateTime);

    /// Milliseconds since boot (monotonic).  Run timers are measured
    /// against this, never against the wall clock.
    fn uptime_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Settings port (driven adapter: domain ↔ byte-addressed store)
// ───────────────────────────────────────────────────────────────

/// Durable byte-addressed storage for the schedule settings.
///
/// 16-bit values occupy two consecutive slots, high byte first.
pub trait SettingsPort {
    fn read_byte(&mut self, addr: u16) -> Result<u8, StorageError>;

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), StorageError>;

    fn read_u16(&mut self, addr: u16) -> Result<u16, StorageError> {
        let hi = self.read_byte(addr)?;
        let lo = self.read_byte(addr + 1)?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    fn write_u16(&mut self, addr: u16, value: u16) -> Result<(), StorageError> {
        let [hi, lo] = value.to_be_bytes();
        self.write_byte(addr, hi)?;
        self.write_byte(addr + 1, lo)
    }
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → character LCD)
// ───────────────────────────────────────────────────────────────

/// Fixed 2-row × 16-column character display.
pub trait DisplayPort {
    fn clear(&mut self);

    /// Move the write position to `(col, row)`.
    fn set_cursor(&mut self, col: u8, row: u8);

    /// Print at the current write position.
    fn print(&mut self, text: &str);

    /// Show or hide the blinking edit cursor at the write position.
    fn set_cursor_visible(&mut self, visible: bool);

    /// Blank a whole row and leave the write position at its start.
    fn clear_row(&mut self, row: u8) {
        self.set_cursor(0, row);
        self.print(BLANK_ROW);
        self.set_cursor(0, row);
    }

    fn print_at(&mut self, col: u8, row: u8, text: &str) {
        self.set_cursor(col, row);
        self.print(text);
    }
}

const BLANK_ROW: &str = "                ";

// ───────────────────────────────────────────────────────────────
// Keypad port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Discrete key events.  One event per physical press; no repeat.
pub trait KeypadPort {
    fn poll_key(&mut self) -> Option<Key>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Named positions of the feeder actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeederPosition {
    Rest,
    Dispense,
}

/// Write-side port: the domain calls this to command actuators.
pub trait ActuatorPort {
    /// Switch the water pump on or off.
    fn set_pump(&mut self, on: bool);

    /// Move the feeder to a named position.
    fn set_feeder(&mut self, position: FeederPosition);

    /// Pump off, feeder at rest.
    fn all_off(&mut self) {
        self.set_pump(false);
        self.set_feeder(FeederPosition::Rest);
    }
}

// ───────────────────────────────────────────────────────────────
// Board — everything the control loop needs in one borrow
// ───────────────────────────────────────────────────────────────

/// A complete board: all driven ports plus a blocking delay for the
/// message dwell and dispense hold.
pub trait Board: TimePort + SettingsPort + DisplayPort + KeypadPort + ActuatorPort + DelayNs {}

impl<T> Board for T where T: TimePort + SettingsPort + DisplayPort + KeypadPort + ActuatorPort + DelayNs {}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the firmware tunables.
///
/// Implementations MUST validate before persisting and reject invalid
/// ranges with [`ConfigError::ValidationFailed`] rather than clamping.
pub trait ConfigPort {
    /// Load configuration.  Returns [`FirmwareConfig::default()`] if
    /// nothing is stored yet.
    fn load(&self) -> Result<FirmwareConfig, ConfigError>;

    fn save(&self, config: &FirmwareConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples the schedule monitor from the runs)
// ───────────────────────────────────────────────────────────────

/// Callback the [`ScheduleMonitor`](crate::scheduler::ScheduleMonitor)
/// invokes when a configured start time is reached.
pub trait SchedulerDelegate {
    fn on_schedule_fired(&mut self, kind: ScheduleFiredKind);
}

/// Which scheduled action fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleFiredKind {
    Pump,
    Feed,
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from the real-time clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    /// The RTC did not answer on the bus.
    NotFound,
    /// A bus transfer failed mid-read.
    Bus,
    /// Registers decoded to an impossible date or time.
    InvalidTime,
}

/// Errors from [`SettingsPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Address lies outside the store.
    OutOfBounds,
    /// Generic I/O error from the backend.
    IoError,
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialisation.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ClockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "RTC not found"),
            Self::Bus => write!(f, "RTC bus error"),
            Self::InvalidTime => write!(f, "RTC time invalid"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfBounds => write!(f, "address out of bounds"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
