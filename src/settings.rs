//! Persisted schedule settings and their byte layout.
//!
//! The settings live in a small byte-addressed store (EEPROM-style) so
//! they survive power cycles:
//!
//! ```text
//!  addr  0     1     2     3     4     5     6     7     8
//!       ┌─────┬─────┬─────┬───────────┬─────┬─────┬───────────┐
//!       │ 5A  │ P.h │ P.m │ P.dur hi/lo│ F.h │ F.m │ F.qty hi/lo│
//!       └─────┴─────┴─────┴───────────┴─────┴─────┴───────────┘
//! ```
//!
//! A sentinel byte at address 0 marks the store as initialised.  Without
//! it, the defaults are written on first boot.

use core::fmt;

use log::{info, warn};

use crate::app::ports::SettingsPort;

pub const SENTINEL_ADDR: u16 = 0;
pub const SENTINEL: u8 = 0x5A;
pub const PUMP_HOUR_ADDR: u16 = 1;
pub const PUMP_MINUTE_ADDR: u16 = 2;
pub const PUMP_DURATION_ADDR: u16 = 3;
pub const FEED_HOUR_ADDR: u16 = 5;
pub const FEED_MINUTE_ADDR: u16 = 6;
pub const FEED_QUANTITY_ADDR: u16 = 7;

/// Number of bytes the layout occupies (rounded up for the NVS image).
pub const STORE_LEN: usize = 16;

/// Largest accepted feed quantity.
pub const MAX_FEED_QUANTITY: u16 = 999;

// ---------------------------------------------------------------------------
// TimeOfDay
// ---------------------------------------------------------------------------

/// An hour/minute pair, always within 00:00–23:59.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Build a time of day, or `None` if either component is out of range.
    pub const fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    pub const fn hour(self) -> u8 {
        self.hour
    }

    pub const fn minute(self) -> u8 {
        self.minute
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl<T: chrono::Timelike> From<&T> for TimeOfDay {
    fn from(t: &T) -> Self {
        Self {
            hour: t.hour() as u8,
            minute: t.minute() as u8,
        }
    }
}

// ---------------------------------------------------------------------------
// Editable fields
// ---------------------------------------------------------------------------

/// The five values the front panel can edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    PumpStart,
    PumpDuration,
    FeedStart,
    FeedQuantity,
    /// The wall clock itself.  Adjusts the time source; never persisted.
    Clock,
}

impl Field {
    /// Whether the field is entered as `HH:MM`.
    pub const fn is_time(self) -> bool {
        matches!(self, Self::PumpStart | Self::FeedStart | Self::Clock)
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// The four persisted schedule parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub pump_start: TimeOfDay,
    /// Pump run length in seconds (always > 0).
    pub pump_duration_secs: u16,
    pub feed_start: TimeOfDay,
    /// Dispense count per feed run (1–999).
    pub feed_quantity: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pump_start: TimeOfDay { hour: 8, minute: 0 },
            pump_duration_secs: 30,
            feed_start: TimeOfDay { hour: 9, minute: 0 },
            feed_quantity: 3,
        }
    }
}

/// Load settings from the store, bootstrapping defaults on first boot.
///
/// Any field that reads back out of range is replaced by its default
/// and rewritten, so the returned value always satisfies the invariants.
pub fn load(store: &mut impl SettingsPort) -> Settings {
    let defaults = Settings::default();

    if store.read_byte(SENTINEL_ADDR).ok() != Some(SENTINEL) {
        info!("Settings: no sentinel, writing defaults");
        save_all(store, &defaults);
        return defaults;
    }

    let mut repaired = false;

    let pump_start = read_time(store, PUMP_HOUR_ADDR, PUMP_MINUTE_ADDR).unwrap_or_else(|| {
        warn!("Settings: pump start corrupted, using default");
        repaired = true;
        defaults.pump_start
    });
    let pump_duration_secs = match store.read_u16(PUMP_DURATION_ADDR) {
        Ok(secs) if secs > 0 => secs,
        _ => {
            warn!("Settings: pump duration corrupted, using default");
            repaired = true;
            defaults.pump_duration_secs
        }
    };
    let feed_start = read_time(store, FEED_HOUR_ADDR, FEED_MINUTE_ADDR).unwrap_or_else(|| {
        warn!("Settings: feed start corrupted, using default");
        repaired = true;
        defaults.feed_start
    });
    let feed_quantity = match store.read_u16(FEED_QUANTITY_ADDR) {
        Ok(q) if (1..=MAX_FEED_QUANTITY).contains(&q) => q,
        _ => {
            warn!("Settings: feed quantity corrupted, using default");
            repaired = true;
            defaults.feed_quantity
        }
    };

    let settings = Settings {
        pump_start,
        pump_duration_secs,
        feed_start,
        feed_quantity,
    };
    if repaired {
        save_all(store, &settings);
    }
    info!(
        "Settings: pump {} for {}s, feed {} x{}",
        settings.pump_start, settings.pump_duration_secs, settings.feed_start, settings.feed_quantity
    );
    settings
}

/// Persist a single field.  `Field::Clock` is not stored and is ignored.
pub fn save_field(store: &mut impl SettingsPort, settings: &Settings, field: Field) {
    let result = match field {
        Field::PumpStart => write_time(store, PUMP_HOUR_ADDR, PUMP_MINUTE_ADDR, settings.pump_start),
        Field::PumpDuration => store.write_u16(PUMP_DURATION_ADDR, settings.pump_duration_secs),
        Field::FeedStart => write_time(store, FEED_HOUR_ADDR, FEED_MINUTE_ADDR, settings.feed_start),
        Field::FeedQuantity => store.write_u16(FEED_QUANTITY_ADDR, settings.feed_quantity),
        Field::Clock => Ok(()),
    };
    if let Err(e) = result {
        warn!("Settings: failed to persist {:?}: {}", field, e);
    }
}

/// Persist every field followed by the sentinel.
pub fn save_all(store: &mut impl SettingsPort, settings: &Settings) {
    for field in [
        Field::PumpStart,
        Field::PumpDuration,
        Field::FeedStart,
        Field::FeedQuantity,
    ] {
        save_field(store, settings, field);
    }
    if let Err(e) = store.write_byte(SENTINEL_ADDR, SENTINEL) {
        warn!("Settings: failed to write sentinel: {}", e);
    }
}

fn read_time(store: &mut impl SettingsPort, h_addr: u16, m_addr: u16) -> Option<TimeOfDay> {
    let h = store.read_byte(h_addr).ok()?;
    let m = store.read_byte(m_addr).ok()?;
    TimeOfDay::new(h, m)
}

fn write_time(
    store: &mut impl SettingsPort,
    h_addr: u16,
    m_addr: u16,
    t: TimeOfDay,
) -> Result<(), crate::app::ports::StorageError> {
    store.write_byte(h_addr, t.hour())?;
    store.write_byte(m_addr, t.minute())
}
