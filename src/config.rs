//! Firmware tunables
//!
//! Timing parameters for the control loop, message dwell and feeder
//! sequencing.  Values can be overridden through NVS (see
//! [`NvsAdapter`](crate::adapters::nvs::NvsAdapter)); the schedule itself
//! lives in [`settings`](crate::settings), not here.

use serde::{Deserialize, Serialize};

/// Shortest allowed gap between two dispenses.
pub const MIN_DISPENSE_INTERVAL_MS: u32 = 2_000;

/// Core firmware configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareConfig {
    // --- Timing ---
    /// Main loop period (milliseconds)
    pub loop_interval_ms: u32,
    /// How long confirmation / error messages stay on screen (milliseconds)
    pub message_dwell_ms: u32,
    /// Main display redraw period while idle on the clock screen (milliseconds)
    pub display_refresh_ms: u32,

    // --- Feeder ---
    /// Gap between dispenses during a feed run (milliseconds)
    pub dispense_interval_ms: u32,
    /// How long the feeder holds the dispense position (milliseconds)
    pub dispense_hold_ms: u32,

    // --- Clock ---
    /// Hours added to the build timestamp when the RTC lost power
    pub utc_offset_hours: i8,
}

impl Default for FirmwareConfig {
    fn default() -> Self {
        Self {
            // Timing
            loop_interval_ms: 50,      // 20 Hz key polling
            message_dwell_ms: 2_000,
            display_refresh_ms: 1_000, // clock ticks once a second

            // Feeder
            dispense_interval_ms: MIN_DISPENSE_INTERVAL_MS,
            dispense_hold_ms: 500,

            // Clock
            utc_offset_hours: 1, // WAT
        }
    }
}

/// Range-check a config before it is accepted.
///
/// Returns the name of the first offending field.
pub fn validate(config: &FirmwareConfig) -> Result<(), &'static str> {
    if config.loop_interval_ms == 0 || config.loop_interval_ms > 1_000 {
        return Err("loop_interval_ms must be 1-1000");
    }
    if config.message_dwell_ms > 10_000 {
        return Err("message_dwell_ms must be <= 10000");
    }
    if config.display_refresh_ms < config.loop_interval_ms {
        return Err("display_refresh_ms must be >= loop_interval_ms");
    }
    if config.dispense_interval_ms < MIN_DISPENSE_INTERVAL_MS {
        return Err("dispense_interval_ms must be >= 2000");
    }
    if config.dispense_hold_ms == 0 || config.dispense_hold_ms >= config.dispense_interval_ms {
        return Err("dispense_hold_ms must be > 0 and < dispense_interval_ms");
    }
    if !(-12..=14).contains(&config.utc_offset_hours) {
        return Err("utc_offset_hours must be -12..=14");
    }
    Ok(())
}
