//! Schedule monitor — edge-triggers the daily pump and feed starts.
//!
//! The monitor is polled every loop iteration against the wall clock and
//! notifies a [`SchedulerDelegate`] when a configured start minute is
//! reached; the service implements the delegate to start the runs.
//!
//! ```text
//!   now.hh:mm ──┐
//!               ▼
//!   ┌──────────────────────────────┐
//!   │  == start && !latched ?      │──yes──▶ delegate.on_schedule_fired()
//!   │  (feed: && !feed_active)     │           latched = true
//!   └──────────────────────────────┘
//!   latched clears as soon as now.mm != start.mm
//! ```
//!
//! One latch per action guarantees a single fire per matching minute no
//! matter how often the monitor is polled, and re-arms for the next day.
//!
//! The pump has no "already running" guard: a fire while the pump runs
//! restarts its timer.

use log::info;

use crate::app::ports::{ScheduleFiredKind, SchedulerDelegate};
use crate::settings::{Settings, TimeOfDay};

// ═══════════════════════════════════════════════════════════════
//  Latch
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, Default)]
struct Latch {
    set: bool,
}

impl Latch {
    /// Returns `true` exactly once per matching minute, and only when
    /// `allowed`.
    fn poll(&mut self, now: TimeOfDay, start: TimeOfDay, allowed: bool) -> bool {
        if now.minute() != start.minute() {
            self.set = false;
        }
        if now == start && !self.set && allowed {
            self.set = true;
            return true;
        }
        false
    }
}

// ═══════════════════════════════════════════════════════════════
//  Monitor
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct ScheduleMonitor {
    pump: Latch,
    feed: Latch,
}

impl ScheduleMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate both schedules.  Call once per loop iteration with a
    /// single time snapshot.
    pub fn evaluate(
        &mut self,
        now: TimeOfDay,
        settings: &Settings,
        feed_active: bool,
        delegate: &mut dyn SchedulerDelegate,
    ) {
        if self.pump.poll(now, settings.pump_start, true) {
            info!("Scheduler: pump start at {}", now);
            delegate.on_schedule_fired(ScheduleFiredKind::Pump);
        }
        if self.feed.poll(now, settings.feed_start, !feed_active) {
            info!("Scheduler: feed start at {}", now);
            delegate.on_schedule_fired(ScheduleFiredKind::Feed);
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
