//! Pump run timer with pause-aware elapsed-time accounting.
//!
//! ```text
//!  Idle ──start──▶ Running ──pause──▶ Paused
//!                   │   ▲               │
//!                   │   └────resume─────┘
//!                   └──[elapsed ≥ duration] / cancel──▶ Idle
//! ```
//!
//! Elapsed time is `accumulated + (now - started_at)` while running and
//! frozen at `accumulated` while paused, so time spent paused never counts
//! toward the configured duration.

use super::RunState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpRun {
    activated: bool,
    paused: bool,
    /// Uptime at the last start or resume.
    started_at_ms: u64,
    /// Running time banked before the last pause.
    accumulated_ms: u64,
}

impl PumpRun {
    pub const fn new() -> Self {
        Self {
            activated: false,
            paused: false,
            started_at_ms: 0,
            accumulated_ms: 0,
        }
    }

    /// Start (or restart) the run.  A restart discards any banked time.
    pub fn start(&mut self, now_ms: u64) {
        self.activated = true;
        self.paused = false;
        self.started_at_ms = now_ms;
        self.accumulated_ms = 0;
    }

    /// Freeze the timer.  Returns `false` if there was nothing to pause.
    pub fn pause(&mut self, now_ms: u64) -> bool {
        if !self.activated || self.paused {
            return false;
        }
        self.accumulated_ms += now_ms.saturating_sub(self.started_at_ms);
        self.paused = true;
        true
    }

    /// Continue timing from `now_ms`.  Returns `false` if not paused.
    pub fn resume(&mut self, now_ms: u64) -> bool {
        if !self.activated || !self.paused {
            return false;
        }
        self.started_at_ms = now_ms;
        self.paused = false;
        true
    }

    /// Stop immediately.  Returns whether a run was active.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.activated;
        *self = Self::new();
        was_active
    }

    /// Time counted toward the duration so far.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        match self.state() {
            RunState::Idle => 0,
            RunState::Paused => self.accumulated_ms,
            RunState::Running => self.accumulated_ms + now_ms.saturating_sub(self.started_at_ms),
        }
    }

    pub fn remaining_ms(&self, now_ms: u64, duration_secs: u16) -> u64 {
        (u64::from(duration_secs) * 1000).saturating_sub(self.elapsed_ms(now_ms))
    }

    /// Finish the run once the duration is reached.  Returns `true` on the
    /// call that completes it.
    pub fn poll(&mut self, now_ms: u64, duration_secs: u16) -> bool {
        if self.state() != RunState::Running {
            return false;
        }
        if self.elapsed_ms(now_ms) >= u64::from(duration_secs) * 1000 {
            *self = Self::new();
            return true;
        }
        false
    }

    pub fn state(&self) -> RunState {
        match (self.activated, self.paused) {
            (false, _) => RunState::Idle,
            (true, false) => RunState::Running,
            (true, true) => RunState::Paused,
        }
    }

    pub fn is_active(&self) -> bool {
        self.activated
    }

    /// Whether the pump output should be energised.
    pub fn output_on(&self) -> bool {
        self.state() == RunState::Running
    }
}
