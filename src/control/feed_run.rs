//! Feed run: a fixed number of dispenses spaced by an interval.
//!
//! The first dispense happens as soon as the run is advanced after
//! starting; later ones wait `interval` since the previous dispense.
//! Pausing gates the interval check, so the next dispense comes on the
//! first advance after resuming if the interval has already passed.

use super::RunState;

/// What the caller should do after [`FeedRun::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStep {
    /// No active run, or paused.
    Idle,
    /// Interval not yet elapsed.
    Waiting,
    /// Perform one dispense, then call [`FeedRun::record_dispense`].
    Dispense,
    /// Target reached without a further dispense.  The run is now idle.
    Completed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedRun {
    activated: bool,
    paused: bool,
    dispensed: u16,
    last_dispense_ms: Option<u64>,
}

impl FeedRun {
    pub const fn new() -> Self {
        Self {
            activated: false,
            paused: false,
            dispensed: 0,
            last_dispense_ms: None,
        }
    }

    pub fn start(&mut self) {
        self.activated = true;
        self.paused = false;
        self.dispensed = 0;
        self.last_dispense_ms = None;
    }

    pub fn advance(&mut self, now_ms: u64, quantity: u16, interval_ms: u32) -> FeedStep {
        if self.state() != RunState::Running {
            return FeedStep::Idle;
        }
        if self.dispensed >= quantity {
            *self = Self::new();
            return FeedStep::Completed;
        }
        match self.last_dispense_ms {
            Some(last) if now_ms.saturating_sub(last) < u64::from(interval_ms) => FeedStep::Waiting,
            _ => FeedStep::Dispense,
        }
    }

    /// Count a dispense made at `now_ms`.  Returns `true` when this was the
    /// last one; the run is then idle with its count cleared.
    pub fn record_dispense(&mut self, now_ms: u64, quantity: u16) -> bool {
        if !self.activated {
            return false;
        }
        self.dispensed = self.dispensed.saturating_add(1);
        self.last_dispense_ms = Some(now_ms);
        if self.dispensed >= quantity {
            *self = Self::new();
            return true;
        }
        false
    }

    /// Returns `false` if there was nothing to pause.  The caller moves the
    /// feeder to rest.
    pub fn pause(&mut self) -> bool {
        if !self.activated || self.paused {
            return false;
        }
        self.paused = true;
        true
    }

    pub fn resume(&mut self) -> bool {
        if !self.activated || !self.paused {
            return false;
        }
        self.paused = false;
        true
    }

    /// Stop immediately.  Returns whether a run was active.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.activated;
        *self = Self::new();
        was_active
    }

    pub fn dispensed(&self) -> u16 {
        self.dispensed
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
}
