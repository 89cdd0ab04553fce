//! Actuator controllers: pump timer, feed sequencer, dispense action.

pub mod feed_run;
pub mod pump_run;

use embedded_hal::delay::DelayNs;

use crate::app::ports::{ActuatorPort, FeederPosition};

/// Which run an event or command refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Pump,
    Feed,
}

/// Lifecycle of a pump or feed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Paused,
}

/// One dispense: move to the dispense position, hold, return to rest.
///
/// Blocks for `hold_ms`.  Cancellation is only observed afterwards.
pub fn dispense(hw: &mut (impl ActuatorPort + DelayNs), hold_ms: u32) {
    hw.set_feeder(FeederPosition::Dispense);
    hw.delay_ms(hold_ms);
    hw.set_feeder(FeederPosition::Rest);
}
