//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them, such as logging to serial.

use chrono::NaiveDateTime;

use crate::control::RunKind;
use crate::fsm::StateId;
use crate::settings::Field;
use crate::ui::parse::InputError;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The application service has started (carries initial screen).
    Started(StateId),

    /// The RTC had lost power and was set to the bootstrap time.
    ClockBootstrapped(NaiveDateTime),

    /// The navigator moved between screens.
    ScreenChanged { from: StateId, to: StateId },

    /// A pump run began (`restarted` if one was already active).
    PumpStarted { duration_secs: u16, restarted: bool },

    /// The pump run reached its duration.
    PumpStopped,

    FeedStarted { quantity: u16 },

    /// One portion dispensed.
    Dispensed { count: u16, of: u16 },

    FeedCompleted,

    RunPaused(RunKind),
    RunResumed(RunKind),
    RunCancelled(RunKind),

    /// A new value was accepted (persisted, or applied to the clock).
    SettingCommitted(Field),

    /// An entry failed validation.
    InputRejected { field: Field, error: InputError },
}
