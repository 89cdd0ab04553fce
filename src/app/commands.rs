//! Commands from the menu state machine to the application service.
//!
//! State handlers are pure: they never touch hardware.  Anything with a
//! side effect is queued here and applied, in order, by
//! [`AppService`](super::service::AppService) right after the key is handled.

use crate::settings::{Field, TimeOfDay};
use crate::ui::parse::InputError;
use crate::ui::screens::Notice;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Write one field of the in-memory settings to the store.
    Persist(Field),

    /// Set the wall clock to this time of day, keeping today's date.
    SetClock(TimeOfDay),

    /// An entry was rejected by its validator.
    Reject { field: Field, error: InputError },

    /// Show a two-line message for the dwell time.
    Notify(Notice),

    /// Pause every running run, or resume them all if none is running.
    TogglePause,

    /// Stop the pump and feed runs immediately.
    CancelRuns,
}
