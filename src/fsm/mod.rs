//! Function-pointer finite state machine engine for the menu navigator.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  StateTable                                                   │
//! │  ┌──────────────────┬───────────┬──────────┬───────────────┐  │
//! │  │ StateId          │ on_enter  │ on_exit  │ on_key        │  │
//! │  ├──────────────────┼───────────┼──────────┼───────────────┤  │
//! │  │ MainDisplay      │ fn(ctx)   │    –     │ fn(ctx, key)  │  │
//! │  │ TopMenu …        │ fn(ctx)   │    –     │ fn(ctx, key)  │  │
//! │  │ EditPumpTime …   │ fn(ctx)   │ fn(ctx)  │ fn(ctx, key)  │  │
//! │  │ ConfirmCancel    │ fn(ctx)   │    –     │ fn(ctx, key)  │  │
//! │  └──────────────────┴───────────┴──────────┴───────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each key press is routed to `on_key` of the **current** state.  If it
//! returns `Some(next_id)`, the engine runs `on_exit` for the current
//! state, then `on_enter` for the next.  The Menu key is handled here,
//! ahead of the table: from every state except the overlay itself it
//! opens [`StateId::ConfirmCancel`] and remembers where it came from.

pub mod context;
pub mod states;

use context::Context;
use log::{debug, info};

use crate::settings::Field;
use crate::ui::keys::Key;
use crate::ui::screens::Notice;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Every screen the navigator can be on.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    MainDisplay = 0,
    TopMenu = 1,
    FeedMenu = 2,
    SettingsMenu = 3,
    EditPumpTime = 4,
    EditPumpDuration = 5,
    EditFeedTime = 6,
    EditFeedQuantity = 7,
    EditClock = 8,
    ConfirmCancel = 9,
}

impl StateId {
    /// Total number of states; sizes the table array.
    pub const COUNT: usize = 10;

    /// Convert an index back to `StateId`.  Panics on out-of-range in
    /// debug builds; returns `MainDisplay` in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::MainDisplay,
            1 => Self::TopMenu,
            2 => Self::FeedMenu,
            3 => Self::SettingsMenu,
            4 => Self::EditPumpTime,
            5 => Self::EditPumpDuration,
            6 => Self::EditFeedTime,
            7 => Self::EditFeedQuantity,
            8 => Self::EditClock,
            9 => Self::ConfirmCancel,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::MainDisplay
            }
        }
    }

    /// The field an edit screen changes.
    pub const fn edit_field(self) -> Option<Field> {
        match self {
            Self::EditPumpTime => Some(Field::PumpStart),
            Self::EditPumpDuration => Some(Field::PumpDuration),
            Self::EditFeedTime => Some(Field::FeedStart),
            Self::EditFeedQuantity => Some(Field::FeedQuantity),
            Self::EditClock => Some(Field::Clock),
            _ => None,
        }
    }

    pub const fn is_edit(self) -> bool {
        self.edit_field().is_some()
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut Context);

/// Signature for the key handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type KeyHandlerFn = fn(&mut Context, Key) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single screen.
/// Stored in a fixed-size array without heap or `dyn`.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_key: KeyHandlerFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The menu navigator.
///
/// Owns the state table; the mutable [`Context`] is threaded through every
/// handler call by the caller.
pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Keys handled since startup.
    key_count: u64,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
            key_count: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first key.
    pub fn start(&mut self, ctx: &mut Context) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Route one key press.
    pub fn handle_key(&mut self, ctx: &mut Context, key: Key) {
        self.key_count += 1;
        let current = self.current_state();
        debug!("FSM key {:?} in {}", key, self.table[self.current].name);

        if key == Key::Menu && current != StateId::ConfirmCancel {
            if current == StateId::MainDisplay && !ctx.any_run_active() {
                ctx.notify(Notice::no_active_run());
                ctx.redraw = true;
                return;
            }
            ctx.interrupted = Some(current);
            self.transition(StateId::ConfirmCancel, ctx);
            return;
        }

        if let Some(next) = (self.table[self.current].on_key)(ctx, key) {
            self.transition(next, ctx);
        }
    }

    /// Force an immediate transition, bypassing the key handlers.
    pub fn force_transition(&mut self, next: StateId, ctx: &mut Context) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    /// Display name of the current state.
    pub fn current_name(&self) -> &'static str {
        self.table[self.current].name
    }

    pub fn key_count(&self) -> u64 {
        self.key_count
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut Context) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
