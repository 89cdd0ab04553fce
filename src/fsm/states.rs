//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no
//! dynamic dispatch, no heap.
//!
//! ```text
//!  MAIN ──[#]──▶ TOP ──[B]──▶ FEED ──[B]──▶ SETTINGS
//!   ▲            │ ▲ [A/C]    │ ▲ [A/C]     │
//!   └───[A/C]────┘ └──────────┘ └───────────┘
//!                │1 │2        │1 │2         │1
//!                ▼  ▼         ▼  ▼          ▼
//!        EDIT_PUMP_TIME   EDIT_FEED_TIME    EDIT_CLOCK
//!        EDIT_PUMP_DURATION  EDIT_FEED_QUANTITY
//!
//!  edit ──[# valid]──▶ MAIN      edit ──[C]──▶ MAIN
//!  edit ──[# invalid]──▶ same edit (buffer cleared)
//!
//!  any ──[D]──▶ CONFIRM_CANCEL ──[#]──▶ MAIN (runs cancelled)
//!                             ──[C]──▶ interrupted state
//! ```

use super::context::Context;
use super::{StateDescriptor, StateId};
use crate::app::commands::AppCommand;
use crate::settings::Field;
use crate::ui::keys::Key;
use crate::ui::parse::{self, InputError};
use crate::ui::screens::Notice;
use log::{info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — MainDisplay
        StateDescriptor {
            id: StateId::MainDisplay,
            name: "MainDisplay",
            on_enter: Some(screen_enter),
            on_exit: None,
            on_key: main_key,
        },
        // Index 1 — TopMenu
        StateDescriptor {
            id: StateId::TopMenu,
            name: "TopMenu",
            on_enter: Some(screen_enter),
            on_exit: None,
            on_key: top_menu_key,
        },
        // Index 2 — FeedMenu
        StateDescriptor {
            id: StateId::FeedMenu,
            name: "FeedMenu",
            on_enter: Some(screen_enter),
            on_exit: None,
            on_key: feed_menu_key,
        },
        // Index 3 — SettingsMenu
        StateDescriptor {
            id: StateId::SettingsMenu,
            name: "SettingsMenu",
            on_enter: Some(screen_enter),
            on_exit: None,
            on_key: settings_menu_key,
        },
        // Index 4 — EditPumpTime
        StateDescriptor {
            id: StateId::EditPumpTime,
            name: "EditPumpTime",
            on_enter: Some(edit_enter),
            on_exit: Some(edit_exit),
            on_key: edit_pump_time_key,
        },
        // Index 5 — EditPumpDuration
        StateDescriptor {
            id: StateId::EditPumpDuration,
            name: "EditPumpDuration",
            on_enter: Some(edit_enter),
            on_exit: Some(edit_exit),
            on_key: edit_pump_duration_key,
        },
        // Index 6 — EditFeedTime
        StateDescriptor {
            id: StateId::EditFeedTime,
            name: "EditFeedTime",
            on_enter: Some(edit_enter),
            on_exit: Some(edit_exit),
            on_key: edit_feed_time_key,
        },
        // Index 7 — EditFeedQuantity
        StateDescriptor {
            id: StateId::EditFeedQuantity,
            name: "EditFeedQuantity",
            on_enter: Some(edit_enter),
            on_exit: Some(edit_exit),
            on_key: edit_feed_quantity_key,
        },
        // Index 8 — EditClock
        StateDescriptor {
            id: StateId::EditClock,
            name: "EditClock",
            on_enter: Some(edit_enter),
            on_exit: Some(edit_exit),
            on_key: edit_clock_key,
        },
        // Index 9 — ConfirmCancel
        StateDescriptor {
            id: StateId::ConfirmCancel,
            name: "ConfirmCancel",
            on_enter: Some(screen_enter),
            on_exit: None,
            on_key: confirm_cancel_key,
        },
    ]
}

fn screen_enter(ctx: &mut Context) {
    ctx.redraw = true;
}

// ═══════════════════════════════════════════════════════════════════════════
//  MAIN display
// ═══════════════════════════════════════════════════════════════════════════

fn main_key(ctx: &mut Context, key: Key) -> Option<StateId> {
    match key {
        Key::Enter => Some(StateId::TopMenu),
        Key::Star => {
            ctx.push(AppCommand::TogglePause);
            None
        }
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Menus
// ═══════════════════════════════════════════════════════════════════════════

fn top_menu_key(_ctx: &mut Context, key: Key) -> Option<StateId> {
    match key {
        Key::Digit(1) => Some(StateId::EditPumpTime),
        Key::Digit(2) => Some(StateId::EditPumpDuration),
        Key::Down => Some(StateId::FeedMenu),
        Key::Up | Key::Escape => Some(StateId::MainDisplay),
        _ => None,
    }
}

fn feed_menu_key(_ctx: &mut Context, key: Key) -> Option<StateId> {
    match key {
        Key::Digit(1) => Some(StateId::EditFeedTime),
        Key::Digit(2) => Some(StateId::EditFeedQuantity),
        Key::Down => Some(StateId::SettingsMenu),
        Key::Up | Key::Escape => Some(StateId::TopMenu),
        _ => None,
    }
}

fn settings_menu_key(_ctx: &mut Context, key: Key) -> Option<StateId> {
    match key {
        Key::Digit(1) => Some(StateId::EditClock),
        Key::Up | Key::Escape => Some(StateId::FeedMenu),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Edit screens — one key handler per field, shared body
// ═══════════════════════════════════════════════════════════════════════════

fn edit_enter(ctx: &mut Context) {
    ctx.editor.reset();
    ctx.redraw = true;
}

fn edit_exit(ctx: &mut Context) {
    ctx.editor.reset();
}

fn edit_pump_time_key(ctx: &mut Context, key: Key) -> Option<StateId> {
    edit_key(ctx, key, Field::PumpStart)
}

fn edit_pump_duration_key(ctx: &mut Context, key: Key) -> Option<StateId> {
    edit_key(ctx, key, Field::PumpDuration)
}

fn edit_feed_time_key(ctx: &mut Context, key: Key) -> Option<StateId> {
    edit_key(ctx, key, Field::FeedStart)
}

fn edit_feed_quantity_key(ctx: &mut Context, key: Key) -> Option<StateId> {
    edit_key(ctx, key, Field::FeedQuantity)
}

fn edit_clock_key(ctx: &mut Context, key: Key) -> Option<StateId> {
    edit_key(ctx, key, Field::Clock)
}

fn edit_key(ctx: &mut Context, key: Key, field: Field) -> Option<StateId> {
    match key {
        Key::Digit(d) => ctx.editor.insert_digit(d),
        Key::Star => ctx.editor.insert_separator(),
        Key::Up => ctx.editor.move_cursor_left(),
        Key::Down => ctx.editor.move_cursor_right(),
        Key::Escape => return Some(StateId::MainDisplay),
        Key::Enter => return commit(ctx, field),
        Key::Menu => {}
    }
    ctx.redraw = true;
    None
}

/// Validate the buffer for `field`.  On success update the settings (or
/// request a clock change), confirm, and go home.  On failure explain,
/// clear the buffer, and stay.
fn commit(ctx: &mut Context, field: Field) -> Option<StateId> {
    match apply_entry(ctx, field) {
        Ok(notice) => {
            info!("{:?} committed: {}", field, ctx.editor.as_str());
            ctx.notify(notice);
            Some(StateId::MainDisplay)
        }
        Err(error) => {
            warn!("{:?} rejected {:?}: {}", field, ctx.editor.as_str(), error);
            ctx.push(AppCommand::Reject { field, error });
            ctx.notify(Notice::rejected(field, error));
            ctx.editor.reset();
            ctx.redraw = true;
            None
        }
    }
}

fn apply_entry(ctx: &mut Context, field: Field) -> Result<Notice, InputError> {
    let input = ctx.editor.as_bytes();
    let s = &mut ctx.settings;
    let notice = match field {
        Field::PumpStart => {
            s.pump_start = parse::parse_time(input)?;
            Notice::committed(field, s.pump_start)
        }
        Field::FeedStart => {
            s.feed_start = parse::parse_time(input)?;
            Notice::committed(field, s.feed_start)
        }
        Field::PumpDuration => {
            s.pump_duration_secs = parse::parse_duration(input)?;
            Notice::committed(field, format_args!("{} s", s.pump_duration_secs))
        }
        Field::FeedQuantity => {
            s.feed_quantity = parse::parse_quantity(input)?;
            Notice::committed(field, format_args!("x{}", s.feed_quantity))
        }
        Field::Clock => {
            let at = parse::parse_time(input)?;
            ctx.push(AppCommand::SetClock(at));
            return Ok(Notice::committed(field, at));
        }
    };
    ctx.push(AppCommand::Persist(field));
    Ok(notice)
}

// ═══════════════════════════════════════════════════════════════════════════
//  CONFIRM_CANCEL overlay
// ═══════════════════════════════════════════════════════════════════════════

fn confirm_cancel_key(ctx: &mut Context, key: Key) -> Option<StateId> {
    match key {
        Key::Enter => {
            ctx.interrupted = None;
            ctx.push(AppCommand::CancelRuns);
            Some(StateId::MainDisplay)
        }
        Key::Escape => Some(ctx.interrupted.take().unwrap_or(StateId::MainDisplay)),
        _ => None,
    }
}
