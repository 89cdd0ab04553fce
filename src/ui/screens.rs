//! Screen text and layout for the 16x2 display.
//!
//! ```text
//!  Main            Menu              Edit               Overlay
//!  ┌────────────────┐┌────────────────┐┌────────────────┐┌────────────────┐
//!  │08:00:12   19/10││1 Pump start  A<││Pump start HH*MM││Cancel runs?    │
//!  │Pump 18s left   ││2 Pump secs   B>││Pump at:08:3_   ││#=Yes  C=No     │
//!  └────────────────┘└────────────────┘└────────────────┘└────────────────┘
//! ```

use core::fmt::{self, Write};

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::app::ports::DisplayPort;
use crate::control::RunState;
use crate::fsm::StateId;
use crate::fsm::context::Context;
use crate::settings::Field;

use super::parse::InputError;
use super::{Line, line};

// ---------------------------------------------------------------------------
// Field text
// ---------------------------------------------------------------------------

/// Prompt printed before the edit buffer.
pub const fn prompt(field: Field) -> &'static str {
    match field {
        Field::PumpStart => "Pump at:",
        Field::PumpDuration => "Pump secs:",
        Field::FeedStart => "Feed at:",
        Field::FeedQuantity => "Feed qty:",
        Field::Clock => "Clock:",
    }
}

/// Top row of an edit screen.
pub const fn title(field: Field) -> &'static str {
    match field {
        Field::PumpStart => "Pump start HH*MM",
        Field::PumpDuration => "Pump run seconds",
        Field::FeedStart => "Feed start HH*MM",
        Field::FeedQuantity => "Feed count 1-999",
        Field::Clock => "Set clock HH*MM",
    }
}

const fn committed_title(field: Field) -> &'static str {
    match field {
        Field::PumpStart => "Pump time set",
        Field::PumpDuration => "Pump secs set",
        Field::FeedStart => "Feed time set",
        Field::FeedQuantity => "Feed qty set",
        Field::Clock => "Clock set",
    }
}

// ---------------------------------------------------------------------------
// Notices
// ---------------------------------------------------------------------------

/// A two-line message shown for the dwell time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub top: Line,
    pub bottom: Line,
}

impl Notice {
    pub fn new(top: &str, bottom: &str) -> Self {
        Self {
            top: line(top),
            bottom: line(bottom),
        }
    }

    /// Confirmation carrying the committed value.
    pub fn committed(field: Field, value: impl fmt::Display) -> Self {
        let mut bottom = Line::new();
        // Overflow only truncates.
        let _ = write!(bottom, "{}", value);
        Self {
            top: line(committed_title(field)),
            bottom,
        }
    }

    pub fn rejected(field: Field, error: InputError) -> Self {
        match field {
            _ if field.is_time() && error.is_format() => Self::new("Format: HH:MM", "Ex: 08*30=08:30"),
            _ if field.is_time() => Self::new("Invalid Time!", ""),
            Field::FeedQuantity => Self::new("Invalid! (1-999)", ""),
            _ => Self::new("Invalid! (>0)", ""),
        }
    }

    pub fn no_active_run() -> Self {
        Self::new("No active run", "")
    }

    pub fn nothing_running() -> Self {
        Self::new("Nothing running", "")
    }

    pub fn paused() -> Self {
        Self::new("Runs paused", "* to resume")
    }

    pub fn resumed() -> Self {
        Self::new("Runs resumed", "")
    }

    pub fn cancelled() -> Self {
        Self::new("Runs cancelled", "Pump+feeder off")
    }

    /// Shown before halting when the RTC cannot be started.
    pub fn clock_fault() -> Self {
        Self::new("CLOCK FAULT", "Check RTC wiring")
    }
}

pub fn render_notice(display: &mut impl DisplayPort, notice: &Notice) {
    render_lines(display, &notice.top, &notice.bottom);
}

// ---------------------------------------------------------------------------
// Screens
// ---------------------------------------------------------------------------

fn menu_lines(state: StateId) -> [&'static str; 2] {
    match state {
        StateId::TopMenu => ["1 Pump start  A<", "2 Pump secs   B>"],
        StateId::FeedMenu => ["1 Feed start  A<", "2 Feed qty    B>"],
        StateId::SettingsMenu => ["1 Set clock   A<", ""],
        StateId::ConfirmCancel => ["Cancel runs?", "#=Yes  C=No"],
        _ => ["", ""],
    }
}

/// Draw the whole screen for `state`.
pub fn render(display: &mut impl DisplayPort, state: StateId, ctx: &Context, now: &NaiveDateTime) {
    if state == StateId::MainDisplay {
        let (top, bottom) = main_lines(ctx, now);
        render_lines(display, &top, &bottom);
    } else if let Some(field) = state.edit_field() {
        display.set_cursor_visible(false);
        display.clear();
        display.print_at(0, 0, title(field));
        ctx.editor.render(display, prompt(field));
    } else {
        let [top, bottom] = menu_lines(state);
        render_lines(display, top, bottom);
    }
}

fn render_lines(display: &mut impl DisplayPort, top: &str, bottom: &str) {
    display.set_cursor_visible(false);
    display.clear();
    display.print_at(0, 0, top);
    display.print_at(0, 1, bottom);
}

/// Clock on the top row, run status (or the schedule) below.
pub fn main_lines(ctx: &Context, now: &NaiveDateTime) -> (Line, Line) {
    let mut top = Line::new();
    let _ = write!(
        top,
        "{:02}:{:02}:{:02}   {:02}/{:02}",
        now.hour(),
        now.minute(),
        now.second(),
        now.day(),
        now.month()
    );

    let mut bottom = Line::new();
    let s = &ctx.settings;
    let pump_secs = ctx
        .pump
        .remaining_ms(ctx.now_ms, s.pump_duration_secs)
        .div_ceil(1000);
    let fed = ctx.feed.dispensed();
    let _ = match (ctx.pump.state(), ctx.feed.state()) {
        (RunState::Idle, RunState::Idle) => write!(bottom, "P{}  F{}", s.pump_start, s.feed_start),
        (RunState::Running, RunState::Idle) => write!(bottom, "Pump {}s left", pump_secs),
        (RunState::Paused, RunState::Idle) => write!(bottom, "Pump paused {}s", pump_secs),
        (RunState::Idle, RunState::Running) => write!(bottom, "Feed {}/{}", fed, s.feed_quantity),
        (RunState::Idle, RunState::Paused) => write!(bottom, "Feed paused {}/{}", fed, s.feed_quantity),
        (pump, feed) => write!(
            bottom,
            "P{}s F{}/{}{}",
            pump_secs,
            fed,
            s.feed_quantity,
            if pump == RunState::Paused || feed == RunState::Paused {
                " ||"
            } else {
                ""
            }
        ),
    };
    (top, bottom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FirmwareConfig;
    use crate::settings::Settings;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 19)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn ctx() -> Context {
        Context::new(FirmwareConfig::default(), Settings::default())
    }

    #[test]
    fn prompts_are_distinct_and_fit_with_buffer() {
        let fields = [
            Field::PumpStart,
            Field::PumpDuration,
            Field::FeedStart,
            Field::FeedQuantity,
            Field::Clock,
        ];
        for (i, a) in fields.iter().enumerate() {
            assert!(prompt(*a).len() + crate::ui::editor::EDIT_CAPACITY <= 16);
            assert!(title(*a).len() <= 16);
            for b in &fields[i + 1..] {
                assert_ne!(prompt(*a), prompt(*b));
            }
        }
    }

    #[test]
    fn idle_main_shows_schedule() {
        let (top, bottom) = main_lines(&ctx(), &at(7, 5, 9));
        assert_eq!(top.as_str(), "07:05:09   19/10");
        assert_eq!(bottom.as_str(), "P08:00  F09:00");
    }

    #[test]
    fn running_pump_shows_remaining_seconds() {
        let mut c = ctx();
        c.pump.start(0);
        c.now_ms = 12_300;
        let (_, bottom) = main_lines(&c, &at(8, 0, 12));
        assert_eq!(bottom.as_str(), "Pump 18s left");
    }

    #[test]
    fn paused_feed_shows_progress() {
        let mut c = ctx();
        c.feed.start();
        c.feed.record_dispense(0, 3);
        c.feed.pause();
        let (_, bottom) = main_lines(&c, &at(9, 0, 1));
        assert_eq!(bottom.as_str(), "Feed paused 1/3");
    }

    #[test]
    fn rejection_messages_per_field() {
        let n = Notice::rejected(Field::PumpStart, InputError::NoSeparator);
        assert_eq!(n.top.as_str(), "Format: HH:MM");
        assert_eq!(n.bottom.as_str(), "Ex: 08*30=08:30");
        let n = Notice::rejected(Field::Clock, InputError::OutOfRange);
        assert_eq!(n.top.as_str(), "Invalid Time!");
        let n = Notice::rejected(Field::PumpDuration, InputError::NotANumber);
        assert_eq!(n.top.as_str(), "Invalid! (>0)");
        let n = Notice::rejected(Field::FeedQuantity, InputError::OutOfRange);
        assert_eq!(n.top.as_str(), "Invalid! (1-999)");
    }

    #[test]
    fn committed_notice_carries_value() {
        let n = Notice::committed(Field::FeedStart, "09:15");
        assert_eq!(n.top.as_str(), "Feed time set");
        assert_eq!(n.bottom.as_str(), "09:15");
    }
}
