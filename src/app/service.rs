//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the menu FSM, the schedule monitor, and the shared
//! context.  All I/O flows through the [`Board`] ports injected at call
//! sites, making the entire service testable with a mock board.
//!
//! ```text
//!  KeypadPort ──▶ ┌──────────────────────────────┐ ──▶ DisplayPort
//!  TimePort   ──▶ │          AppService          │ ──▶ ActuatorPort
//!  SettingsPort ◀▶│  FSM · ScheduleMonitor · Runs│ ──▶ EventSink
//!                 └──────────────────────────────┘
//! ```
//!
//! One [`tick`](AppService::tick) is one loop iteration, always in this
//! order: key → navigator → queued commands → time snapshot → schedule
//! monitor → run advancement → pump output → display.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};
use log::{error, info, warn};

use crate::config::FirmwareConfig;
use crate::control::feed_run::FeedStep;
use crate::control::{self, RunKind, RunState};
use crate::error::Result;
use crate::fsm::context::Context;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::scheduler::ScheduleMonitor;
use crate::settings::{self, Field, Settings, TimeOfDay};
use crate::ui::screens::{self, Notice};

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{Board, EventSink, FeederPosition, ScheduleFiredKind, SchedulerDelegate};

// ───────────────────────────────────────────────────────────────
// Schedule delegate
// ───────────────────────────────────────────────────────────────

/// Collects what the monitor fired during one evaluation.
#[derive(Debug, Default)]
struct FiredSchedules {
    pump: bool,
    feed: bool,
}

impl SchedulerDelegate for FiredSchedules {
    fn on_schedule_fired(&mut self, kind: ScheduleFiredKind) {
        match kind {
            ScheduleFiredKind::Pump => self.pump = true,
            ScheduleFiredKind::Feed => self.feed = true,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    fsm: Fsm,
    ctx: Context,
    monitor: ScheduleMonitor,
    /// Last level written to the pump output.
    pump_output: bool,
    /// Uptime of the last full redraw.
    last_render_ms: u64,
    tick_count: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** touch hardware; call [`start`](Self::start) next.
    pub fn new(config: FirmwareConfig) -> Self {
        Self {
            fsm: Fsm::new(build_state_table(), StateId::MainDisplay),
            ctx: Context::new(config, Settings::default()),
            monitor: ScheduleMonitor::new(),
            pump_output: false,
            last_render_ms: 0,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Bring up the clock, load settings and draw the main display.
    ///
    /// A clock that cannot be started is fatal: the error is returned and
    /// the caller must halt instead of running the schedule on unknown time.
    pub fn start(&mut self, hw: &mut impl Board, sink: &mut impl EventSink) -> Result<()> {
        hw.all_off();
        self.pump_output = false;

        if let Err(e) = hw.begin() {
            error!("Clock start failed: {}", e);
            return Err(e.into());
        }

        if hw.lost_power() {
            let at = bootstrap_time(self.ctx.config.utc_offset_hours);
            warn!("RTC lost power, setting clock to {}", at);
            hw.adjust(at);
            sink.emit(&AppEvent::ClockBootstrapped(at));
        }

        self.ctx.settings = settings::load(hw);
        self.ctx.now_ms = hw.uptime_ms();
        self.fsm.start(&mut self.ctx);

        let now = hw.now();
        self.render(hw, &now);

        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("AppService started at {} in {:?}", now, self.fsm.current_state());
        Ok(())
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Run one loop iteration.
    pub fn tick(&mut self, hw: &mut impl Board, sink: &mut impl EventSink) {
        self.tick_count += 1;
        self.ctx.now_ms = hw.uptime_ms();

        // 1. At most one key → navigator
        if let Some(key) = hw.poll_key() {
            let from = self.fsm.current_state();
            self.fsm.handle_key(&mut self.ctx, key);
            let to = self.fsm.current_state();
            if from != to {
                sink.emit(&AppEvent::ScreenChanged { from, to });
            }
        }

        // 2. Side effects the handlers queued
        self.apply_commands(hw, sink);

        // 3. One time snapshot for schedule and runs
        let now = hw.now();
        self.ctx.now_ms = hw.uptime_ms();

        // 4. Schedule monitor
        let mut fired = FiredSchedules::default();
        self.monitor.evaluate(
            TimeOfDay::from(&now),
            &self.ctx.settings,
            self.ctx.feed.is_active(),
            &mut fired,
        );
        if fired.pump {
            self.start_pump(sink);
        }
        if fired.feed {
            self.start_feed(sink);
        }

        // 5. Advance runs
        self.advance_pump(sink);
        self.advance_feed(hw, sink);

        // 6. Pump output
        self.sync_pump_output(hw);

        // 7. Display
        let refresh_due = self.fsm.current_state() == StateId::MainDisplay
            && self.ctx.now_ms.saturating_sub(self.last_render_ms)
                >= u64::from(self.ctx.config.display_refresh_ms);
        if self.ctx.redraw || refresh_due {
            self.render(hw, &now);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current screen.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Settings as loaded and edited.
    pub fn settings(&self) -> &Settings {
        &self.ctx.settings
    }

    pub fn pump_state(&self) -> RunState {
        self.ctx.pump.state()
    }

    pub fn feed_state(&self) -> RunState {
        self.ctx.feed.state()
    }

    /// Portions dispensed in the current feed run.
    pub fn feed_dispensed(&self) -> u16 {
        self.ctx.feed.dispensed()
    }

    /// Whether the pump output is currently energised.
    pub fn pump_output(&self) -> bool {
        self.pump_output
    }

    /// Loop iterations executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &FirmwareConfig {
        &self.ctx.config
    }

    // ── Commands ──────────────────────────────────────────────

    fn apply_commands(&mut self, hw: &mut impl Board, sink: &mut impl EventSink) {
        for cmd in self.ctx.drain() {
            match cmd {
                AppCommand::Persist(field) => {
                    settings::save_field(hw, &self.ctx.settings, field);
                    sink.emit(&AppEvent::SettingCommitted(field));
                }
                AppCommand::SetClock(at) => self.set_clock(hw, at, sink),
                AppCommand::Reject { field, error } => {
                    sink.emit(&AppEvent::InputRejected { field, error });
                }
                AppCommand::Notify(notice) => self.show_notice(hw, &notice),
                AppCommand::TogglePause => self.toggle_pause(hw, sink),
                AppCommand::CancelRuns => self.cancel_runs(hw, sink),
            }
        }
    }

    /// Show a message and hold it for the dwell time.  Blocks.
    fn show_notice(&mut self, hw: &mut impl Board, notice: &Notice) {
        screens::render_notice(hw, notice);
        hw.delay_ms(self.ctx.config.message_dwell_ms);
        self.ctx.redraw = true;
    }

    /// Keep today's date, replace the time of day, zero the seconds.
    fn set_clock(&mut self, hw: &mut impl Board, at: TimeOfDay, sink: &mut impl EventSink) {
        let today = hw.now().date();
        match today.and_hms_opt(u32::from(at.hour()), u32::from(at.minute()), 0) {
            Some(new_time) => {
                hw.adjust(new_time);
                info!("Clock set to {}", new_time);
                sink.emit(&AppEvent::SettingCommitted(Field::Clock));
            }
            None => warn!("Clock: cannot build {} on {}", at, today),
        }
    }

    /// Pause everything that is running; if nothing is running, resume
    /// everything that is paused.
    fn toggle_pause(&mut self, hw: &mut impl Board, sink: &mut impl EventSink) {
        if !self.ctx.any_run_active() {
            self.show_notice(hw, &Notice::nothing_running());
            return;
        }
        let now = hw.uptime_ms();
        let any_running = self.ctx.pump.state() == RunState::Running
            || self.ctx.feed.state() == RunState::Running;

        let notice = if any_running {
            if self.ctx.pump.pause(now) {
                info!("Pump paused at {} ms elapsed", self.ctx.pump.elapsed_ms(now));
                sink.emit(&AppEvent::RunPaused(RunKind::Pump));
            }
            if self.ctx.feed.pause() {
                hw.set_feeder(FeederPosition::Rest);
                info!("Feed paused after {} portions", self.ctx.feed.dispensed());
                sink.emit(&AppEvent::RunPaused(RunKind::Feed));
            }
            Notice::paused()
        } else {
            if self.ctx.pump.resume(now) {
                info!("Pump resumed");
                sink.emit(&AppEvent::RunResumed(RunKind::Pump));
            }
            if self.ctx.feed.resume() {
                info!("Feed resumed");
                sink.emit(&AppEvent::RunResumed(RunKind::Feed));
            }
            Notice::resumed()
        };
        self.sync_pump_output(hw);
        self.show_notice(hw, &notice);
    }

    fn cancel_runs(&mut self, hw: &mut impl Board, sink: &mut impl EventSink) {
        let pump = self.ctx.pump.cancel();
        let feed = self.ctx.feed.cancel();
        hw.set_feeder(FeederPosition::Rest);
        self.sync_pump_output(hw);

        if pump {
            sink.emit(&AppEvent::RunCancelled(RunKind::Pump));
        }
        if feed {
            sink.emit(&AppEvent::RunCancelled(RunKind::Feed));
        }
        if pump || feed {
            info!("Runs cancelled (pump: {}, feed: {})", pump, feed);
            self.show_notice(hw, &Notice::cancelled());
        } else {
            self.show_notice(hw, &Notice::nothing_running());
        }
    }

    // ── Runs ──────────────────────────────────────────────────

    fn start_pump(&mut self, sink: &mut impl EventSink) {
        let restarted = self.ctx.pump.is_active();
        if restarted {
            warn!("Pump schedule fired while running, restarting timer");
        }
        self.ctx.pump.start(self.ctx.now_ms);
        let duration_secs = self.ctx.settings.pump_duration_secs;
        info!("Pump started for {}s", duration_secs);
        sink.emit(&AppEvent::PumpStarted {
            duration_secs,
            restarted,
        });
        self.status_changed();
    }

    fn start_feed(&mut self, sink: &mut impl EventSink) {
        self.ctx.feed.start();
        let quantity = self.ctx.settings.feed_quantity;
        info!("Feed started, {} portions", quantity);
        sink.emit(&AppEvent::FeedStarted { quantity });
        self.status_changed();
    }

    fn advance_pump(&mut self, sink: &mut impl EventSink) {
        if self
            .ctx
            .pump
            .poll(self.ctx.now_ms, self.ctx.settings.pump_duration_secs)
        {
            info!("Pump run complete");
            sink.emit(&AppEvent::PumpStopped);
            self.status_changed();
        }
    }

    fn advance_feed(&mut self, hw: &mut impl Board, sink: &mut impl EventSink) {
        let quantity = self.ctx.settings.feed_quantity;
        let now = self.ctx.now_ms;
        match self
            .ctx
            .feed
            .advance(now, quantity, self.ctx.config.dispense_interval_ms)
        {
            FeedStep::Dispense => {
                let count = self.ctx.feed.dispensed() + 1;
                control::dispense(hw, self.ctx.config.dispense_hold_ms);
                let done = self.ctx.feed.record_dispense(now, quantity);
                sink.emit(&AppEvent::Dispensed { count, of: quantity });
                if done {
                    info!("Feed run complete");
                    sink.emit(&AppEvent::FeedCompleted);
                }
                self.status_changed();
            }
            FeedStep::Completed => {
                info!("Feed run complete");
                sink.emit(&AppEvent::FeedCompleted);
                self.status_changed();
            }
            FeedStep::Idle | FeedStep::Waiting => {}
        }
    }

    fn sync_pump_output(&mut self, hw: &mut impl Board) {
        let on = self.ctx.pump.output_on();
        if on != self.pump_output {
            hw.set_pump(on);
            self.pump_output = on;
        }
    }

    // ── Display ───────────────────────────────────────────────

    /// Run status changed; only the main display shows it.
    fn status_changed(&mut self) {
        if self.fsm.current_state() == StateId::MainDisplay {
            self.ctx.redraw = true;
        }
    }

    fn render(&mut self, hw: &mut impl Board, now: &NaiveDateTime) {
        screens::render(hw, self.fsm.current_state(), &self.ctx, now);
        self.ctx.redraw = false;
        self.last_render_ms = self.ctx.now_ms;
    }
}

// ───────────────────────────────────────────────────────────────
// Clock bootstrap
// ───────────────────────────────────────────────────────────────

/// Time the RTC is set to after losing power: the firmware build instant
/// shifted by `utc_offset_hours`.
pub fn bootstrap_time(utc_offset_hours: i8) -> NaiveDateTime {
    let base = option_env!("AQUAFEED_BUILD_EPOCH")
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.naive_utc())
        .or_else(|| NaiveDate::from_ymd_opt(2024, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)))
        .unwrap_or_default();
    TimeDelta::try_hours(i64::from(utc_offset_hours))
        .and_then(|offset| base.checked_add_signed(offset))
        .unwrap_or(base)
}
