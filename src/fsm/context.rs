//! Shared mutable context threaded through every FSM handler.
//!
//! `Context` replaces ambient globals: the loaded settings, the edit
//! buffer, both runs, the overlay's return state and the command outbox
//! all live here and are owned by the
//! [`AppService`](crate::app::service::AppService).

use heapless::Vec;
use log::warn;

use crate::app::commands::AppCommand;
use crate::config::FirmwareConfig;
use crate::control::feed_run::FeedRun;
use crate::control::pump_run::PumpRun;
use crate::settings::Settings;
use crate::ui::editor::InputEditor;
use crate::ui::screens::Notice;

use super::StateId;

/// Commands one key press can queue.
pub const OUTBOX_CAPACITY: usize = 4;

pub struct Context {
    // -- Timing --
    /// Uptime snapshot for this loop iteration.
    pub now_ms: u64,

    // -- Domain state --
    pub settings: Settings,
    pub editor: InputEditor,
    pub pump: PumpRun,
    pub feed: FeedRun,

    // -- Navigation --
    /// State the cancel overlay interrupted; "no" returns here.
    pub interrupted: Option<StateId>,
    /// The current screen must be drawn again.
    pub redraw: bool,

    // -- Side effects for the service --
    pub outbox: Vec<AppCommand, OUTBOX_CAPACITY>,

    // -- Configuration --
    pub config: FirmwareConfig,
}

impl Context {
    pub fn new(config: FirmwareConfig, settings: Settings) -> Self {
        Self {
            now_ms: 0,
            settings,
            editor: InputEditor::new(),
            pump: PumpRun::new(),
            feed: FeedRun::new(),
            interrupted: None,
            redraw: true,
            outbox: Vec::new(),
            config,
        }
    }

    /// Queue a command for the service.
    pub fn push(&mut self, cmd: AppCommand) {
        if let Err(cmd) = self.outbox.push(cmd) {
            warn!("Command outbox full, dropping {:?}", cmd);
        }
    }

    pub fn notify(&mut self, notice: Notice) {
        self.push(AppCommand::Notify(notice));
    }

    /// Take every queued command, oldest first.
    pub fn drain(&mut self) -> Vec<AppCommand, OUTBOX_CAPACITY> {
        core::mem::take(&mut self.outbox)
    }

    /// Whether a pump or feed run is active (running or paused).
    pub fn any_run_active(&self) -> bool {
        self.pump.is_active() || self.feed.is_active()
    }
}
