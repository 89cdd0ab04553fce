//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_screen={:?}", state);
            }
            AppEvent::ClockBootstrapped(at) => {
                warn!("CLOCK | power was lost, set to build time {}", at);
            }
            AppEvent::ScreenChanged { from, to } => {
                info!("SCREEN | {:?} -> {:?}", from, to);
            }
            AppEvent::PumpStarted {
                duration_secs,
                restarted,
            } => {
                info!(
                    "PUMP | start {}s{}",
                    duration_secs,
                    if *restarted { " (restart)" } else { "" }
                );
            }
            AppEvent::PumpStopped => {
                info!("PUMP | done");
            }
            AppEvent::FeedStarted { quantity } => {
                info!("FEED | start x{}", quantity);
            }
            AppEvent::Dispensed { count, of } => {
                info!("FEED | dispensed {}/{}", count, of);
            }
            AppEvent::FeedCompleted => {
                info!("FEED | done");
            }
            AppEvent::RunPaused(kind) => {
                info!("RUN | {:?} paused", kind);
            }
            AppEvent::RunResumed(kind) => {
                info!("RUN | {:?} resumed", kind);
            }
            AppEvent::RunCancelled(kind) => {
                info!("RUN | {:?} cancelled", kind);
            }
            AppEvent::SettingCommitted(field) => {
                info!("SETTINGS | {:?} committed", field);
            }
            AppEvent::InputRejected { field, error } => {
                warn!("SETTINGS | {:?} rejected: {}", field, error);
            }
        }
    }
}
