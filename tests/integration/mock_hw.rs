//! Mock board for integration tests.
//!
//! Simulates everything a [`Board`] provides:
//!
//! - a wall clock and an uptime counter, both advanced only by delays;
//! - a scripted key queue;
//! - a 2×16 character screen plus a log of every printed string;
//! - a 16-byte settings store;
//! - an actuator call log stamped with uptime.
//!
//! [`Board`]: aquafeed::app::ports::Board

#![allow(dead_code)]

use std::collections::VecDeque;

use aquafeed::app::events::AppEvent;
use aquafeed::app::ports::{
    ActuatorPort, ClockError, DisplayPort, EventSink, FeederPosition, KeypadPort, SettingsPort,
    StorageError, TimePort,
};
use aquafeed::app::service::AppService;
use aquafeed::settings::STORE_LEN;
use aquafeed::ui::keys::Key;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use embedded_hal::delay::DelayNs;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    Pump(bool),
    Feeder(FeederPosition),
}

// ── MockBoard ─────────────────────────────────────────────────

pub struct MockBoard {
    elapsed_ns: u64,
    wall_base: NaiveDateTime,
    wall_base_ns: u64,

    pub keys: VecDeque<Key>,

    pub screen: [[u8; 16]; 2],
    cursor: (usize, usize),
    pub cursor_visible: bool,
    pub printed: Vec<String>,

    pub store: [u8; STORE_LEN],

    /// `(uptime_ms, call)` in order.
    pub calls: Vec<(u64, ActuatorCall)>,

    pub lost_power: bool,
    pub begin_fails: bool,
    pub adjusted: Vec<NaiveDateTime>,
}

impl MockBoard {
    /// Fresh board: blank store, clock at `start`.
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            elapsed_ns: 0,
            wall_base: start,
            wall_base_ns: 0,
            keys: VecDeque::new(),
            screen: [[b' '; 16]; 2],
            cursor: (0, 0),
            cursor_visible: false,
            printed: Vec::new(),
            store: [0xFF; STORE_LEN],
            calls: Vec::new(),
            lost_power: false,
            begin_fails: false,
            adjusted: Vec::new(),
        }
    }

    /// Board whose clock reads `hh:mm:ss` on a fixed day.
    pub fn at(h: u32, m: u32, s: u32) -> Self {
        Self::new(datetime(h, m, s))
    }

    pub fn row(&self, row: usize) -> String {
        String::from_utf8_lossy(&self.screen[row]).trim_end().to_string()
    }

    pub fn was_printed(&self, text: &str) -> bool {
        self.printed.iter().any(|p| p == text)
    }

    pub fn pump_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|(_, c)| match c {
                ActuatorCall::Pump(on) => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn feeder(&self) -> FeederPosition {
        self.calls
            .iter()
            .rev()
            .find_map(|(_, c)| match c {
                ActuatorCall::Feeder(p) => Some(*p),
                _ => None,
            })
            .unwrap_or(FeederPosition::Rest)
    }

    /// Uptimes at which the feeder moved to dispense.
    pub fn dispense_times(&self) -> Vec<u64> {
        self.calls
            .iter()
            .filter(|(_, c)| *c == ActuatorCall::Feeder(FeederPosition::Dispense))
            .map(|(t, _)| *t)
            .collect()
    }

    fn now_ms(&self) -> u64 {
        self.elapsed_ns / 1_000_000
    }
}

pub fn datetime(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 10, 19)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

// ── Ports ─────────────────────────────────────────────────────

impl TimePort for MockBoard {
    fn begin(&mut self) -> Result<(), ClockError> {
        if self.begin_fails {
            Err(ClockError::NotFound)
        } else {
            Ok(())
        }
    }

    fn now(&mut self) -> NaiveDateTime {
        let since = (self.elapsed_ns - self.wall_base_ns) / 1_000_000;
        let t = self.wall_base + TimeDelta::milliseconds(since as i64);
        // The RTC has whole-second resolution.
        t.with_nanosecond(0).unwrap()
    }

    fn lost_power(&mut self) -> bool {
        self.lost_power
    }

    fn adjust(&mut self, at: NaiveDateTime) {
        self.wall_base = at;
        self.wall_base_ns = self.elapsed_ns;
        self.lost_power = false;
        self.adjusted.push(at);
    }

    fn uptime_ms(&self) -> u64 {
        self.now_ms()
    }
}

impl SettingsPort for MockBoard {
    fn read_byte(&mut self, addr: u16) -> Result<u8, StorageError> {
        self.store
            .get(addr as usize)
            .copied()
            .ok_or(StorageError::OutOfBounds)
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), StorageError> {
        let slot = self
            .store
            .get_mut(addr as usize)
            .ok_or(StorageError::OutOfBounds)?;
        *slot = value;
        Ok(())
    }
}

impl DisplayPort for MockBoard {
    fn clear(&mut self) {
        self.screen = [[b' '; 16]; 2];
        self.cursor = (0, 0);
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        self.cursor = (col as usize, (row as usize).min(1));
    }

    fn print(&mut self, text: &str) {
        self.printed.push(text.to_string());
        let (mut col, row) = self.cursor;
        for b in text.bytes() {
            if col < 16 {
                self.screen[row][col] = b;
            }
            col += 1;
        }
        self.cursor = (col, row);
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor_visible = visible;
    }
}

impl KeypadPort for MockBoard {
    fn poll_key(&mut self) -> Option<Key> {
        self.keys.pop_front()
    }
}

impl ActuatorPort for MockBoard {
    fn set_pump(&mut self, on: bool) {
        let t = self.now_ms();
        self.calls.push((t, ActuatorCall::Pump(on)));
    }

    fn set_feeder(&mut self, position: FeederPosition) {
        let t = self.now_ms();
        self.calls.push((t, ActuatorCall::Feeder(position)));
    }
}

impl DelayNs for MockBoard {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += u64::from(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.elapsed_ns += u64::from(ms) * 1_000_000;
    }
}

// ── Recording event sink ──────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Loop driver ───────────────────────────────────────────────

/// Runs the control loop the way `main` does: tick, then sleep.
pub struct Rig {
    pub app: AppService,
    pub hw: MockBoard,
    pub sink: RecordingSink,
}

impl Rig {
    /// Start a default-configured service on `hw`.
    pub fn start(hw: MockBoard) -> Self {
        let mut rig = Self {
            app: AppService::new(Default::default()),
            hw,
            sink: RecordingSink::new(),
        };
        rig.app
            .start(&mut rig.hw, &mut rig.sink)
            .expect("service should start");
        rig
    }

    pub fn step(&mut self) {
        self.app.tick(&mut self.hw, &mut self.sink);
        let interval = self.app.config().loop_interval_ms;
        self.hw.delay_ms(interval);
    }

    /// Step until uptime reaches `ms`.
    pub fn run_until(&mut self, ms: u64) {
        while self.hw.uptime_ms() < ms {
            self.step();
        }
    }

    /// One key per loop iteration.
    pub fn press(&mut self, keys: &str) {
        for c in keys.chars() {
            let key = Key::from_char(c).expect("keypad character");
            self.hw.keys.push_back(key);
            self.step();
        }
    }
}
