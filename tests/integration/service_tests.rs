//! End-to-end tests for the AppService loop: startup, schedules, runs,
//! pause/resume and cancellation against the mock board.

use crate::mock_hw::{ActuatorCall, MockBoard, RecordingSink, Rig};

use aquafeed::app::events::AppEvent;
use aquafeed::app::ports::{ClockError, FeederPosition, TimePort};
use aquafeed::app::service::{bootstrap_time, AppService};
use aquafeed::config::FirmwareConfig;
use aquafeed::control::{RunKind, RunState};
use aquafeed::error::Error;
use aquafeed::fsm::StateId;
use aquafeed::settings::{Settings, SENTINEL};

// ── Startup ───────────────────────────────────────────────────

#[test]
fn first_boot_writes_defaults_and_shows_schedule() {
    let rig = Rig::start(MockBoard::at(10, 0, 0));

    assert_eq!(*rig.app.settings(), Settings::default());
    assert_eq!(rig.hw.store[0], SENTINEL);
    assert_eq!(&rig.hw.store[1..9], &[8, 0, 0, 30, 9, 0, 0, 3]);

    assert_eq!(rig.app.state(), StateId::MainDisplay);
    assert_eq!(rig.hw.row(0), "10:00:00   19/10");
    assert_eq!(rig.hw.row(1), "P08:00  F09:00");
    assert!(rig.sink.contains(&AppEvent::Started(StateId::MainDisplay)));
}

#[test]
fn startup_forces_actuators_safe() {
    let rig = Rig::start(MockBoard::at(10, 0, 0));
    assert_eq!(
        &rig.hw.calls[..2],
        &[
            (0, ActuatorCall::Pump(false)),
            (0, ActuatorCall::Feeder(FeederPosition::Rest)),
        ]
    );
}

#[test]
fn clock_fault_is_fatal() {
    let mut hw = MockBoard::at(10, 0, 0);
    hw.begin_fails = true;
    let mut sink = RecordingSink::new();
    let mut app = AppService::new(FirmwareConfig::default());

    let err = app.start(&mut hw, &mut sink).unwrap_err();
    assert_eq!(err, Error::Clock(ClockError::NotFound));
    assert!(!hw.pump_on());
    assert!(sink.events.is_empty());
}

#[test]
fn lost_power_sets_bootstrap_time() {
    let mut hw = MockBoard::at(0, 0, 0);
    hw.lost_power = true;
    let rig = Rig::start(hw);

    let expected = bootstrap_time(FirmwareConfig::default().utc_offset_hours);
    assert_eq!(rig.hw.adjusted, vec![expected]);
    assert!(rig.sink.contains(&AppEvent::ClockBootstrapped(expected)));
}

#[test]
fn healthy_clock_is_left_alone() {
    let rig = Rig::start(MockBoard::at(10, 0, 0));
    assert!(rig.hw.adjusted.is_empty());
}

#[test]
fn main_display_refreshes_every_second() {
    let mut rig = Rig::start(MockBoard::at(10, 0, 0));
    rig.run_until(5_001);
    assert_eq!(rig.hw.row(0), "10:00:05   19/10");
}

// ── Feed run ──────────────────────────────────────────────────

#[test]
fn scheduled_feed_dispenses_every_two_seconds() {
    let mut rig = Rig::start(MockBoard::at(8, 59, 59));
    rig.run_until(1_000);
    rig.step();

    assert_eq!(rig.app.feed_state(), RunState::Running);
    assert_eq!(rig.hw.row(1), "Feed 1/3");

    rig.run_until(10_000);

    assert_eq!(rig.hw.dispense_times(), vec![1_000, 3_000, 5_000]);
    assert_eq!(rig.hw.feeder(), FeederPosition::Rest);
    assert_eq!(rig.app.feed_state(), RunState::Idle);
    assert_eq!(rig.app.feed_dispensed(), 0);
    assert!(rig.sink.contains(&AppEvent::FeedStarted { quantity: 3 }));
    assert!(rig.sink.contains(&AppEvent::Dispensed { count: 3, of: 3 }));
    assert_eq!(
        rig.sink.count(|e| *e == AppEvent::FeedCompleted),
        1,
        "feed must complete exactly once"
    );
    assert_eq!(rig.hw.row(1), "P08:00  F09:00");
}

#[test]
fn feeder_returns_to_rest_after_each_hold() {
    let mut rig = Rig::start(MockBoard::at(8, 59, 59));
    rig.run_until(1_001);

    let moves: Vec<_> = rig
        .hw
        .calls
        .iter()
        .filter(|(t, _)| *t >= 1_000)
        .copied()
        .collect();
    assert_eq!(
        moves,
        vec![
            (1_000, ActuatorCall::Feeder(FeederPosition::Dispense)),
            (1_500, ActuatorCall::Feeder(FeederPosition::Rest)),
        ]
    );
}

#[test]
fn feed_schedule_fires_once_per_minute() {
    let mut rig = Rig::start(MockBoard::at(8, 59, 59));
    rig.run_until(60_000);
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::FeedStarted { .. })),
        1
    );
    assert_eq!(rig.hw.dispense_times().len(), 3);
}

#[test]
fn paused_feed_holds_count_and_resumes() {
    let mut rig = Rig::start(MockBoard::at(8, 59, 59));
    rig.run_until(1_000);
    rig.step();
    assert_eq!(rig.hw.uptime_ms(), 1_550);

    rig.press("*");
    assert_eq!(rig.app.feed_state(), RunState::Paused);
    assert_eq!(rig.hw.row(1), "Feed paused 1/3");
    assert!(rig.hw.was_printed("Runs paused"));

    rig.run_until(10_000);
    assert_eq!(rig.hw.dispense_times(), vec![1_000]);

    rig.press("*");
    rig.run_until(20_000);
    assert_eq!(rig.hw.dispense_times(), vec![1_000, 12_000, 14_000]);
    assert!(rig.sink.contains(&AppEvent::RunPaused(RunKind::Feed)));
    assert!(rig.sink.contains(&AppEvent::RunResumed(RunKind::Feed)));
}

// ── Pump run ──────────────────────────────────────────────────

#[test]
fn scheduled_pump_runs_for_duration() {
    let mut rig = Rig::start(MockBoard::at(7, 59, 59));
    rig.run_until(1_000);
    rig.step();
    assert!(rig.hw.pump_on());
    assert!(rig.app.pump_output());
    assert_eq!(rig.hw.row(1), "Pump 30s left");

    rig.run_until(31_001);
    assert!(!rig.hw.pump_on());
    assert_eq!(rig.hw.calls.last(), Some(&(31_000, ActuatorCall::Pump(false))));
    assert!(rig.sink.contains(&AppEvent::PumpStarted {
        duration_secs: 30,
        restarted: false
    }));
    assert!(rig.sink.contains(&AppEvent::PumpStopped));
}

#[test]
fn pump_pause_extends_finish_by_pause_length() {
    let mut rig = Rig::start(MockBoard::at(7, 59, 59));
    rig.run_until(1_000);
    rig.step();

    // 5 s in, pause for 10 s
    rig.run_until(6_000);
    rig.press("*");
    assert!(!rig.hw.pump_on());
    assert_eq!(rig.app.pump_state(), RunState::Paused);
    assert!(rig.hw.row(1).starts_with("Pump paused 25s"));

    rig.run_until(16_000);
    rig.press("*");
    assert!(rig.hw.pump_on());
    assert!(rig.hw.was_printed("Runs resumed"));

    rig.run_until(40_950);
    rig.step();
    assert!(rig.hw.pump_on(), "25 s of the 30 s are done at +39.95 s");
    rig.step();
    assert!(!rig.hw.pump_on());
    assert_eq!(rig.hw.calls.last(), Some(&(41_000, ActuatorCall::Pump(false))));
}

#[test]
fn runs_keep_going_while_menus_are_open() {
    let mut rig = Rig::start(MockBoard::at(7, 59, 59));
    rig.run_until(1_000);
    rig.step();
    rig.press("#1");
    assert_eq!(rig.app.state(), StateId::EditPumpTime);

    rig.run_until(31_001);
    assert!(!rig.hw.pump_on());
    assert_eq!(rig.app.state(), StateId::EditPumpTime);
    assert!(rig.sink.contains(&AppEvent::PumpStopped));
}

// ── Pause / cancel without runs ───────────────────────────────

#[test]
fn star_with_nothing_running_informs() {
    let mut rig = Rig::start(MockBoard::at(10, 0, 0));
    rig.press("*");
    assert!(rig.hw.was_printed("Nothing running"));
    assert_eq!(rig.app.state(), StateId::MainDisplay);
    assert!(rig.hw.calls.iter().all(|(_, c)| *c != ActuatorCall::Pump(true)));
}

#[test]
fn cancel_overlay_stops_pump_and_feeder() {
    let mut rig = Rig::start(MockBoard::at(7, 59, 59));
    rig.run_until(1_000);
    rig.step();

    rig.press("D");
    assert_eq!(rig.app.state(), StateId::ConfirmCancel);
    assert_eq!(rig.hw.row(0), "Cancel runs?");
    assert!(rig.hw.pump_on(), "overlay does not stop anything by itself");

    rig.press("#");
    assert_eq!(rig.app.state(), StateId::MainDisplay);
    assert!(!rig.hw.pump_on());
    assert_eq!(rig.hw.feeder(), FeederPosition::Rest);
    assert_eq!(rig.app.pump_state(), RunState::Idle);
    assert!(rig.hw.was_printed("Runs cancelled"));
    assert!(rig.sink.contains(&AppEvent::RunCancelled(RunKind::Pump)));
    assert!(!rig.sink.contains(&AppEvent::RunCancelled(RunKind::Feed)));
}

#[test]
fn cancelled_pump_does_not_restart_within_the_minute() {
    let mut rig = Rig::start(MockBoard::at(7, 59, 59));
    rig.run_until(1_000);
    rig.step();
    rig.press("D#");
    rig.run_until(50_000);
    assert!(!rig.hw.pump_on());
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::PumpStarted { .. })),
        1
    );
}
