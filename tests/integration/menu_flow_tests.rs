//! Keypad-driven flows through the menu tree and edit screens, checked
//! against the screen model, the settings store and emitted events.

use crate::mock_hw::{datetime, MockBoard, Rig};

use aquafeed::app::events::AppEvent;
use aquafeed::fsm::StateId;
use aquafeed::settings::{Field, Settings, TimeOfDay};
use aquafeed::ui::parse::InputError;

// ── Navigation ────────────────────────────────────────────────

#[test]
fn menu_pages_render_their_options() {
    let mut rig = Rig::start(MockBoard::at(10, 0, 0));

    rig.press("#");
    assert_eq!(rig.app.state(), StateId::TopMenu);
    assert_eq!(rig.hw.row(0), "1 Pump start  A<");
    assert_eq!(rig.hw.row(1), "2 Pump secs   B>");

    rig.press("B");
    assert_eq!(rig.app.state(), StateId::FeedMenu);
    assert_eq!(rig.hw.row(0), "1 Feed start  A<");

    rig.press("B");
    assert_eq!(rig.app.state(), StateId::SettingsMenu);
    assert_eq!(rig.hw.row(0), "1 Set clock   A<");

    rig.press("AAA");
    assert_eq!(rig.app.state(), StateId::MainDisplay);
    assert!(rig.sink.contains(&AppEvent::ScreenChanged {
        from: StateId::TopMenu,
        to: StateId::MainDisplay
    }));
}

#[test]
fn edit_screen_shows_title_prompt_and_cursor() {
    let mut rig = Rig::start(MockBoard::at(10, 0, 0));
    rig.press("#1");
    assert_eq!(rig.app.state(), StateId::EditPumpTime);
    assert_eq!(rig.hw.row(0), "Pump start HH*MM");
    assert_eq!(rig.hw.row(1), "Pump at:");
    assert!(rig.hw.cursor_visible);

    rig.press("07*3");
    assert_eq!(rig.hw.row(1), "Pump at:07:3");
}

#[test]
fn escape_from_edit_discards_entry() {
    let mut rig = Rig::start(MockBoard::at(10, 0, 0));
    rig.press("#1");
    rig.press("06*15");
    rig.press("C");
    assert_eq!(rig.app.state(), StateId::MainDisplay);
    assert_eq!(*rig.app.settings(), Settings::default());
    assert!(!rig.hw.cursor_visible);
}

// ── Commits ───────────────────────────────────────────────────

#[test]
fn pump_time_commit_persists_and_returns_home() {
    let mut rig = Rig::start(MockBoard::at(10, 0, 0));
    rig.press("#1");
    rig.press("07*30#");

    assert_eq!(rig.app.state(), StateId::MainDisplay);
    assert_eq!(rig.app.settings().pump_start, TimeOfDay::new(7, 30).unwrap());
    assert_eq!(&rig.hw.store[1..3], &[7, 30]);
    assert!(rig.hw.was_printed("Pump time set"));
    assert!(rig.hw.was_printed("07:30"));
    assert_eq!(rig.hw.row(1), "P07:30  F09:00");
    assert!(rig.sink.contains(&AppEvent::SettingCommitted(Field::PumpStart)));
}

#[test]
fn single_digit_hour_is_accepted() {
    let mut rig = Rig::start(MockBoard::at(10, 0, 0));
    rig.press("#B1");
    assert_eq!(rig.app.state(), StateId::EditFeedTime);
    rig.press("6*5#");
    assert_eq!(rig.app.settings().feed_start, TimeOfDay::new(6, 5).unwrap());
    assert_eq!(&rig.hw.store[5..7], &[6, 5]);
}

#[test]
fn pump_duration_commit_writes_both_bytes() {
    let mut rig = Rig::start(MockBoard::at(10, 0, 0));
    rig.press("#2");
    assert_eq!(rig.app.state(), StateId::EditPumpDuration);
    rig.press("300#");
    assert_eq!(rig.app.settings().pump_duration_secs, 300);
    assert_eq!(&rig.hw.store[3..5], &[0x01, 0x2C]);
    assert!(rig.hw.was_printed("Pump secs set"));
}

#[test]
fn feed_quantity_commit_and_reject() {
    let mut rig = Rig::start(MockBoard::at(10, 0, 0));
    rig.press("#B2");
    assert_eq!(rig.app.state(), StateId::EditFeedQuantity);

    rig.press("0#");
    assert_eq!(rig.app.state(), StateId::EditFeedQuantity);
    assert!(rig.hw.was_printed("Invalid! (1-999)"));
    assert_eq!(rig.hw.row(1), "Feed qty:");

    rig.press("1000#");
    assert_eq!(rig.app.state(), StateId::EditFeedQuantity);
    assert_eq!(rig.app.settings().feed_quantity, 3);

    rig.press("12#");
    assert_eq!(rig.app.state(), StateId::MainDisplay);
    assert_eq!(rig.app.settings().feed_quantity, 12);
    assert_eq!(&rig.hw.store[7..9], &[0, 12]);
}

#[test]
fn zero_duration_is_rejected() {
    let mut rig = Rig::start(MockBoard::at(10, 0, 0));
    rig.press("#2");
    rig.press("0#");
    assert!(rig.hw.was_printed("Invalid! (>0)"));
    assert_eq!(rig.app.settings().pump_duration_secs, 30);
    assert!(rig.sink.contains(&AppEvent::InputRejected {
        field: Field::PumpDuration,
        error: InputError::OutOfRange
    }));
}

// ── Rejections ────────────────────────────────────────────────

#[test]
fn out_of_range_time_stays_on_screen_with_empty_buffer() {
    let mut rig = Rig::start(MockBoard::at(10, 0, 0));
    rig.press("#1");
    rig.press("25*00#");

    assert_eq!(rig.app.state(), StateId::EditPumpTime);
    assert!(rig.hw.was_printed("Invalid Time!"));
    assert_eq!(rig.hw.row(0), "Pump start HH*MM");
    assert_eq!(rig.hw.row(1), "Pump at:");
    assert_eq!(*rig.app.settings(), Settings::default());
    assert_eq!(&rig.hw.store[1..3], &[8, 0]);
    assert!(rig.sink.contains(&AppEvent::InputRejected {
        field: Field::PumpStart,
        error: InputError::OutOfRange
    }));
}

#[test]
fn missing_separator_shows_format_hint() {
    let mut rig = Rig::start(MockBoard::at(10, 0, 0));
    rig.press("#1");
    rig.press("0730#");

    assert_eq!(rig.app.state(), StateId::EditPumpTime);
    assert!(rig.hw.was_printed("Format: HH:MM"));
    assert!(rig.hw.was_printed("Ex: 08*30=08:30"));
    assert!(rig.sink.contains(&AppEvent::InputRejected {
        field: Field::PumpStart,
        error: InputError::NoSeparator
    }));

    // The retry works without leaving the screen.
    rig.press("07*30#");
    assert_eq!(rig.app.settings().pump_start, TimeOfDay::new(7, 30).unwrap());
}

#[test]
fn cursor_edit_replaces_in_place() {
    let mut rig = Rig::start(MockBoard::at(10, 0, 0));
    rig.press("#1");
    rig.press("07*30");
    // Back over "30", overwrite the 3 with a 4
    rig.press("AA4#");
    assert_eq!(rig.app.settings().pump_start, TimeOfDay::new(7, 40).unwrap());
}

// ── Clock ─────────────────────────────────────────────────────

#[test]
fn clock_commit_adjusts_time_keeping_date() {
    let mut rig = Rig::start(MockBoard::at(10, 0, 0));
    rig.press("#BB1");
    assert_eq!(rig.app.state(), StateId::EditClock);
    assert_eq!(rig.hw.row(1), "Clock:");

    rig.press("12*45#");
    assert_eq!(rig.hw.adjusted, vec![datetime(12, 45, 0)]);
    assert_eq!(rig.app.state(), StateId::MainDisplay);
    assert!(rig.hw.row(0).starts_with("12:45:0"));
    assert_eq!(*rig.app.settings(), Settings::default());
    assert!(rig.sink.contains(&AppEvent::SettingCommitted(Field::Clock)));
    assert!(rig.hw.was_printed("Clock set"));
}

#[test]
fn invalid_clock_leaves_time_alone() {
    let mut rig = Rig::start(MockBoard::at(10, 0, 0));
    rig.press("#BB1");
    rig.press("12*60#");
    assert!(rig.hw.adjusted.is_empty());
    assert_eq!(rig.app.state(), StateId::EditClock);
}

// ── Cancel overlay ────────────────────────────────────────────

#[test]
fn menu_key_on_idle_main_only_informs() {
    let mut rig = Rig::start(MockBoard::at(10, 0, 0));
    rig.press("D");
    assert_eq!(rig.app.state(), StateId::MainDisplay);
    assert!(rig.hw.was_printed("No active run"));
}

#[test]
fn overlay_no_returns_to_interrupted_screen() {
    let mut rig = Rig::start(MockBoard::at(10, 0, 0));
    rig.press("#B");
    rig.press("D");
    assert_eq!(rig.app.state(), StateId::ConfirmCancel);
    assert_eq!(rig.hw.row(1), "#=Yes  C=No");

    rig.press("C");
    assert_eq!(rig.app.state(), StateId::FeedMenu);
    assert_eq!(rig.hw.row(0), "1 Feed start  A<");
}

#[test]
fn overlay_yes_with_nothing_running_goes_home() {
    let mut rig = Rig::start(MockBoard::at(10, 0, 0));
    rig.press("#2");
    rig.press("D#");
    assert_eq!(rig.app.state(), StateId::MainDisplay);
    assert!(rig.hw.was_printed("Nothing running"));
}

// ── Persistence across reboot ─────────────────────────────────

#[test]
fn committed_settings_survive_restart() {
    let mut rig = Rig::start(MockBoard::at(10, 0, 0));
    rig.press("#B2");
    rig.press("7#");
    rig.press("#1");
    rig.press("18*05#");

    let mut hw = MockBoard::at(11, 0, 0);
    hw.store = rig.hw.store;
    let rebooted = Rig::start(hw);
    assert_eq!(rebooted.app.settings().feed_quantity, 7);
    assert_eq!(
        rebooted.app.settings().pump_start,
        TimeOfDay::new(18, 5).unwrap()
    );
    assert_eq!(rebooted.hw.row(1), "P18:05  F09:00");
}
