//! Fuzz target: keypad entry editor and field parsers
//!
//! Interprets each byte as a keypad legend and drives the edit buffer the
//! way an edit screen does, then hands the buffer to every parser.  The
//! buffer must stay within capacity, the cursor within the buffer, and
//! every accepted value within its field's range.
//!
//! cargo fuzz run fuzz_entry

#![no_main]

use aquafeed::settings::MAX_FEED_QUANTITY;
use aquafeed::ui::editor::{InputEditor, EDIT_CAPACITY};
use aquafeed::ui::keys::Key;
use aquafeed::ui::parse;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut editor = InputEditor::new();

    for &b in data {
        match Key::from_char(char::from(b)) {
            Some(Key::Digit(d)) => editor.insert_digit(d),
            Some(Key::Star) => editor.insert_separator(),
            Some(Key::Up) => editor.move_cursor_left(),
            Some(Key::Down) => editor.move_cursor_right(),
            Some(Key::Escape) => editor.reset(),
            _ => {}
        }
        assert!(editor.len() <= EDIT_CAPACITY, "buffer overran its capacity");
        assert!(editor.cursor() <= editor.len(), "cursor past end of buffer");
    }

    let input = editor.as_bytes();
    if let Ok(t) = parse::parse_time(input) {
        assert!(t.hour() < 24 && t.minute() < 60);
    }
    if let Ok(secs) = parse::parse_duration(input) {
        assert!(secs > 0);
    }
    if let Ok(qty) = parse::parse_quantity(input) {
        assert!((1..=MAX_FEED_QUANTITY).contains(&qty));
    }

    // Raw bytes straight into the parsers must not panic either.
    let _ = parse::parse_time(data);
    let _ = parse::parse_duration(data);
    let _ = parse::parse_quantity(data);
});
