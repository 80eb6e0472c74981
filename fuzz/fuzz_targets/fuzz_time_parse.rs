//! Fuzz target: `YYYY/MM/DD HH:MM:SS` parsing.
//!
//! Whatever parses must be a valid date/time in the supported year window
//! and must print back to text that parses to the same value.
//!
//! Run with: `cargo fuzz run fuzz_time_parse`

#![no_main]

use libfuzzer_sys::fuzz_target;
use nixieclock::datetime::DateTime;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(dt) = DateTime::parse(text) {
        assert!(dt.validate().is_ok());
        assert_eq!(DateTime::parse(&dt.to_string()), Ok(dt));
    }
});
