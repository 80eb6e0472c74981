//! Fuzz target: console request-line parsing.
//!
//! Any byte string must either parse into a request whose fields fit their
//! bounds or be rejected with a typed error.  Never panic.
//!
//! Run with: `cargo fuzz run fuzz_request_line`

#![no_main]

use libfuzzer_sys::fuzz_target;
use nixieclock::app::boundary::{MAX_BODY, MAX_PATH, Request};

fuzz_target!(|data: &[u8]| {
    let Ok(line) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(req) = Request::parse_line(line) {
        assert!(!req.path.is_empty());
        assert!(req.path.len() <= MAX_PATH);
        assert!(req.body.len() <= MAX_BODY);
    }
});
