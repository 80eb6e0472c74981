//! Integration test driver for `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises a subsystem against mock
//! adapters.  All tests run on the host with no real hardware required
//! (`cargo test --no-default-features`).

#![cfg(not(target_os = "espidf"))]

mod boundary_tests;
mod clock_service_tests;
