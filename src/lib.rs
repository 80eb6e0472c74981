//! Single-tube nixie clock firmware library.
//!
//! Exposes the clock core and its adapters for integration testing.  All
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module; host builds get simulation stubs.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod counters;
pub mod datetime;
pub mod error;
pub mod pins;

pub mod adapters;
pub mod drivers;
