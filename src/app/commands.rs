//! Inbound commands to the clock service.
//!
//! The configuration boundary validates requests and turns them into
//! these; by the time a command reaches
//! [`ClockService`](super::service::ClockService) its values are in range.

use crate::config::{LedInfo, SleepInfo};
use crate::datetime::DateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockCommand {
    /// Replace the LED configuration and persist it.
    ApplyLedConfiguration(LedInfo),

    /// Set the RTC and re-seed the seconds counter.
    ApplyTimeOverride(DateTime),

    /// Replace the sleep schedule and persist it.
    ApplySleepSchedule(SleepInfo),
}
