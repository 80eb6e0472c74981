//! Outbound application events.
//!
//! The [`ClockService`](super::service::ClockService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.

use crate::config::{LedInfo, SleepInfo};
use crate::datetime::DateTime;
use crate::error::Error;

/// Structured events emitted by the clock core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Boot finished; carries the time first shown, if the RTC answered.
    Started(Option<DateTime>),

    /// Sixty seconds elapsed and the face was refreshed from the RTC.
    MinuteBoundary(DateTime),

    /// LED configuration replaced.
    LedConfigured(LedInfo),

    /// RTC set from outside.
    TimeOverridden(DateTime),

    /// Sleep schedule replaced.
    SleepScheduleChanged(SleepInfo),

    /// The clock entered (`true`) or left (`false`) its sleep window.
    SleepChanged(bool),

    /// A hardware or storage operation failed; the loop carries on.
    Fault(Error),
}
