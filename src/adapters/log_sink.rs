//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART console in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(Some(now)) => info!("START | showing {}", now),
            AppEvent::Started(None) => {
                warn!("START | RTC unavailable, face waits for first boundary")
            }
            AppEvent::MinuteBoundary(now) => info!("MINUTE | {}", now),
            AppEvent::LedConfigured(li) => info!(
                "LED | R={} G={} B={} A={} mode={:?}",
                li.r, li.g, li.b, li.a, li.mode
            ),
            AppEvent::TimeOverridden(now) => info!("TIME | set to {}", now),
            AppEvent::SleepScheduleChanged(s) => info!(
                "SLEEP | schedule {:02}:00 -> {:02}:00",
                s.sleep_after, s.sleep_before
            ),
            AppEvent::SleepChanged(true) => info!("SLEEP | entered"),
            AppEvent::SleepChanged(false) => info!("SLEEP | left"),
            AppEvent::Fault(e) => warn!("FAULT | {}", e),
        }
    }
}
