//! Clock service: the hexagonal core.
//!
//! [`ClockService`] owns the LED animator, the clock face and the sleep
//! schedule.  The main loop calls [`ClockService::poll`] as fast as it
//! likes; all pacing comes from the interrupt-fed [`Timebase`].
//!
//! ```text
//!  Timebase ──▶ ┌──────────────────────────┐ ──▶ LedPort / NixieTube
//!  RtcPort  ◀──▶│       ClockService        │ ──▶ EventSink
//!               │ animator · face · sleep   │ ──▶ ConfigStorePort
//!               └──────────────────────────┘
//! ```

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::app::clock_face::ClockFace;
use crate::config::{ClockConfig, LedInfo, SleepInfo};
use crate::counters::Timebase;
use crate::datetime::DateTime;
use crate::drivers::led_animation::{LedAnimator, Rgba};
use crate::error::{self, RtcError};

use super::commands::ClockCommand;
use super::events::AppEvent;
use super::ports::{ConfigError, ConfigStorePort, EventSink, LedPort, NixieTube, RtcPort};

pub struct ClockService {
    config: ClockConfig,
    timebase: &'static Timebase,
    animator: LedAnimator,
    face: ClockFace,
    sleep: SleepInfo,
    sleeping: bool,
    /// Time most recently shown, used to re-evaluate the sleep window.
    shown: Option<DateTime>,
}

impl ClockService {
    pub fn new(
        config: ClockConfig,
        timebase: &'static Timebase,
        led: LedInfo,
        sleep: SleepInfo,
    ) -> Self {
        Self {
            config,
            timebase,
            animator: LedAnimator::new(led),
            face: ClockFace::new(config.face, config.tick_period_ms),
            sleep,
            sleeping: false,
            shown: None,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Show `now` immediately instead of waiting for the first minute
    /// boundary.
    pub fn start(&mut self, now: Option<DateTime>, sink: &mut impl EventSink) {
        if let Some(now) = now {
            self.show(now, sink);
        }
        sink.emit(&AppEvent::Started(now));
        info!(
            "ClockService started (led={:?}, sleep={:?})",
            self.animator.configuration(),
            self.sleep
        );
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// One main-loop pass: animation frame, minute boundary, face advance.
    ///
    /// A minute boundary removes exactly 60 seconds from the counter rather
    /// than zeroing it.  Edges that arrived after the 60th, because the loop
    /// was late, count towards the next minute, so boundaries stay locked
    /// to the RTC second.  With a prompt loop the counter reads 0 right after
    /// the boundary.
    pub fn poll(
        &mut self,
        rtc: &mut impl RtcPort,
        hw: &mut (impl LedPort + NixieTube),
        sink: &mut impl EventSink,
    ) {
        if self
            .timebase
            .frames()
            .take_at_least(self.config.led_update_period_ticks)
            .is_some()
        {
            self.animator.update();
            hw.set_led(self.led_output());
        }

        if self.timebase.seconds().consume(self.config.seconds_per_minute) {
            match rtc.read_now() {
                Ok(now) => {
                    info!("Minute boundary: {}", now);
                    self.show(now, sink);
                    sink.emit(&AppEvent::MinuteBoundary(now));
                }
                Err(e) => {
                    // The next boundary re-reads.
                    warn!("Minute boundary: RTC read failed: {}", e);
                    sink.emit(&AppEvent::Fault(e.into()));
                }
            }
        }

        if let Err(e) = self.face.handle(self.timebase.uptime_ticks(), hw) {
            warn!("Tube update failed: {}", e);
            sink.emit(&AppEvent::Fault(e.into()));
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply a validated command from the configuration boundary.
    ///
    /// A rejected command leaves every piece of state untouched.
    pub fn handle_command(
        &mut self,
        cmd: ClockCommand,
        rtc: &mut impl RtcPort,
        store: &mut impl ConfigStorePort,
        hw: &mut impl LedPort,
        sink: &mut impl EventSink,
    ) -> error::Result<()> {
        match cmd {
            ClockCommand::ApplyLedConfiguration(info) => {
                self.animator.set_configuration(info);
                hw.set_led(self.led_output());
                if let Err(e) = store.save_led(&info) {
                    warn!("LED configuration applied but not saved: {}", e);
                    sink.emit(&AppEvent::Fault(e.into()));
                }
                info!("LED configuration: {:?}", info);
                sink.emit(&AppEvent::LedConfigured(info));
            }
            ClockCommand::ApplyTimeOverride(now) => {
                if now.validate().is_err() {
                    return Err(RtcError::OutOfRange.into());
                }
                rtc.set_now(&now)?;
                // Setting the seconds register restarts the SQW countdown.
                self.timebase.seconds().set(u32::from(now.second));
                self.animator.reset();
                self.show(now, sink);
                hw.set_led(self.led_output());
                info!("Time set to {}", now);
                sink.emit(&AppEvent::TimeOverridden(now));
            }
            ClockCommand::ApplySleepSchedule(schedule) => {
                if !schedule.is_valid() {
                    return Err(ConfigError::ValidationFailed("sleep hours must be 0-23").into());
                }
                self.sleep = schedule;
                if let Err(e) = store.save_sleep(&schedule) {
                    warn!("Sleep schedule applied but not saved: {}", e);
                    sink.emit(&AppEvent::Fault(e.into()));
                }
                if let Some(now) = self.shown {
                    self.show(now, sink);
                    hw.set_led(self.led_output());
                }
                info!("Sleep schedule: {:?}", schedule);
                sink.emit(&AppEvent::SleepScheduleChanged(schedule));
            }
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn led_configuration(&self) -> LedInfo {
        self.animator.configuration()
    }

    pub fn sleep_schedule(&self) -> SleepInfo {
        self.sleep
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    pub fn animator(&self) -> &LedAnimator {
        &self.animator
    }

    pub fn face(&self) -> &ClockFace {
        &self.face
    }

    pub fn timebase(&self) -> &'static Timebase {
        self.timebase
    }

    /// Colour the LED should show right now.
    pub fn led_output(&self) -> Rgba {
        if self.sleeping { Rgba::BLACK } else { self.animator.output() }
    }

    // ── Internal helpers ──────────────────────────────────────

    fn show(&mut self, now: DateTime, sink: &mut impl EventSink) {
        let sleeping = self.sleep.is_sleeping(now.hour);
        if sleeping != self.sleeping {
            self.sleeping = sleeping;
            info!("Sleep window {}", if sleeping { "entered" } else { "left" });
            sink.emit(&AppEvent::SleepChanged(sleeping));
        }
        self.face.show_time(&now, sleeping);
        self.shown = Some(now);
    }
}

/// Wait for the RTC second to roll over, then seed the seconds counter with
/// the new second so the first minute boundary lands on :00.
///
/// Gives up after `timeout_ms` and seeds from the last reading instead.
pub fn align_to_rtc_second(
    rtc: &mut impl RtcPort,
    delay: &mut impl DelayNs,
    timebase: &Timebase,
    timeout_ms: u32,
) -> Result<DateTime, RtcError> {
    let start = rtc.read_now()?;
    let mut now = start;
    let mut waited_ms = 0;
    while now.second == start.second {
        if waited_ms >= timeout_ms {
            warn!("RTC second did not roll over within {} ms; aligning anyway", timeout_ms);
            break;
        }
        delay.delay_ms(1);
        waited_ms += 1;
        now = rtc.read_now()?;
    }
    timebase.seconds().set(u32::from(now.second));
    info!("Aligned to RTC second after {} ms: {}", waited_ms, now);
    Ok(now)
}
