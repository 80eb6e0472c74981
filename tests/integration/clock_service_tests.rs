//! Integration tests for the Timebase → ClockService → outputs pipeline.

use crate::mock_hw::{CountingDelay, LogSink, MockHardware, MockRtc, MockStore, leak_timebase};

use nixieclock::app::clock_face::Glyph;
use nixieclock::app::commands::ClockCommand;
use nixieclock::app::events::AppEvent;
use nixieclock::app::service::{ClockService, align_to_rtc_second};
use nixieclock::config::{ClockConfig, LedInfo, LedMode, SleepInfo};
use nixieclock::counters::Timebase;
use nixieclock::datetime::DateTime;
use nixieclock::drivers::bcd_decoder::Digit;
use nixieclock::drivers::led_animation::Rgba;
use nixieclock::error::{DisplayError, Error, RtcError};

const GREEN_BREATHE: LedInfo = LedInfo::new(0, 255, 0, 200, LedMode::Breathe);

fn t(hour: u8, minute: u8, second: u8) -> DateTime {
    DateTime::new(2024, 3, 5, hour, minute, second).unwrap()
}

struct Rig {
    tb: &'static Timebase,
    service: ClockService,
    rtc: MockRtc,
    hw: MockHardware,
    store: MockStore,
    sink: LogSink,
}

impl Rig {
    fn new(led: LedInfo, sleep: SleepInfo, now: DateTime) -> Self {
        let tb = leak_timebase();
        let mut sink = LogSink::new();
        let mut service = ClockService::new(ClockConfig::default(), tb, led, sleep);
        service.start(Some(now), &mut sink);
        Self {
            tb,
            service,
            rtc: MockRtc::at(now),
            hw: MockHardware::new(),
            store: MockStore::new(),
            sink,
        }
    }

    fn poll(&mut self) {
        self.service.poll(&mut self.rtc, &mut self.hw, &mut self.sink);
    }

    /// One animation frame's worth of ticks, then a poll.
    fn frame(&mut self) {
        for _ in 0..ClockConfig::default().led_update_period_ticks {
            self.tb.on_timer_tick();
        }
        self.poll();
    }

    fn edges(&mut self, n: u32) {
        for _ in 0..n {
            self.tb.on_square_wave_edge();
        }
    }

    fn command(&mut self, cmd: ClockCommand) -> Result<(), Error> {
        self.service
            .handle_command(cmd, &mut self.rtc, &mut self.store, &mut self.hw, &mut self.sink)
    }

    fn boundaries(&self) -> usize {
        self.sink.count(|e| matches!(e, AppEvent::MinuteBoundary(_)))
    }
}

// ── Minute boundary ───────────────────────────────────────────

#[test]
fn sixty_edges_trigger_exactly_one_refresh() {
    let mut rig = Rig::new(LedInfo::default(), SleepInfo::default(), t(13, 7, 0));

    rig.edges(59);
    rig.poll();
    assert_eq!(rig.boundaries(), 0);
    assert_eq!(rig.rtc.reads, 0, "RTC must not be read before the boundary");

    rig.edges(1);
    rig.poll();
    assert_eq!(rig.boundaries(), 1);
    assert_eq!(rig.tb.seconds().peek(), 0);

    rig.poll();
    assert_eq!(rig.boundaries(), 1, "no second refresh without new edges");
}

#[test]
fn late_poll_keeps_surplus_seconds() {
    let mut rig = Rig::new(LedInfo::default(), SleepInfo::default(), t(13, 7, 0));
    rig.edges(62);
    rig.poll();
    assert_eq!(rig.boundaries(), 1);
    assert_eq!(rig.tb.seconds().peek(), 2);
}

#[test]
fn boundary_rebuilds_face_from_rtc() {
    let mut rig = Rig::new(LedInfo::default(), SleepInfo::default(), t(13, 7, 0));
    rig.poll();
    assert_eq!(rig.hw.last_glyph(), Some(Glyph::Digit(Digit::units(1))));

    rig.rtc.now = t(21, 8, 0);
    rig.edges(60);
    rig.poll();

    let digits: Vec<u8> = rig
        .service
        .face()
        .steps()
        .iter()
        .filter_map(|s| match s.glyph {
            Glyph::Digit(d) => Some(d.value()),
            Glyph::Blank => None,
        })
        .collect();
    assert_eq!(digits, [2, 1, 0, 8]);
    assert_eq!(rig.hw.last_glyph(), Some(Glyph::Digit(Digit::units(2))));
    assert!(rig.sink.events.contains(&AppEvent::MinuteBoundary(t(21, 8, 0))));
}

#[test]
fn failed_rtc_read_is_skipped_and_next_boundary_recovers() {
    let mut rig = Rig::new(LedInfo::default(), SleepInfo::default(), t(13, 7, 0));
    let before = rig.service.face().steps().to_vec();

    rig.rtc.fail_reads = true;
    rig.edges(60);
    rig.poll();
    assert_eq!(rig.boundaries(), 0);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Fault(Error::Rtc(RtcError::Bus)))), 1);
    assert_eq!(rig.service.face().steps(), before.as_slice());
    assert_eq!(rig.tb.seconds().peek(), 0);

    rig.rtc.fail_reads = false;
    rig.rtc.now = t(13, 9, 0);
    rig.edges(60);
    rig.poll();
    assert_eq!(rig.boundaries(), 1);
}

// ── LED pacing ────────────────────────────────────────────────

#[test]
fn led_updates_only_on_frame_threshold() {
    let mut rig = Rig::new(GREEN_BREATHE, SleepInfo::default(), t(12, 0, 0));
    for _ in 0..3 {
        rig.tb.on_timer_tick();
    }
    rig.poll();
    assert!(rig.hw.leds.is_empty());

    rig.tb.on_timer_tick();
    rig.poll();
    assert_eq!(rig.hw.leds.len(), 1);
    assert_eq!(rig.hw.last_led().map(|c| c.a), Some(1));
    assert_eq!(rig.tb.frames().peek(), 0);
}

#[test]
fn breathe_cycle_touches_zero_and_ceiling() {
    let mut rig = Rig::new(LedInfo::default(), SleepInfo::default(), t(12, 0, 0));
    rig.command(ClockCommand::ApplyLedConfiguration(GREEN_BREATHE)).unwrap();
    assert_eq!(rig.store.led, Some(GREEN_BREATHE));

    for _ in 0..400 {
        rig.frame();
    }
    let alphas: Vec<u8> = rig.hw.leds.iter().map(|c| c.a).collect();
    assert_eq!(alphas.len(), 401);
    assert_eq!(alphas.first(), Some(&0));
    assert_eq!(alphas.last(), Some(&0));
    assert!(alphas.contains(&200));
    assert!(alphas.iter().all(|&a| a <= 200));
    assert!(rig.hw.leds.iter().all(|c| (c.r, c.g, c.b) == (0, 255, 0)));
}

#[test]
fn led_configuration_applies_even_if_save_fails() {
    let mut rig = Rig::new(LedInfo::default(), SleepInfo::default(), t(12, 0, 0));
    rig.store.fail_saves = true;
    let on = LedInfo::new(1, 2, 3, 4, LedMode::On);
    rig.command(ClockCommand::ApplyLedConfiguration(on)).unwrap();
    assert_eq!(rig.service.led_configuration(), on);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Fault(Error::Config(_)))), 1);
}

// ── Time override ─────────────────────────────────────────────

#[test]
fn time_override_seeds_seconds_and_restarts_animation() {
    let mut rig = Rig::new(GREEN_BREATHE, SleepInfo::default(), t(12, 0, 0));
    for _ in 0..50 {
        rig.frame();
    }
    assert_eq!(rig.service.animator().level(), 50);
    rig.edges(17);

    let target = t(18, 30, 42);
    rig.command(ClockCommand::ApplyTimeOverride(target)).unwrap();

    assert_eq!(rig.rtc.set_calls, [target]);
    assert_eq!(rig.tb.seconds().peek(), 42);
    assert_eq!(rig.service.animator().level(), 0);
    assert_eq!(rig.hw.last_led().map(|c| c.a), Some(0));
    assert!(rig.sink.events.contains(&AppEvent::TimeOverridden(target)));

    // 18 more edges complete the minute.
    rig.edges(18);
    rig.poll();
    assert_eq!(rig.boundaries(), 1);
}

#[test]
fn time_override_before_2000_changes_nothing() {
    let mut rig = Rig::new(GREEN_BREATHE, SleepInfo::default(), t(12, 0, 0));
    for _ in 0..50 {
        rig.frame();
    }
    rig.edges(7);
    let leds_before = rig.hw.leds.len();
    let events_before = rig.sink.events.len();

    let ancient = DateTime {
        year: 1999,
        ..t(12, 0, 30)
    };
    assert_eq!(
        rig.command(ClockCommand::ApplyTimeOverride(ancient)),
        Err(Error::Rtc(RtcError::OutOfRange))
    );

    assert!(rig.rtc.set_calls.is_empty());
    assert_eq!(rig.tb.seconds().peek(), 7);
    assert_eq!(rig.service.animator().level(), 50);
    assert_eq!(rig.hw.leds.len(), leds_before);
    assert_eq!(rig.sink.events.len(), events_before);
}

#[test]
fn time_override_rtc_failure_keeps_counter() {
    let mut rig = Rig::new(GREEN_BREATHE, SleepInfo::default(), t(12, 0, 0));
    rig.edges(5);
    rig.rtc.fail_sets = true;
    assert_eq!(
        rig.command(ClockCommand::ApplyTimeOverride(t(1, 2, 3))),
        Err(Error::Rtc(RtcError::Bus))
    );
    assert_eq!(rig.tb.seconds().peek(), 5);
}

#[test]
fn time_override_into_sleep_window_never_lights_led() {
    let on = LedInfo::new(255, 255, 255, 255, LedMode::On);
    let mut rig = Rig::new(on, SleepInfo::new(7, 23), t(12, 0, 0));
    assert!(!rig.service.is_sleeping());
    let before = rig.hw.leds.len();

    rig.command(ClockCommand::ApplyTimeOverride(t(23, 30, 0))).unwrap();

    assert!(rig.service.is_sleeping());
    assert_eq!(&rig.hw.leds[before..], [Rgba::BLACK]);
}

#[test]
fn time_override_out_of_sleep_window_lights_led_at_once() {
    let on = LedInfo::new(255, 255, 255, 255, LedMode::On);
    let mut rig = Rig::new(on, SleepInfo::new(7, 23), t(23, 30, 0));
    assert!(rig.service.is_sleeping());
    let before = rig.hw.leds.len();

    rig.command(ClockCommand::ApplyTimeOverride(t(12, 0, 0))).unwrap();

    assert_eq!(&rig.hw.leds[before..], [Rgba::new(255, 255, 255, 255)]);
}

// ── Tube faults ───────────────────────────────────────────────

#[test]
fn tube_write_failure_is_reported_and_retried() {
    let mut rig = Rig::new(LedInfo::default(), SleepInfo::default(), t(13, 7, 0));
    rig.hw.fail_tube = true;
    rig.poll();
    let faults = |rig: &Rig| {
        rig.sink
            .count(|e| matches!(e, AppEvent::Fault(Error::Display(DisplayError::PinWriteFailed))))
    };
    assert_eq!(faults(&rig), 1);
    assert!(rig.hw.tube.is_empty());

    rig.hw.fail_tube = false;
    rig.poll();
    assert_eq!(rig.hw.last_glyph(), Some(Glyph::Digit(Digit::units(1))));
}

// ── Sleep schedule ────────────────────────────────────────────

#[test]
fn sleeping_blanks_tube_and_darkens_led() {
    let on = LedInfo::new(255, 255, 255, 255, LedMode::On);
    let mut rig = Rig::new(on, SleepInfo::new(7, 23), t(23, 30, 0));
    assert!(rig.service.is_sleeping());
    assert_eq!(
        rig.service.face().steps().iter().map(|s| s.glyph).collect::<Vec<_>>(),
        [Glyph::Blank]
    );

    rig.frame();
    assert_eq!(rig.hw.last_glyph(), Some(Glyph::Blank));
    assert_eq!(rig.hw.last_led().map(|c| c.a), Some(0));

    rig.command(ClockCommand::ApplySleepSchedule(SleepInfo::default())).unwrap();
    assert!(!rig.service.is_sleeping());
    assert_eq!(rig.service.face().steps().len(), 8);
    assert_eq!(rig.hw.last_led().map(|c| c.a), Some(255));
    assert_eq!(rig.store.sleep, Some(SleepInfo::default()));
    assert!(rig.sink.events.contains(&AppEvent::SleepChanged(false)));
}

#[test]
fn invalid_sleep_schedule_is_refused() {
    let mut rig = Rig::new(LedInfo::default(), SleepInfo::default(), t(12, 0, 0));
    let result = rig.command(ClockCommand::ApplySleepSchedule(SleepInfo::new(25, 1)));
    assert!(matches!(result, Err(Error::Config(_))));
    assert_eq!(rig.service.sleep_schedule(), SleepInfo::default());
    assert_eq!(rig.store.sleep, None);
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn alignment_waits_for_second_rollover() {
    let tb = leak_timebase();
    let mut rtc = MockRtc::at(t(8, 0, 11));
    rtc.script.extend([t(8, 0, 10), t(8, 0, 10), t(8, 0, 10)]);
    let mut delay = CountingDelay::default();

    let now = align_to_rtc_second(&mut rtc, &mut delay, tb, 1500).unwrap();
    assert_eq!(now.second, 11);
    assert_eq!(tb.seconds().peek(), 11);
    assert_eq!(delay.total_ns, 3_000_000);
}

#[test]
fn alignment_gives_up_after_timeout() {
    let tb = leak_timebase();
    let mut rtc = MockRtc::at(t(8, 0, 10));
    let mut delay = CountingDelay::default();

    let now = align_to_rtc_second(&mut rtc, &mut delay, tb, 20).unwrap();
    assert_eq!(now.second, 10);
    assert_eq!(tb.seconds().peek(), 10);
    assert_eq!(delay.total_ns, 20_000_000);
}

#[test]
fn alignment_propagates_rtc_failure() {
    let tb = leak_timebase();
    let mut rtc = MockRtc::at(t(8, 0, 10));
    rtc.fail_reads = true;
    let mut delay = CountingDelay::default();
    assert_eq!(align_to_rtc_second(&mut rtc, &mut delay, tb, 20), Err(RtcError::Bus));
}

#[test]
fn start_without_rtc_waits_for_first_boundary() {
    let tb = leak_timebase();
    let mut sink = LogSink::new();
    let mut service = ClockService::new(
        ClockConfig::default(),
        tb,
        LedInfo::default(),
        SleepInfo::default(),
    );
    service.start(None, &mut sink);
    assert!(service.face().steps().is_empty());
    assert_eq!(sink.events, [AppEvent::Started(None)]);
}
