//! Clock face sequencer.
//!
//! One tube shows one digit at a time, so the time is spelled out as a
//! cycling sequence of glyphs, each held for its dwell time.  The sequence
//! is rebuilt at every minute boundary from the time read off the RTC and
//! advanced from the main loop using the monotonic tick count; the
//! sequencer never sleeps.

use heapless::Vec;

use crate::app::ports::NixieTube;
use crate::config::{FacePolicy, HourFormat};
use crate::datetime::DateTime;
use crate::drivers::bcd_decoder::Digit;
use crate::error::DisplayError;

/// Longest sequence: four digits, four blanks.
pub const MAX_STEPS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Digit(Digit),
    Blank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub glyph: Glyph,
    pub dwell_ms: u32,
}

pub struct ClockFace {
    policy: FacePolicy,
    tick_period_ms: u32,
    steps: Vec<Step, MAX_STEPS>,
    cursor: usize,
    last_change: u32,
    /// The glyph under the cursor has not reached the tube yet.
    dirty: bool,
}

impl ClockFace {
    pub fn new(policy: FacePolicy, tick_period_ms: u32) -> Self {
        Self {
            policy,
            tick_period_ms: tick_period_ms.max(1),
            steps: Vec::new(),
            cursor: 0,
            last_change: 0,
            dirty: false,
        }
    }

    /// Rebuild the sequence for `now` and restart it from the first step.
    /// While `sleeping` the sequence is a single blank.
    pub fn show_time(&mut self, now: &DateTime, sleeping: bool) {
        self.steps.clear();
        self.cursor = 0;
        self.dirty = true;

        if sleeping {
            self.push(Glyph::Blank, self.policy.pause_ms.max(1));
            return;
        }

        let p = self.policy;
        let hour = match p.hour_format {
            HourFormat::H24 => now.hour,
            HourFormat::H12 => match now.hour % 12 {
                0 => 12,
                h => h,
            },
        };

        let hour_tens = Digit::tens(hour);
        if !(p.suppress_leading_zero && hour_tens == Digit::ZERO) {
            self.push(Glyph::Digit(hour_tens), p.digit_ms);
            self.push(Glyph::Blank, p.gap_ms);
        }
        self.push(Glyph::Digit(Digit::units(hour)), p.digit_ms);
        self.push(Glyph::Blank, p.separator_ms);
        self.push(Glyph::Digit(Digit::tens(now.minute)), p.digit_ms);
        self.push(Glyph::Blank, p.gap_ms);
        self.push(Glyph::Digit(Digit::units(now.minute)), p.digit_ms);
        self.push(Glyph::Blank, p.pause_ms);
    }

    /// Advance the sequence if the current step's dwell has elapsed.
    /// Cheap to call every loop iteration.
    pub fn handle(
        &mut self,
        now_ticks: u32,
        tube: &mut impl NixieTube,
    ) -> Result<(), DisplayError> {
        let Some(step) = self.steps.get(self.cursor).copied() else {
            return Ok(());
        };

        if !self.dirty {
            let elapsed = now_ticks.wrapping_sub(self.last_change);
            if self.steps.len() == 1 || elapsed < self.ticks_for(step.dwell_ms) {
                return Ok(());
            }
            self.cursor = (self.cursor + 1) % self.steps.len();
            self.dirty = true;
        }

        self.last_change = now_ticks;
        match self.current() {
            Some(Glyph::Digit(d)) => tube.set_digit(d)?,
            Some(Glyph::Blank) => tube.blank()?,
            None => {}
        }
        self.dirty = false;
        Ok(())
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<Glyph> {
        self.steps.get(self.cursor).map(|s| s.glyph)
    }

    fn push(&mut self, glyph: Glyph, dwell_ms: u32) {
        if glyph == Glyph::Blank && dwell_ms == 0 {
            return;
        }
        // MAX_STEPS covers the longest sequence show_time builds.
        let _ = self.steps.push(Step { glyph, dwell_ms });
    }

    fn ticks_for(&self, ms: u32) -> u32 {
        ms.div_ceil(self.tick_period_ms)
    }
}
