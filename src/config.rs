//! Clock configuration records.
//!
//! [`LedInfo`] and [`SleepInfo`] are the two user-editable records; they are
//! persisted as small JSON documents by the config store and replaced
//! wholesale on every change.  [`ClockConfig`] holds the timing constants
//! and the clock-face policy, fixed at build time.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LED
// ---------------------------------------------------------------------------

/// Visual mode of the ambient RGB LED.
///
/// Stored and transmitted as its numeric code.  Codes outside `0..=2`
/// never reach the core through the boundary (rejected with 409); a code
/// read back from storage that is out of range decodes as [`LedMode::Off`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
#[repr(u8)]
pub enum LedMode {
    #[default]
    Off = 0,
    On = 1,
    Breathe = 2,
}

impl LedMode {
    /// Highest valid code.
    pub const MAX_CODE: u8 = Self::Breathe as u8;

    /// Strict decode, used at the boundary.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Off),
            1 => Some(Self::On),
            2 => Some(Self::Breathe),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<u8> for LedMode {
    fn from(code: u8) -> Self {
        Self::from_code(code).unwrap_or(Self::Off)
    }
}

impl From<LedMode> for u8 {
    fn from(mode: LedMode) -> Self {
        mode.code()
    }
}

/// LED colour, intensity ceiling and mode.
///
/// Default is black, zero alpha, OFF: the value used when no record has
/// been stored yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedInfo {
    #[serde(rename = "R", default)]
    pub r: u8,
    #[serde(rename = "G", default)]
    pub g: u8,
    #[serde(rename = "B", default)]
    pub b: u8,
    /// Intensity ceiling (0–255).
    #[serde(rename = "A", default)]
    pub a: u8,
    #[serde(rename = "state", default)]
    pub mode: LedMode,
}

impl LedInfo {
    pub const fn new(r: u8, g: u8, b: u8, a: u8, mode: LedMode) -> Self {
        Self { r, g, b, a, mode }
    }
}

// ---------------------------------------------------------------------------
// Sleep schedule
// ---------------------------------------------------------------------------

/// Hours during which the tube is blanked and the LED kept dark.
///
/// The clock sleeps from `sleep_after` o'clock until `sleep_before`
/// o'clock.  Equal hours disable sleeping (the default).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SleepInfo {
    #[serde(default)]
    pub sleep_before: u8,
    #[serde(default)]
    pub sleep_after: u8,
}

impl SleepInfo {
    pub const fn new(sleep_before: u8, sleep_after: u8) -> Self {
        Self {
            sleep_before,
            sleep_after,
        }
    }

    /// Both hours must be 0–23.
    pub fn is_valid(&self) -> bool {
        self.sleep_before < 24 && self.sleep_after < 24
    }

    /// Whether the clock should sleep during `hour` (0–23).
    pub fn is_sleeping(&self, hour: u8) -> bool {
        let (after, before) = (self.sleep_after, self.sleep_before);
        if after == before {
            false
        } else if after > before {
            // e.g. 23..7, wraps around midnight
            hour >= after || hour < before
        } else {
            // e.g. 9..17
            hour >= after && hour < before
        }
    }
}

// ---------------------------------------------------------------------------
// Clock face policy
// ---------------------------------------------------------------------------

/// How hours are shown on the tube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HourFormat {
    H24,
    H12,
}

/// Timing and layout of the digit sequence shown each minute.
///
/// A sequence for 13:07 with the default policy is
/// `1 · 3 ‖ 0 · 7 ⏸` where `·` is a short gap, `‖` the hour/minute
/// separator and `⏸` the pause before the sequence repeats.  A blank
/// whose duration is zero is left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacePolicy {
    /// Time each digit stays lit (ms).
    pub digit_ms: u32,
    /// Blank between the two digits of one field (ms).
    pub gap_ms: u32,
    /// Blank between hours and minutes (ms).
    pub separator_ms: u32,
    /// Blank after the minutes before starting over (ms).
    pub pause_ms: u32,
    pub hour_format: HourFormat,
    /// Skip the hour tens digit when it is zero.
    pub suppress_leading_zero: bool,
}

impl Default for FacePolicy {
    fn default() -> Self {
        Self {
            digit_ms: 1000,
            gap_ms: 150,
            separator_ms: 600,
            pause_ms: 2500,
            hour_format: HourFormat::H24,
            suppress_leading_zero: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Core timing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Software tick period (ms).
    pub tick_period_ms: u32,
    /// Animation frame period, in ticks.
    pub led_update_period_ticks: u32,
    /// Square-wave edges per minute boundary.
    pub seconds_per_minute: u32,
    /// Longest the boot sequence waits for the RTC second to roll over (ms).
    pub align_timeout_ms: u32,
    pub face: FacePolicy,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 1,
            led_update_period_ticks: 4, // 255 steps × 4 ms ≈ 1 s per ramp
            seconds_per_minute: 60,
            align_timeout_ms: 1500,
            face: FacePolicy::default(),
        }
    }
}
