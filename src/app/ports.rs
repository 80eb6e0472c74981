//! Port traits: the hexagonal boundary between clock logic and hardware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ClockService (domain)
//! ```
//!
//! Driven adapters (RTC, LED, tube, config store, event sinks) implement
//! these traits.  The [`ClockService`](super::service::ClockService)
//! consumes them via generics, so the domain never touches hardware.

use crate::config::{LedInfo, SleepInfo};
use crate::datetime::DateTime;
use crate::drivers::bcd_decoder::Digit;
use crate::drivers::led_animation::Rgba;
use crate::error::{DisplayError, RtcError};

// ───────────────────────────────────────────────────────────────
// Real-time clock
// ───────────────────────────────────────────────────────────────

/// Source of absolute time and of the 1 Hz edge.
pub trait RtcPort {
    fn read_now(&mut self) -> Result<DateTime, RtcError>;

    fn set_now(&mut self, now: &DateTime) -> Result<(), RtcError>;

    /// Enable the 1 Hz square-wave output feeding the seconds counter.
    fn configure_square_wave(&mut self) -> Result<(), RtcError>;

    /// `false` if the oscillator stopped since the time was last set
    /// (battery removed, first power-up).
    fn is_time_valid(&mut self) -> Result<bool, RtcError>;
}

// ───────────────────────────────────────────────────────────────
// Outputs
// ───────────────────────────────────────────────────────────────

/// The ambient RGB LED.
pub trait LedPort {
    fn set_led(&mut self, colour: Rgba);
}

/// The single nixie tube.
pub trait NixieTube {
    fn set_digit(&mut self, digit: Digit) -> Result<(), DisplayError>;

    /// Extinguish every cathode.
    fn blank(&mut self) -> Result<(), DisplayError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration store
// ───────────────────────────────────────────────────────────────

/// Durable storage for the two user-editable records.
///
/// `load_*` returns the record's default when nothing has been stored yet.
/// A record that exists but cannot be decoded is
/// [`ConfigError::Corrupted`]; callers fall back to the default.
pub trait ConfigStorePort {
    fn load_led(&self) -> Result<LedInfo, ConfigError>;

    fn save_led(&mut self, info: &LedInfo) -> Result<(), ConfigError>;

    fn load_sleep(&self) -> Result<SleepInfo, ConfigError>;

    /// Rejects hours ≥ 24 with [`ConfigError::ValidationFailed`].
    fn save_sleep(&mut self, info: &SleepInfo) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigStorePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored record failed to decode.
    Corrupted,
    /// A field failed range validation.
    ValidationFailed(&'static str),
    /// Underlying filesystem error.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
