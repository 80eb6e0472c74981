//! Nixie tube driver: four BCD lines into a BCD-to-decimal decoder.
//!
//! Line weights are 1, 2, 4, 8 (A..D).  The decoder (74141 or K155ID1)
//! lights no cathode for codes 10–15, so the all-ones code blanks the tube.

use embedded_hal::digital::{ErrorType, OutputPin, PinState};

use crate::drivers::hw_init;
use crate::error::DisplayError;

/// Code that lights no cathode.
pub const BLANK_CODE: u8 = 0b1111;

/// A decimal digit, 0–9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digit(u8);

impl Digit {
    pub const ZERO: Self = Self(0);

    pub const fn new(value: u8) -> Option<Self> {
        if value <= 9 { Some(Self(value)) } else { None }
    }

    /// Units digit of `value`.
    pub const fn units(value: u8) -> Self {
        Self(value % 10)
    }

    /// Tens digit of `value` (mod 10).
    pub const fn tens(value: u8) -> Self {
        Self((value / 10) % 10)
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

/// BCD code for `digit`.
pub const fn encode(digit: Digit) -> u8 {
    digit.0
}

/// Four output lines, least significant first.
pub struct BcdDecoder<P> {
    lines: [P; 4],
    code: Option<u8>,
}

impl<P: OutputPin> BcdDecoder<P> {
    pub fn new(lines: [P; 4]) -> Self {
        Self { lines, code: None }
    }

    /// Drive all lines low (digit 0, a safe defined state).
    pub fn initialize(&mut self) -> Result<(), DisplayError> {
        self.write_code(0)
    }

    pub fn set_digit(&mut self, digit: Digit) -> Result<(), DisplayError> {
        self.write_code(encode(digit))
    }

    pub fn blank(&mut self) -> Result<(), DisplayError> {
        self.write_code(BLANK_CODE)
    }

    /// Last code written, `None` before initialisation.
    pub fn code(&self) -> Option<u8> {
        self.code
    }

    fn write_code(&mut self, code: u8) -> Result<(), DisplayError> {
        for (bit, line) in self.lines.iter_mut().enumerate() {
            let state = PinState::from(code & (1 << bit) != 0);
            line.set_state(state).map_err(|_| DisplayError::PinWriteFailed)?;
        }
        self.code = Some(code);
        Ok(())
    }
}

/// A GPIO configured as output by [`hw_init::init_peripherals`].
#[derive(Debug, Clone, Copy)]
pub struct GpioLine(pub i32);

impl ErrorType for GpioLine {
    type Error = core::convert::Infallible;
}

impl OutputPin for GpioLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.0, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.0, true);
        Ok(())
    }
}
