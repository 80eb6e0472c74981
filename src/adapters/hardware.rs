//! Hardware adapter: bridges the LED and tube drivers to the port traits.
//!
//! On non-espidf targets the underlying drivers use cfg-gated simulation
//! stubs.

use embedded_hal::digital::OutputPin;

use crate::app::ports::{LedPort, NixieTube};
use crate::drivers::bcd_decoder::{BcdDecoder, Digit, GpioLine};
use crate::drivers::led_animation::Rgba;
use crate::drivers::rgb_led::RgbLed;
use crate::error::DisplayError;
use crate::pins;

pub struct HardwareAdapter<P = GpioLine> {
    led: RgbLed,
    tube: BcdDecoder<P>,
}

impl HardwareAdapter<GpioLine> {
    /// Adapter over the board's BCD GPIOs and LEDC channels.
    pub fn from_pins() -> Self {
        Self::new(RgbLed::new(), BcdDecoder::new(pins::BCD_GPIOS.map(GpioLine)))
    }
}

impl<P: OutputPin> HardwareAdapter<P> {
    pub fn new(led: RgbLed, tube: BcdDecoder<P>) -> Self {
        Self { led, tube }
    }

    /// Safe power-on state: tube lines low, LED dark.
    pub fn initialize(&mut self) -> Result<(), DisplayError> {
        self.led.off();
        self.tube.initialize()
    }

    pub fn led(&self) -> &RgbLed {
        &self.led
    }

    pub fn tube(&self) -> &BcdDecoder<P> {
        &self.tube
    }
}

impl<P: OutputPin> LedPort for HardwareAdapter<P> {
    fn set_led(&mut self, colour: Rgba) {
        self.led.set(colour);
    }
}

impl<P: OutputPin> NixieTube for HardwareAdapter<P> {
    fn set_digit(&mut self, digit: Digit) -> Result<(), DisplayError> {
        self.tube.set_digit(digit)
    }

    fn blank(&mut self) -> Result<(), DisplayError> {
        self.tube.blank()
    }
}
