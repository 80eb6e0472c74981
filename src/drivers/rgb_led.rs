//! Ambient RGB LED driver.
//!
//! Three LEDC PWM channels drive a common-cathode RGB LED.  The rendered
//! [`Rgba`] is scaled by alpha into per-channel duty.
//!
//! On host targets only the last colour is tracked.

use crate::drivers::hw_init;
use crate::drivers::led_animation::Rgba;

#[derive(Debug, Default)]
pub struct RgbLed {
    current: Rgba,
}

impl RgbLed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skips the LEDC writes when `colour` is already showing.
    pub fn set(&mut self, colour: Rgba) {
        if colour != self.current {
            self.write(colour);
        }
    }

    /// Always writes, whatever the channels held before.
    pub fn off(&mut self) {
        self.write(Rgba::BLACK);
    }

    pub fn current(&self) -> Rgba {
        self.current
    }

    fn write(&mut self, colour: Rgba) {
        let (r, g, b) = colour.duty();
        hw_init::ledc_set(hw_init::LEDC_CH_LED_R, r);
        hw_init::ledc_set(hw_init::LEDC_CH_LED_G, g);
        hw_init::ledc_set(hw_init::LEDC_CH_LED_B, b);
        self.current = colour;
    }
}
