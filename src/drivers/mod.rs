//! Output drivers, hardware initialisation and timing sources.

pub mod bcd_decoder;
pub mod hw_init;
pub mod hw_timer;
pub mod led_animation;
pub mod rgb_led;
pub mod watchdog;
