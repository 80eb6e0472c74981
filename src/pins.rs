//! GPIO / peripheral pin assignments for the clock main board (ESP32).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Nixie tube (BCD lines into 74141 / K155ID1 decoder)
// ---------------------------------------------------------------------------

/// BCD weight 1.
pub const BCD_A_GPIO: i32 = 25;
/// BCD weight 2.
pub const BCD_B_GPIO: i32 = 26;
/// BCD weight 4.
pub const BCD_C_GPIO: i32 = 27;
/// BCD weight 8.
pub const BCD_D_GPIO: i32 = 14;

/// Lines in weight order 1, 2, 4, 8.
pub const BCD_GPIOS: [i32; 4] = [BCD_A_GPIO, BCD_B_GPIO, BCD_C_GPIO, BCD_D_GPIO];

// ---------------------------------------------------------------------------
// Ambient RGB LED (LEDC PWM)
// ---------------------------------------------------------------------------

pub const LED_R_GPIO: i32 = 16;
pub const LED_G_GPIO: i32 = 17;
pub const LED_B_GPIO: i32 = 18;

/// PWM frequency for the LED channels.
pub const LED_PWM_FREQ_HZ: u32 = 5_000;

// ---------------------------------------------------------------------------
// DS3231 real-time clock
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
pub const I2C_FREQ_HZ: u32 = 100_000;

/// Open-drain 1 Hz square wave from the RTC.  Needs the internal pull-up;
/// counted on the falling edge.
pub const RTC_SQW_GPIO: i32 = 4;
