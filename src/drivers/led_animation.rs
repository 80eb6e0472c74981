//! LED animation engine.
//!
//! Turns the configured [`LedInfo`] into the colour actually shown on the
//! ambient RGB LED.  The main loop calls [`LedAnimator::update`] once per
//! animation frame and pushes [`LedAnimator::output`] to the LED driver.
//!
//! ## Modes
//!
//! | Mode    | Rendered output                                        |
//! |---------|--------------------------------------------------------|
//! | Off     | configured colour at zero intensity                    |
//! | On      | configured colour at configured alpha, every frame     |
//! | Breathe | alpha ramps 0 → A → 0 one step per frame, colour fixed |
//!
//! With the default 4 ms frame a ramp at A = 255 takes about one second
//! each way.

use crate::config::{LedInfo, LedMode};

/// Colour plus intensity, each 0–255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Self = Self::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Per-channel PWM duty: each channel scaled by alpha.
    pub fn duty(self) -> (u8, u8, u8) {
        let scale = |c: u8| ((u16::from(c) * u16::from(self.a)) / 255) as u8;
        (scale(self.r), scale(self.g), scale(self.b))
    }
}

/// Breathe direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ramp {
    Up,
    Down,
}

/// Animation state machine.  Stack-allocated, main-loop only.
#[derive(Debug, Clone)]
pub struct LedAnimator {
    info: LedInfo,
    level: u8,
    ramp: Ramp,
}

impl Default for LedAnimator {
    fn default() -> Self {
        Self::new(LedInfo::default())
    }
}

impl LedAnimator {
    pub fn new(info: LedInfo) -> Self {
        Self {
            info,
            level: 0,
            ramp: Ramp::Up,
        }
    }

    /// Replace the configuration and restart the animation.
    pub fn set_configuration(&mut self, info: LedInfo) {
        self.info = info;
        self.reset();
    }

    pub fn configuration(&self) -> LedInfo {
        self.info
    }

    /// Restart the breathe cycle from dark, ramping up.  The stored
    /// configuration is untouched.
    pub fn reset(&mut self) {
        self.level = 0;
        self.ramp = Ramp::Up;
    }

    /// Advance one animation frame.
    pub fn update(&mut self) {
        if self.info.mode != LedMode::Breathe {
            return;
        }
        let ceiling = self.info.a;
        if ceiling == 0 {
            self.level = 0;
            return;
        }
        match self.ramp {
            Ramp::Up => {
                self.level = self.level.saturating_add(1).min(ceiling);
                if self.level == ceiling {
                    self.ramp = Ramp::Down;
                }
            }
            Ramp::Down => {
                self.level = self.level.saturating_sub(1);
                if self.level == 0 {
                    self.ramp = Ramp::Up;
                }
            }
        }
    }

    /// The colour to show right now.
    pub fn output(&self) -> Rgba {
        let LedInfo { r, g, b, a, mode } = self.info;
        match mode {
            LedMode::Off => Rgba::new(r, g, b, 0),
            LedMode::On => Rgba::new(r, g, b, a),
            LedMode::Breathe => Rgba::new(r, g, b, self.level),
        }
    }

    /// Current breathe level (0 outside breathe mode after a reset).
    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn ramp(&self) -> Ramp {
        self.ramp
    }
}
