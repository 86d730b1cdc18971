//! Tunable values of the hand, with the measured defaults.
//!
//! See [`HandConfig`].

use crate::beeper::Tone;
use crate::button::PressedTo;
use crate::finger::Finger;
use crate::servo::{FrameTiming, PulsePolarity};
use crate::{Error, Result};

/// Default number of selectable modes (glove, gestures, demo wave).
pub const MODE_COUNT_DEFAULT: u8 = 3;

/// Default long-press length in frames (~400 ms at 20 ms per frame).
pub const LONG_PRESS_FRAMES_DEFAULT: u16 = 20;

/// Default calibration length in iterations (~10 s at 1 ms per iteration).
pub const CALIBRATION_ITERATIONS_DEFAULT: u16 = 10_000;

/// Default iterations between calibration progress beeps.
pub const CALIBRATION_PROGRESS_INTERVAL_DEFAULT: u16 = 1_000;

/// Default pacing of one calibration iteration (microseconds).
pub const CALIBRATION_PACE_US_DEFAULT: u32 = 1_000;

/// Default index-finger step of the demo wave per frame.
pub const WAVE_STEP_DEFAULT: u8 = 5;

/// Configuration of a [`Hand`](crate::Hand).
///
/// Start from [`HandConfig::new`] (the values measured on the hand) and override with the
/// `with_*` methods.
///
/// # Example
///
/// ```rust
/// use hand_envoy::HandConfig;
///
/// const CONFIG: HandConfig = HandConfig::new()
///     .with_censor_middle(true)
///     .with_long_press_frames(25);
///
/// assert!(CONFIG.validate().is_ok());
/// assert!(HandConfig::new().with_mode_count(0).validate().is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HandConfig {
    /// Number of modes cycled in mode select. Each mode is shown on one finger, so at most
    /// [`Finger::COUNT`].
    pub mode_count: u8,
    /// Consecutive held frames that make a long press.
    pub long_press_frames: u16,
    /// Servo frame timing.
    pub timing: FrameTiming,
    /// Which pulse width means a closed finger.
    pub polarity: PulsePolarity,
    /// Pull an isolated middle finger back in line with the others in glove mode.
    pub censor_middle: bool,
    /// Stretch glove readings using the last calibration.
    pub apply_calibration: bool,
    /// Iterations in one calibration run.
    pub calibration_iterations: u16,
    /// Iterations between calibration progress beeps.
    pub calibration_progress_interval: u16,
    /// Pacing of one calibration iteration (microseconds).
    pub calibration_pace_us: u32,
    /// Index-finger step of the demo wave per frame.
    pub wave_step: u8,
    /// Button wiring.
    pub pressed_to: PressedTo,
    /// Tone of the short (select, progress) beep.
    pub short_beep: Tone,
    /// Tone of the long (commit, calibration done) beep.
    pub long_beep: Tone,
}

impl HandConfig {
    /// The values measured on the hand.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mode_count: MODE_COUNT_DEFAULT,
            long_press_frames: LONG_PRESS_FRAMES_DEFAULT,
            timing: FrameTiming::SG90,
            polarity: PulsePolarity::ClosedShort,
            censor_middle: false,
            apply_calibration: false,
            calibration_iterations: CALIBRATION_ITERATIONS_DEFAULT,
            calibration_progress_interval: CALIBRATION_PROGRESS_INTERVAL_DEFAULT,
            calibration_pace_us: CALIBRATION_PACE_US_DEFAULT,
            wave_step: WAVE_STEP_DEFAULT,
            pressed_to: PressedTo::Ground,
            short_beep: Tone::SHORT,
            long_beep: Tone::LONG,
        }
    }

    /// Number of selectable modes (1 to 5).
    #[must_use]
    pub const fn with_mode_count(mut self, mode_count: u8) -> Self {
        self.mode_count = mode_count;
        self
    }

    /// Frames the button must be held for a long press.
    #[must_use]
    pub const fn with_long_press_frames(mut self, long_press_frames: u16) -> Self {
        self.long_press_frames = long_press_frames;
        self
    }

    /// Servo frame timing.
    #[must_use]
    pub const fn with_timing(mut self, timing: FrameTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Which pulse end closes a finger.
    #[must_use]
    pub const fn with_polarity(mut self, polarity: PulsePolarity) -> Self {
        self.polarity = polarity;
        self
    }

    /// Pull a lone raised middle finger back in glove mode.
    #[must_use]
    pub const fn with_censor_middle(mut self, censor_middle: bool) -> Self {
        self.censor_middle = censor_middle;
        self
    }

    /// Stretch glove readings with the calibration vector.
    #[must_use]
    pub const fn with_apply_calibration(mut self, apply_calibration: bool) -> Self {
        self.apply_calibration = apply_calibration;
        self
    }

    /// Set the calibration length and the spacing of its progress beeps.
    #[must_use]
    pub const fn with_calibration(mut self, iterations: u16, progress_interval: u16) -> Self {
        self.calibration_iterations = iterations;
        self.calibration_progress_interval = progress_interval;
        self
    }

    /// Wait after each calibration iteration.
    #[must_use]
    pub const fn with_calibration_pace_us(mut self, pace_us: u32) -> Self {
        self.calibration_pace_us = pace_us;
        self
    }

    /// Per-frame step of the beckoning finger.
    #[must_use]
    pub const fn with_wave_step(mut self, wave_step: u8) -> Self {
        self.wave_step = wave_step;
        self
    }

    /// Button wiring.
    #[must_use]
    pub const fn with_pressed_to(mut self, pressed_to: PressedTo) -> Self {
        self.pressed_to = pressed_to;
        self
    }

    /// Tones for the short and long feedback beeps.
    #[must_use]
    pub const fn with_beeps(mut self, short_beep: Tone, long_beep: Tone) -> Self {
        self.short_beep = short_beep;
        self.long_beep = long_beep;
        self
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first offending value.
    pub const fn validate(&self) -> Result<()> {
        if self.mode_count == 0 || self.mode_count as usize > Finger::COUNT {
            return Err(Error::InvalidConfig("mode_count must be in 1..=5"));
        }
        if self.long_press_frames == 0 {
            return Err(Error::InvalidConfig("long_press_frames must be positive"));
        }
        if self.calibration_iterations == 0 {
            return Err(Error::InvalidConfig("calibration_iterations must be positive"));
        }
        if self.calibration_progress_interval == 0 {
            return Err(Error::InvalidConfig(
                "calibration_progress_interval must be positive",
            ));
        }
        if self.wave_step == 0 {
            return Err(Error::InvalidConfig("wave_step must be positive"));
        }
        if self.timing.frame_period_us == 0 {
            return Err(Error::InvalidConfig("frame_period_us must be positive"));
        }
        Ok(())
    }
}

impl Default for HandConfig {
    fn default() -> Self {
        Self::new()
    }
}
