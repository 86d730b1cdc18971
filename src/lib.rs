//! Control core for a five-finger robotic hand driven by hobby servos.
//!
//! A [`Hand`] owns five servo lines, a beeper, one button and the flex-sensor service. Each
//! call to [`Hand::step`] runs one loop iteration: the active mode writes the finger
//! positions, [`ServoFrame`](servo::ServoFrame) pulses every servo inside a fixed 20 ms frame,
//! and the [`ModeMachine`](mode::ModeMachine) samples the button to decide the next frame's
//! mode.
//!
//! # Modes
//!
//! | Index | Mode | What the hand does |
//! | ----- | ---- | ------------------ |
//! | 0 | [`Mode::GloveMatch`] | Mirrors the flex-sensor glove (committing it also runs calibration) |
//! | 1 | [`Mode::GestureCycle`] | Short presses step through the nine [`Gesture`]s |
//! | 2 | [`Mode::DemoWave`] | Beckons with the index finger |
//!
//! Hold the button for about 400 ms to enter mode select. The finger matching the tentative
//! mode closes; short presses advance it. Hold again to commit.
//!
//! # Glossary
//!
//! - **Frame:** one 20 ms servo refresh: five back-to-back pulses and one idle wait.
//! - **Long press:** the button held for [`HandConfig::long_press_frames`] consecutive frames.
//! - **Calibration:** a 10 s window that records the most-bent reading of every flex sensor.
//!
//! # Features
//!
//! - `host` (default): builds with `std` and adds the [`sim`] harness for tests.
//! - `pico1` / `pico2`: the [`board`] binding for Raspberry Pi Pico boards.
//! - `defmt`: logging through `defmt` and `defmt-rtt`.
//! - `embedded`: `defmt` + `pico1` + `arm`, the usual firmware build. Turn off the default
//!   features with it (`--no-default-features --features embedded`) so the crate is `no_std`.
#![cfg_attr(not(feature = "host"), no_std)]

// Compile-time checks: a board or the host harness must be selected
#[cfg(not(any(feature = "pico1", feature = "pico2", feature = "host")))]
compile_error!("Must enable a board feature ('pico1' or 'pico2') or the 'host' feature");

#[cfg(all(feature = "pico1", feature = "pico2"))]
compile_error!("Cannot enable both 'pico1' and 'pico2' features simultaneously");

// Must come first so the logging macros are visible to every module below.
#[macro_use]
mod fmt;

pub mod beeper;
#[cfg(any(feature = "pico1", feature = "pico2"))]
pub mod board;
pub mod button;
pub mod calibration;
pub mod config;
pub mod demo_wave;
mod error;
pub mod finger;
pub mod gesture;
pub mod glove;
pub mod hand;
pub mod mode;
pub mod sensor;
pub mod servo;
#[cfg(feature = "host")]
pub mod sim;

// Re-export error types and result (used throughout)
pub use crate::error::{Error, Result};

pub use crate::config::HandConfig;
pub use crate::finger::{Finger, FingerPositions, Position};
pub use crate::gesture::Gesture;
pub use crate::hand::{Hand, HandParts, HandStep};
pub use crate::mode::Mode;
pub use crate::sensor::FingerSensors;
