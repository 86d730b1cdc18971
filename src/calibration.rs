//! Flex-sensor calibration: the most-bent reading of every finger over a fixed window.
//!
//! A run is [`HandConfig::calibration_iterations`](crate::HandConfig) iterations, each one
//! sensor sweep paced by a 1 ms wait, so about 10 s with the defaults. See [`Calibrator`].

use embedded_hal::delay::DelayNs;

use crate::config::HandConfig;
use crate::finger::Finger;
use crate::sensor::FingerSensors;
use crate::Result;

/// The lowest valid (non-zero) sensor code seen per finger. Lower codes mean more bend.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationVector([u8; Finger::COUNT]);

impl CalibrationVector {
    /// Nothing recorded yet: every entry at the highest code.
    pub const UNSET: Self = Self([u8::MAX; Finger::COUNT]);

    /// Lowest code recorded for `finger`.
    #[must_use]
    pub const fn get(&self, finger: Finger) -> u8 {
        self.0[finger.index()]
    }

    /// Minimum codes, Thumb first.
    #[must_use]
    pub const fn as_array(&self) -> &[u8; Finger::COUNT] {
        &self.0
    }

    /// Fold one sweep of raw codes in. An entry only ever decreases; a zero code is
    /// treated as a disconnected sensor and ignored.
    pub fn record(&mut self, raw: &[u8; Finger::COUNT]) {
        for (minimum, &code) in self.0.iter_mut().zip(raw) {
            if code > 0 && code < *minimum {
                *minimum = code;
            }
        }
    }
}

impl Default for CalibrationVector {
    fn default() -> Self {
        Self::UNSET
    }
}

/// Where a calibration run stands after one iteration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationProgress {
    /// An ordinary iteration.
    Sampling { iteration: u16 },
    /// A progress point (every 1,000th iteration by default). The controller beeps short.
    Milestone { iteration: u16 },
    /// The last iteration. The counter is back at zero and the vector is final.
    Finished,
}

/// Runs calibration one iteration at a time so the control loop stays in charge.
///
/// # Example
///
/// ```rust
/// use hand_envoy::calibration::{CalibrationProgress, Calibrator};
///
/// let mut calibrator = Calibrator::new(3, 2);
/// assert_eq!(calibrator.record(&[200, 180, 90, 0, 255]), CalibrationProgress::Sampling { iteration: 1 });
/// assert_eq!(calibrator.record(&[150, 190, 95, 40, 255]), CalibrationProgress::Milestone { iteration: 2 });
/// assert_eq!(calibrator.record(&[160, 170, 99, 50, 255]), CalibrationProgress::Finished);
/// assert_eq!(calibrator.vector().as_array(), &[150, 170, 90, 40, 255]);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Calibrator {
    vector: CalibrationVector,
    iteration: u16,
    iterations: u16,
    progress_interval: u16,
    pace_us: u32,
}

impl Calibrator {
    /// A calibrator of `iterations` iterations with a milestone every `progress_interval`.
    /// Pacing defaults to 1 ms per iteration.
    #[must_use]
    pub const fn new(iterations: u16, progress_interval: u16) -> Self {
        Self {
            vector: CalibrationVector::UNSET,
            iteration: 0,
            iterations,
            progress_interval,
            pace_us: crate::config::CALIBRATION_PACE_US_DEFAULT,
        }
    }

    /// A calibrator with the iteration count and progress interval from `config`.
    #[must_use]
    pub const fn from_config(config: &HandConfig) -> Self {
        Self {
            vector: CalibrationVector::UNSET,
            iteration: 0,
            iterations: config.calibration_iterations,
            progress_interval: config.calibration_progress_interval,
            pace_us: config.calibration_pace_us,
        }
    }

    /// Forget everything recorded and start a fresh run.
    pub fn restart(&mut self) {
        self.vector = CalibrationVector::UNSET;
        self.iteration = 0;
    }

    /// Minimums recorded so far. After [`CalibrationProgress::Finished`], the result of the run.
    #[must_use]
    pub const fn vector(&self) -> &CalibrationVector {
        &self.vector
    }

    /// Iterations completed in the current run.
    #[must_use]
    pub const fn iteration(&self) -> u16 {
        self.iteration
    }

    /// Iterations in one run.
    #[must_use]
    pub const fn iterations(&self) -> u16 {
        self.iterations
    }

    /// Fold one sweep in and advance the iteration counter.
    pub fn record(&mut self, raw: &[u8; Finger::COUNT]) -> CalibrationProgress {
        self.vector.record(raw);
        self.iteration = self.iteration.saturating_add(1);

        if self.iteration >= self.iterations {
            self.iteration = 0;
            info!("calibration finished: {}", self.vector.as_array());
            return CalibrationProgress::Finished;
        }
        if self.progress_interval > 0 && self.iteration % self.progress_interval == 0 {
            debug!("calibration {}/{}", self.iteration, self.iterations);
            return CalibrationProgress::Milestone {
                iteration: self.iteration,
            };
        }
        CalibrationProgress::Sampling {
            iteration: self.iteration,
        }
    }

    /// One paced iteration: sweep the sensors, record, then wait out the pace.
    ///
    /// # Errors
    ///
    /// Propagates a sensor failure. The iteration is not counted in that case.
    pub fn iterate<S, D>(&mut self, sensors: &mut S, delay: &mut D) -> Result<CalibrationProgress>
    where
        S: FingerSensors,
        D: DelayNs,
    {
        let raw = sensors.read_all()?;
        let progress = self.record(&raw);
        delay.delay_us(self.pace_us);
        Ok(progress)
    }
}
