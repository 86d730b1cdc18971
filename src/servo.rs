//! Software-timed pulse generation for five SG90-class hobby servos.
//!
//! Every frame, each servo line is raised in turn (Thumb → Pinkie) for a pulse whose width
//! encodes the finger position, then the loop idles out the remainder of the 20 ms frame.
//! See [`ServoFrame`] for usage and [`FrameReport::plan`] for the timing arithmetic.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::finger::{Finger, FingerPositions, Position};
use crate::{Error, Result};

/// Servo refresh period (microseconds).
pub const SERVO_PERIOD_US: u32 = 20_000; // 20 ms

/// Time the rest of the loop spends per frame outside of pulses and idle (microseconds).
pub const SERVO_OVERHEAD_US_DEFAULT: u32 = 2_500;

/// Pulse width for the end of travel nearest zero (microseconds).
pub const SERVO_MIN_US_DEFAULT: u32 = 540;

/// Pulse width added per position unit (microseconds). 255 units span 1.53 ms.
pub const SERVO_STEP_US_DEFAULT: u32 = 6;

/// Fixed timing budget of one servo frame.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameTiming {
    /// Whole frame, pulses plus idle plus overhead.
    pub frame_period_us: u32,
    /// Execution time of the non-pulse code, subtracted from the idle wait.
    pub overhead_us: u32,
    /// Shortest pulse.
    pub min_pulse_us: u32,
    /// Pulse increment per position unit.
    pub step_us: u32,
}

impl FrameTiming {
    /// SG90 timings measured on the hand: 0.54 ms to 2.07 ms inside a 20 ms frame.
    pub const SG90: Self = Self {
        frame_period_us: SERVO_PERIOD_US,
        overhead_us: SERVO_OVERHEAD_US_DEFAULT,
        min_pulse_us: SERVO_MIN_US_DEFAULT,
        step_us: SERVO_STEP_US_DEFAULT,
    };

    /// Longest pulse, reached 255 units away from the minimum.
    #[must_use]
    pub const fn max_pulse_us(&self) -> u32 {
        self.min_pulse_us
            .saturating_add(self.step_us.saturating_mul(Position::MAX as u32))
    }

    /// Time left for pulses and idle once the overhead is taken out.
    #[must_use]
    pub const fn budget_us(&self) -> u32 {
        self.frame_period_us.saturating_sub(self.overhead_us)
    }
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::SG90
    }
}

/// Which end of a servo's travel corresponds to a closed finger.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PulsePolarity {
    /// A closed finger gets the shortest pulse: `min + step * (255 - p)`.
    #[default]
    ClosedShort,
    /// A closed finger gets the longest pulse: `min + step * p`. For mirrored servo horns.
    ClosedLong,
}

/// Pulse width for one position.
///
/// Strictly monotonic in `position` and bounded to
/// `[timing.min_pulse_us, timing.max_pulse_us()]`.
#[must_use]
pub const fn on_time_us(position: Position, timing: &FrameTiming, polarity: PulsePolarity) -> u32 {
    let units = match polarity {
        PulsePolarity::ClosedShort => (Position::MAX - position) as u32,
        PulsePolarity::ClosedLong => position as u32,
    };
    timing
        .min_pulse_us
        .saturating_add(timing.step_us.saturating_mul(units))
}

/// Timing of one frame: the five pulse widths and the idle wait that follows them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameReport {
    /// Pulse width per channel, Thumb first.
    pub on_times_us: [u32; Finger::COUNT],
    /// Wait after the last pulse.
    pub idle_us: u32,
    /// The pulses alone exceeded the budget, so the idle wait was floored at zero and the
    /// frame runs long.
    pub clamped: bool,
}

impl FrameReport {
    /// Compute the pulse widths and idle wait for `positions`.
    ///
    /// `idle = frame_period - overhead - Σ on_time`, floored at zero. Whenever the floor is
    /// not hit, `Σ on_time + idle + overhead == frame_period`.
    #[must_use]
    pub fn plan(positions: &FingerPositions, timing: &FrameTiming, polarity: PulsePolarity) -> Self {
        let on_times_us = (*positions.as_array()).map(|position| on_time_us(position, timing, polarity));
        let pulses_us = on_times_us
            .iter()
            .fold(0_u32, |total, on_time| total.saturating_add(*on_time));
        let (idle_us, clamped) = match timing.budget_us().checked_sub(pulses_us) {
            Some(idle_us) => (idle_us, false),
            None => (0, true),
        };
        Self {
            on_times_us,
            idle_us,
            clamped,
        }
    }

    /// Sum of the five pulse widths.
    #[must_use]
    pub fn pulses_us(&self) -> u32 {
        self.on_times_us.iter().sum()
    }
}

/// Drives the five servo lines of the hand, one frame per [`run`](Self::run).
///
/// All five lines share one pin type. Pulses never overlap: a line is driven low before the
/// next one is raised.
///
/// # Example
///
/// ```rust
/// use hand_envoy::FingerPositions;
/// use hand_envoy::servo::{FrameTiming, PulsePolarity, ServoFrame};
/// use hand_envoy::sim::{Line, SimPin, Timeline, VirtualClock};
/// use hand_envoy::Finger;
///
/// # fn main() -> hand_envoy::Result<()> {
/// let timeline = Timeline::new();
/// let pins = Finger::ALL.map(|finger| SimPin::new(&timeline, Line::Servo(finger)));
/// let mut servo_frame = ServoFrame::new(pins, FrameTiming::SG90, PulsePolarity::ClosedShort)?;
/// let mut clock = VirtualClock::new(&timeline);
///
/// let report = servo_frame.run(&FingerPositions::OPEN, &mut clock)?;
/// assert_eq!(report.on_times_us, [2070; 5]);
/// assert_eq!(timeline.now_us(), 17_500);
/// # Ok(())
/// # }
/// ```
pub struct ServoFrame<P: OutputPin> {
    pins: [P; Finger::COUNT],
    timing: FrameTiming,
    polarity: PulsePolarity,
}

impl<P: OutputPin> ServoFrame<P> {
    /// Take ownership of the servo lines (Thumb first) and drive them all low.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DigitalIo`] if a line cannot be driven low.
    pub fn new(mut pins: [P; Finger::COUNT], timing: FrameTiming, polarity: PulsePolarity) -> Result<Self> {
        for pin in &mut pins {
            pin.set_low().map_err(|_| Error::DigitalIo)?;
        }
        info!(
            "servo frame period={}us min={}us step={}us",
            timing.frame_period_us,
            timing.min_pulse_us,
            timing.step_us
        );
        Ok(Self {
            pins,
            timing,
            polarity,
        })
    }

    /// Frame timing this scheduler was built with.
    #[must_use]
    pub const fn timing(&self) -> &FrameTiming {
        &self.timing
    }

    /// Which pulse end means closed.
    #[must_use]
    pub const fn polarity(&self) -> PulsePolarity {
        self.polarity
    }

    /// Pulse every servo once from `positions`, then wait out the rest of the frame.
    ///
    /// Blocks for the whole frame (minus the overhead budget).
    ///
    /// # Errors
    ///
    /// Returns [`Error::DigitalIo`] if a line fails. The frame still runs to completion so
    /// the timing of the remaining channels is kept.
    pub fn run<D: DelayNs>(&mut self, positions: &FingerPositions, delay: &mut D) -> Result<FrameReport> {
        let report = FrameReport::plan(positions, &self.timing, self.polarity);

        let mut outcome = Ok(());
        for (pin, on_time_us) in self.pins.iter_mut().zip(report.on_times_us) {
            let pulsed = pulse(pin, on_time_us, delay);
            outcome = outcome.and(pulsed);
        }

        if report.clamped {
            warn!(
                "servo frame over budget: pulses={}us budget={}us",
                report.pulses_us(),
                self.timing.budget_us()
            );
        }
        delay.delay_us(report.idle_us);

        outcome.map(|()| report)
    }
}

/// Raise `pin` for `on_time_us`. The line is always driven low again, even if raising failed.
fn pulse<P: OutputPin, D: DelayNs>(pin: &mut P, on_time_us: u32, delay: &mut D) -> Result<()> {
    let raised = pin.set_high();
    delay.delay_us(on_time_us);
    let lowered = pin.set_low();
    raised.and(lowered).map_err(|_| Error::DigitalIo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_time_spans_the_sg90_range() {
        let timing = FrameTiming::SG90;
        assert_eq!(on_time_us(255, &timing, PulsePolarity::ClosedShort), 540);
        assert_eq!(on_time_us(0, &timing, PulsePolarity::ClosedShort), 2_070);
        assert_eq!(on_time_us(0, &timing, PulsePolarity::ClosedLong), 540);
        assert_eq!(on_time_us(255, &timing, PulsePolarity::ClosedLong), 2_070);
        assert_eq!(timing.max_pulse_us(), 2_070);
    }

    #[test]
    fn on_time_is_strictly_monotonic() {
        let timing = FrameTiming::SG90;
        for position in 0..Position::MAX {
            let here = on_time_us(position, &timing, PulsePolarity::ClosedShort);
            let next = on_time_us(position + 1, &timing, PulsePolarity::ClosedShort);
            assert!(next < here, "ClosedShort must shrink at {position}");

            let here = on_time_us(position, &timing, PulsePolarity::ClosedLong);
            let next = on_time_us(position + 1, &timing, PulsePolarity::ClosedLong);
            assert!(next > here, "ClosedLong must grow at {position}");
        }
    }

    #[test]
    fn open_hand_fills_the_frame_exactly() {
        let timing = FrameTiming::SG90;
        let report = FrameReport::plan(&FingerPositions::OPEN, &timing, PulsePolarity::ClosedShort);
        assert!(!report.clamped);
        assert_eq!(report.pulses_us(), 5 * 2_070);
        assert_eq!(report.idle_us, 20_000 - 2_500 - 5 * 2_070);
        assert_eq!(
            report.pulses_us() + report.idle_us + timing.overhead_us,
            timing.frame_period_us
        );
    }

    #[test]
    fn idle_is_floored_at_zero_when_pulses_overrun() {
        let timing = FrameTiming {
            frame_period_us: 10_000,
            ..FrameTiming::SG90
        };
        let report = FrameReport::plan(&FingerPositions::OPEN, &timing, PulsePolarity::ClosedShort);
        assert!(report.clamped);
        assert_eq!(report.idle_us, 0);
    }
}
