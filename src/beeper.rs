//! A piezo beeper toggled in software for operator feedback.
//!
//! See [`Beeper`].

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::{Error, Result};

/// A square-wave tone: the line is toggled every `half_period_us` for `cycles` full periods.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tone {
    /// High (and low) time of one period (microseconds).
    pub half_period_us: u32,
    /// Number of full periods.
    pub cycles: u16,
}

impl Tone {
    /// 2 kHz for 20 ms. Mode-select entry and calibration progress.
    pub const SHORT: Self = Self {
        half_period_us: 250,
        cycles: 40,
    };

    /// 2 kHz for 100 ms. Mode commit and calibration done.
    pub const LONG: Self = Self {
        half_period_us: 250,
        cycles: 200,
    };

    /// Total time the tone blocks the loop (microseconds).
    #[must_use]
    pub const fn duration_us(&self) -> u32 {
        self.half_period_us
            .saturating_mul(2)
            .saturating_mul(self.cycles as u32)
    }
}

/// Which feedback beep to play.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Beep {
    /// Entering mode select, and calibration progress.
    Short,
    /// Committing a mode, and calibration done.
    Long,
}

/// Plays [`Beep`]s on one output line.
///
/// Beeping blocks: the servo lines are idle while a tone plays, which stretches the current
/// frame. Beeps only happen on transitions, so the stretch is rare.
///
/// # Example
///
/// ```rust
/// use hand_envoy::beeper::{Beep, Beeper, Tone};
/// use hand_envoy::sim::{Line, SimPin, Timeline, VirtualClock};
///
/// # fn main() -> hand_envoy::Result<()> {
/// let timeline = Timeline::new();
/// let mut beeper = Beeper::new(SimPin::new(&timeline, Line::Beeper), Tone::SHORT, Tone::LONG)?;
/// let mut clock = VirtualClock::new(&timeline);
///
/// beeper.beep(Beep::Short, &mut clock)?;
/// assert_eq!(timeline.pulses(Line::Beeper).len(), 40);
/// assert_eq!(timeline.now_us(), 20_000);
/// # Ok(())
/// # }
/// ```
pub struct Beeper<P: OutputPin> {
    pin: P,
    short: Tone,
    long: Tone,
}

impl<P: OutputPin> Beeper<P> {
    /// Take the beeper line and drive it low.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DigitalIo`] if the line cannot be driven low.
    pub fn new(mut pin: P, short: Tone, long: Tone) -> Result<Self> {
        pin.set_low().map_err(|_| Error::DigitalIo)?;
        Ok(Self { pin, short, long })
    }

    /// The tone played for `beep`.
    #[must_use]
    pub const fn tone(&self, beep: Beep) -> Tone {
        match beep {
            Beep::Short => self.short,
            Beep::Long => self.long,
        }
    }

    /// Play `beep` to completion. The line is left low.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DigitalIo`] if the line fails. The tone still plays out its full
    /// length.
    pub fn beep<D: DelayNs>(&mut self, beep: Beep, delay: &mut D) -> Result<()> {
        let tone = self.tone(beep);
        debug!("beep half_period={}us cycles={}", tone.half_period_us, tone.cycles);

        let mut outcome = Ok(());
        for _ in 0..tone.cycles {
            let raised = self.pin.set_high();
            delay.delay_us(tone.half_period_us);
            let lowered = self.pin.set_low();
            delay.delay_us(tone.half_period_us);
            outcome = outcome.and(raised).and(lowered);
        }
        outcome.map_err(|_| Error::DigitalIo)
    }
}
