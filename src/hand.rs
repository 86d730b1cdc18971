//! The hand controller: one owned aggregate stepped once per frame.
//!
//! See [`Hand`] for the loop and [`HandParts`] for the hardware it takes.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::beeper::{Beep, Beeper};
use crate::button::Button;
use crate::calibration::{CalibrationProgress, CalibrationVector, Calibrator};
use crate::config::HandConfig;
use crate::demo_wave::DemoWave;
use crate::finger::{Finger, FingerPositions};
use crate::gesture::{Gesture, GestureCycler};
use crate::glove::GloveMapper;
use crate::mode::{Mode, ModeEvent, ModeMachine};
use crate::sensor::FingerSensors;
use crate::servo::{FrameReport, ServoFrame};
use crate::Result;

/// The hardware services a [`Hand`] takes ownership of.
pub struct HandParts<P, Q, B, S> {
    /// Servo lines, Thumb first.
    pub servos: [P; Finger::COUNT],
    /// Piezo beeper line.
    pub beeper: Q,
    /// Operator button line.
    pub button: B,
    /// Flex-sensor service.
    pub sensors: S,
}

/// What one call to [`Hand::step`] did.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandStep {
    /// A servo frame ran with `mode` active. `event` is the transition the button caused at
    /// the end of the frame.
    Frame {
        /// Mode that wrote the positions.
        mode: Mode,
        /// Pulse widths and idle time of the frame.
        report: FrameReport,
        /// Button outcome.
        event: ModeEvent,
    },
    /// A calibration iteration ran instead of a servo frame.
    Calibration(CalibrationProgress),
}

/// The robotic hand.
///
/// Owns the finger positions, every mode's state and the hardware. Each [`step`](Self::step)
/// is one iteration of the control loop:
///
/// 1. Outside mode select, the active mode writes the positions. Gesture mode only writes on
///    the frame a tap advances it, so a commit leaves the hand open until the first tap.
/// 2. Every servo is pulsed once and the rest of the 20 ms frame is idled out.
/// 3. The button is sampled and the mode machine decides the next frame's mode. In gesture
///    mode the same sample steps the gesture cycler.
///
/// While a calibration run is active, a step is one 1 ms calibration iteration instead and
/// the servos get no pulses.
///
/// # Example
///
/// ```rust
/// use hand_envoy::hand::HandStep;
/// use hand_envoy::sim::SimRig;
/// use hand_envoy::{FingerPositions, HandConfig, Mode};
///
/// # fn main() -> hand_envoy::Result<()> {
/// let mut rig = SimRig::new(HandConfig::new())?;
/// rig.sensors.set([255, 255, 255, 255, 0]);
///
/// let step = rig.hand.step()?;
/// assert!(matches!(step, HandStep::Frame { mode: Mode::GloveMatch, .. }));
/// assert_eq!(rig.hand.positions().as_array(), &[0, 0, 0, 0, 255]);
/// assert_eq!(rig.timeline.now_us(), 17_500);
/// # Ok(())
/// # }
/// ```
pub struct Hand<P, Q, B, S, D>
where
    P: OutputPin,
    Q: OutputPin,
    B: InputPin,
    S: FingerSensors,
    D: DelayNs,
{
    servo_frame: ServoFrame<P>,
    beeper: Beeper<Q>,
    button: Button<B>,
    sensors: S,
    delay: D,
    config: HandConfig,
    positions: FingerPositions,
    modes: ModeMachine,
    glove: GloveMapper,
    gestures: GestureCycler,
    wave: DemoWave,
    calibrator: Calibrator,
    calibration: CalibrationVector,
}

impl<P, Q, B, S, D> Hand<P, Q, B, S, D>
where
    P: OutputPin,
    Q: OutputPin,
    B: InputPin,
    S: FingerSensors,
    D: DelayNs,
{
    /// Take the hardware, drive every output low and start in glove mode with an open hand.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`](crate::Error::InvalidConfig) if `config` does not
    /// validate, or [`Error::DigitalIo`](crate::Error::DigitalIo) if an output cannot be
    /// driven low.
    pub fn new(parts: HandParts<P, Q, B, S>, delay: D, config: HandConfig) -> Result<Self> {
        config.validate()?;
        let servo_frame = ServoFrame::new(parts.servos, config.timing, config.polarity)?;
        let beeper = Beeper::new(parts.beeper, config.short_beep, config.long_beep)?;
        info!(
            "hand ready: modes={} long_press={} frames",
            config.mode_count,
            config.long_press_frames
        );
        Ok(Self {
            servo_frame,
            beeper,
            button: Button::new(parts.button, config.pressed_to),
            sensors: parts.sensors,
            delay,
            config,
            positions: FingerPositions::OPEN,
            modes: ModeMachine::new(&config),
            glove: GloveMapper::new(config.censor_middle, config.apply_calibration),
            gestures: GestureCycler::new(),
            wave: DemoWave::new(config.wave_step),
            calibrator: Calibrator::from_config(&config),
            calibration: CalibrationVector::UNSET,
        })
    }

    /// Run one loop iteration.
    ///
    /// # Errors
    ///
    /// Propagates sensor and I/O failures. A failed servo line still lets the frame run to
    /// its full length before the error is returned.
    pub fn step(&mut self) -> Result<HandStep> {
        if self.modes.is_calibrating() {
            return self.calibrate().map(HandStep::Calibration);
        }

        let mode = self.modes.active();
        if !self.modes.in_select() {
            self.produce(mode)?;
        }
        let report = self.servo_frame.run(&self.positions, &mut self.delay)?;

        let pressed = self.button.is_pressed()?;
        let event = self.modes.update(pressed, &mut self.positions);
        self.on_mode_event(event)?;
        if self.modes.active() == Mode::GestureCycle && !self.modes.in_select() {
            let armed = self.modes.button().is_armed();
            self.gestures.update(pressed, armed, &mut self.positions);
        }

        Ok(HandStep::Frame {
            mode,
            report,
            event,
        })
    }

    /// Step forever. Only returns on a failure.
    ///
    /// # Errors
    ///
    /// The first error [`step`](Self::step) reports.
    pub fn run(&mut self) -> Result<Infallible> {
        loop {
            self.step()?;
        }
    }

    /// Positions the next frame pulses (or the last frame pulsed, before the mode writes).
    #[must_use]
    pub const fn positions(&self) -> &FingerPositions {
        &self.positions
    }

    /// Mode and button state.
    #[must_use]
    pub const fn mode_machine(&self) -> &ModeMachine {
        &self.modes
    }

    /// Result of the last completed calibration run. [`CalibrationVector::UNSET`] until one
    /// finishes.
    #[must_use]
    pub const fn calibration(&self) -> &CalibrationVector {
        &self.calibration
    }

    /// The calibration run in progress, if any.
    #[must_use]
    pub const fn calibrator(&self) -> &Calibrator {
        &self.calibrator
    }

    /// Current gesture-mode preset.
    #[must_use]
    pub const fn gesture(&self) -> Gesture {
        self.gestures.current()
    }

    /// Configuration the hand was built with.
    #[must_use]
    pub const fn config(&self) -> &HandConfig {
        &self.config
    }

    /// Let `mode` write this frame's positions.
    fn produce(&mut self, mode: Mode) -> Result<()> {
        match mode {
            Mode::GloveMatch => self
                .glove
                .update(&mut self.sensors, &self.calibration, &mut self.positions)?,
            Mode::DemoWave => self.wave.update(&mut self.positions),
            // Gestures are written by the cycler when a tap lands.
            Mode::GestureCycle | Mode::Idle(_) => {}
        }
        Ok(())
    }

    fn calibrate(&mut self) -> Result<CalibrationProgress> {
        let progress = self.calibrator.iterate(&mut self.sensors, &mut self.delay)?;
        match progress {
            CalibrationProgress::Sampling { .. } => {}
            CalibrationProgress::Milestone { iteration } => {
                info!("calibrating: {} of {}", iteration, self.calibrator.iterations());
                self.beeper.beep(Beep::Short, &mut self.delay)?;
            }
            CalibrationProgress::Finished => {
                self.calibration = *self.calibrator.vector();
                self.modes.finish_calibration();
                self.beeper.beep(Beep::Long, &mut self.delay)?;
            }
        }
        Ok(progress)
    }

    /// Feedback and bookkeeping for a mode transition. A long press never counts as a
    /// gesture tap.
    fn on_mode_event(&mut self, event: ModeEvent) -> Result<()> {
        if event.is_transition() {
            self.gestures.clear_pending();
        }
        match event {
            ModeEvent::None | ModeEvent::Tapped { .. } => Ok(()),
            ModeEvent::EnteredSelect { .. } => self.beeper.beep(Beep::Short, &mut self.delay),
            ModeEvent::Committed { calibrate, .. } => {
                if calibrate {
                    info!("calibration started");
                    self.calibrator.restart();
                }
                self.beeper.beep(Beep::Long, &mut self.delay)
            }
        }
    }
}
