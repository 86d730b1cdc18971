//! Host-side stand-ins for the hand's hardware, for deterministic tests.
//!
//! Everything shares one [`Timeline`]: the [`VirtualClock`] advances it instead of
//! sleeping, and every [`SimPin`] records its level changes on it. Tests can then check
//! exact pulse widths and frame lengths without real time passing.
//!
//! [`SimRig`] wires a complete simulated [`Hand`].

use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, InputPin, OutputPin};

use crate::config::HandConfig;
use crate::finger::Finger;
use crate::hand::{Hand, HandParts, HandStep};
use crate::sensor::FingerSensors;
use crate::{Error, Result};

// ============================================================================
// Timeline
// ============================================================================

/// A simulated output line.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Line {
    /// The servo line of one finger.
    Servo(Finger),
    /// The piezo beeper line.
    Beeper,
}

/// One level change on a [`Line`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Edge {
    /// Line that changed.
    pub line: Line,
    /// New level.
    pub high: bool,
    /// Logical time of the change.
    pub at_ns: u64,
}

/// A completed high period on a [`Line`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Pulse {
    /// Line that pulsed.
    pub line: Line,
    /// Rising edge, in whole microseconds.
    pub start_us: u64,
    /// High time, in whole microseconds.
    pub width_us: u64,
}

#[derive(Debug, Default)]
struct TimelineState {
    now_ns: u64,
    edges: Vec<Edge>,
}

/// Shared logical time plus the log of every recorded edge. Clones share the same log.
///
/// The log lives in memory and only shrinks on [`clear`](Self::clear), so long runs should
/// clear it between phases.
#[derive(Clone, Debug, Default)]
pub struct Timeline(Rc<RefCell<TimelineState>>);

impl Timeline {
    /// Time zero, no edges.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Elapsed logical time.
    #[must_use]
    pub fn now_ns(&self) -> u64 {
        self.0.borrow().now_ns
    }

    /// Elapsed logical time, truncated to whole microseconds.
    #[must_use]
    pub fn now_us(&self) -> u64 {
        self.now_ns() / 1_000
    }

    /// Move time forward by `ns`.
    pub fn advance_ns(&self, ns: u64) {
        let mut state = self.0.borrow_mut();
        state.now_ns = state.now_ns.saturating_add(ns);
    }

    /// Every edge recorded since the last [`clear`](Self::clear), oldest first.
    #[must_use]
    pub fn edges(&self) -> Vec<Edge> {
        self.0.borrow().edges.clone()
    }

    /// Completed pulses on `line`, oldest first.
    #[must_use]
    pub fn pulses(&self, line: Line) -> Vec<Pulse> {
        self.all_pulses()
            .into_iter()
            .filter(|pulse| pulse.line == line)
            .collect()
    }

    /// Completed pulses on every line, in the order they started.
    #[must_use]
    pub fn all_pulses(&self) -> Vec<Pulse> {
        let state = self.0.borrow();
        let mut open: Vec<Edge> = Vec::new();
        let mut pulses = Vec::new();
        for edge in &state.edges {
            if edge.high {
                open.push(*edge);
            } else if let Some(position) = open.iter().position(|rise| rise.line == edge.line) {
                let rise = open.remove(position);
                pulses.push(Pulse {
                    line: rise.line,
                    start_us: rise.at_ns / 1_000,
                    width_us: (edge.at_ns - rise.at_ns) / 1_000,
                });
            }
        }
        pulses.sort_by_key(|pulse| pulse.start_us);
        pulses
    }

    /// Forget the recorded edges. Time keeps running.
    pub fn clear(&self) {
        self.0.borrow_mut().edges.clear();
    }

    fn record(&self, line: Line, high: bool) {
        let mut state = self.0.borrow_mut();
        let at_ns = state.now_ns;
        state.edges.push(Edge { line, high, at_ns });
    }
}

// ============================================================================
// VirtualClock
// ============================================================================

/// A [`DelayNs`] that advances a [`Timeline`] instead of waiting.
#[derive(Clone, Debug)]
pub struct VirtualClock {
    timeline: Timeline,
}

impl VirtualClock {
    /// A clock driving `timeline`.
    #[must_use]
    pub fn new(timeline: &Timeline) -> Self {
        Self {
            timeline: timeline.clone(),
        }
    }
}

impl DelayNs for VirtualClock {
    fn delay_ns(&mut self, ns: u32) {
        self.timeline.advance_ns(u64::from(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.timeline.advance_ns(u64::from(us) * 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.timeline.advance_ns(u64::from(ms) * 1_000_000);
    }
}

// ============================================================================
// SimPin
// ============================================================================

/// An output line that records its level changes on a [`Timeline`].
#[derive(Debug)]
pub struct SimPin {
    timeline: Timeline,
    line: Line,
    high: bool,
    failing: bool,
    stuck_low: bool,
}

impl SimPin {
    /// A working line, starting low.
    #[must_use]
    pub fn new(timeline: &Timeline, line: Line) -> Self {
        Self {
            timeline: timeline.clone(),
            line,
            high: false,
            failing: false,
            stuck_low: false,
        }
    }

    /// A line whose every write reports a fault (and changes nothing).
    #[must_use]
    pub fn failing(timeline: &Timeline, line: Line) -> Self {
        Self {
            failing: true,
            ..Self::new(timeline, line)
        }
    }

    /// A line that can be driven low but reports a fault whenever it is raised.
    #[must_use]
    pub fn stuck_low(timeline: &Timeline, line: Line) -> Self {
        Self {
            stuck_low: true,
            ..Self::new(timeline, line)
        }
    }

    fn drive(&mut self, high: bool) -> core::result::Result<(), ErrorKind> {
        if self.failing || (high && self.stuck_low) {
            return Err(ErrorKind::Other);
        }
        if self.high != high {
            self.high = high;
            self.timeline.record(self.line, high);
        }
        Ok(())
    }
}

impl ErrorType for SimPin {
    type Error = ErrorKind;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        self.drive(false)
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        self.drive(true)
    }
}

// ============================================================================
// SimButton
// ============================================================================

/// A button wired to ground with a pull-up: the line reads low while pressed.
///
/// Clones share one button, so a test can keep a handle after giving one to a [`Hand`].
#[derive(Clone, Debug, Default)]
pub struct SimButton(Rc<Cell<bool>>);

impl SimButton {
    /// Released.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold the button down.
    pub fn press(&self) {
        self.0.set(true);
    }

    /// Let go.
    pub fn release(&self) {
        self.0.set(false);
    }

    /// Press or release.
    pub fn set(&self, pressed: bool) {
        self.0.set(pressed);
    }

    /// Whether the button is down.
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.0.get()
    }
}

impl ErrorType for SimButton {
    type Error = Infallible;
}

impl InputPin for SimButton {
    fn is_high(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(!self.0.get())
    }

    fn is_low(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(self.0.get())
    }
}

// ============================================================================
// SimSensors
// ============================================================================

#[derive(Debug)]
struct SensorState {
    current: [u8; Finger::COUNT],
    script: VecDeque<[u8; Finger::COUNT]>,
    failing: Option<Finger>,
    sweeps: usize,
}

/// Flex sensors with settable readings.
///
/// Readings hold until changed with [`set`](Self::set). A [`script`](Self::script) queues
/// whole sweeps instead: each Thumb read (the start of a sweep) takes the next one, and the
/// last sweep holds once the queue runs dry. Clones share one set of sensors.
#[derive(Clone, Debug)]
pub struct SimSensors(Rc<RefCell<SensorState>>);

impl SimSensors {
    /// Every sensor straight (reads 255).
    #[must_use]
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(SensorState {
            current: [u8::MAX; Finger::COUNT],
            script: VecDeque::new(),
            failing: None,
            sweeps: 0,
        })))
    }

    /// Readings of every finger from now on, Thumb first.
    pub fn set(&self, raw: [u8; Finger::COUNT]) {
        let mut state = self.0.borrow_mut();
        state.script.clear();
        state.current = raw;
    }

    /// Queue sweeps to be returned one per sweep.
    pub fn script<I: IntoIterator<Item = [u8; Finger::COUNT]>>(&self, sweeps: I) {
        self.0.borrow_mut().script.extend(sweeps);
    }

    /// Make reads of `finger` fail (or, with `None`, stop failing).
    pub fn fail(&self, finger: Option<Finger>) {
        self.0.borrow_mut().failing = finger;
    }

    /// Number of sweeps started so far.
    #[must_use]
    pub fn sweeps(&self) -> usize {
        self.0.borrow().sweeps
    }
}

impl Default for SimSensors {
    fn default() -> Self {
        Self::new()
    }
}

impl FingerSensors for SimSensors {
    fn read(&mut self, finger: Finger) -> Result<u8> {
        let mut state = self.0.borrow_mut();
        if state.failing == Some(finger) {
            return Err(Error::Sensor(finger));
        }
        if finger == Finger::Thumb {
            state.sweeps += 1;
            if let Some(next) = state.script.pop_front() {
                state.current = next;
            }
        }
        Ok(state.current[finger.index()])
    }
}

// ============================================================================
// SimRig
// ============================================================================

/// A [`Hand`] built entirely from simulated parts.
pub type SimHand = Hand<SimPin, SimPin, SimButton, SimSensors, VirtualClock>;

/// A simulated hand plus the handles a test drives it with.
///
/// # Example
///
/// ```rust
/// use hand_envoy::sim::SimRig;
/// use hand_envoy::HandConfig;
///
/// # fn main() -> hand_envoy::Result<()> {
/// let mut rig = SimRig::new(HandConfig::new())?;
/// rig.hold(20)?;
/// assert!(rig.hand.mode_machine().in_select());
/// # Ok(())
/// # }
/// ```
pub struct SimRig {
    /// The hand under test.
    pub hand: SimHand,
    /// Time and edges of every line.
    pub timeline: Timeline,
    /// Handle on the hand's button.
    pub button: SimButton,
    /// Handle on the hand's sensors.
    pub sensors: SimSensors,
}

impl SimRig {
    /// A simulated hand with all sensors straight and the button released.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `config` does not validate.
    pub fn new(config: HandConfig) -> Result<Self> {
        let timeline = Timeline::new();
        let button = SimButton::new();
        let sensors = SimSensors::new();
        let parts = HandParts {
            servos: Finger::ALL.map(|finger| SimPin::new(&timeline, Line::Servo(finger))),
            beeper: SimPin::new(&timeline, Line::Beeper),
            button: button.clone(),
            sensors: sensors.clone(),
        };
        let hand = Hand::new(parts, VirtualClock::new(&timeline), config)?;
        Ok(Self {
            hand,
            timeline,
            button,
            sensors,
        })
    }

    /// Run `count` steps with the button at its current level.
    ///
    /// # Errors
    ///
    /// The first error a step reports.
    pub fn steps(&mut self, count: usize) -> Result<Vec<HandStep>> {
        (0..count).map(|_| self.hand.step()).collect()
    }

    /// Press and keep holding for `frames` steps. The button stays down afterwards.
    ///
    /// # Errors
    ///
    /// The first error a step reports.
    pub fn hold(&mut self, frames: usize) -> Result<Vec<HandStep>> {
        self.button.press();
        self.steps(frames)
    }

    /// Release and run one step.
    ///
    /// # Errors
    ///
    /// The error the step reports.
    pub fn release(&mut self) -> Result<HandStep> {
        self.button.release();
        self.hand.step()
    }

    /// A short press: one held step, then one released step.
    ///
    /// # Errors
    ///
    /// The first error a step reports.
    pub fn tap(&mut self) -> Result<HandStep> {
        self.hold(1)?;
        self.release()
    }

    /// Enter mode select, tap `taps` times, then commit with a second long press and let go.
    ///
    /// # Errors
    ///
    /// The first error a step reports.
    pub fn select_mode(&mut self, taps: usize) -> Result<()> {
        let frames = usize::from(self.hand.config().long_press_frames);
        self.hold(frames)?;
        self.release()?;
        for _ in 0..taps {
            self.tap()?;
        }
        self.hold(frames)?;
        self.release()?;
        Ok(())
    }
}
