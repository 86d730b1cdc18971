//! The single-button mode machine.
//!
//! Hold the button for a long press to enter mode select. While selecting, the finger whose
//! index equals the tentative mode is closed and the rest are open; each short press moves
//! the tentative mode on by one. A second long press commits it. Committing mode 0 also
//! starts a calibration run.
//!
//! The button is sampled once per frame, so the frame period is the debounce interval.

use crate::button::ButtonState;
use crate::config::HandConfig;
use crate::finger::{Finger, FingerPositions};

// ============================================================================
// Mode
// ============================================================================

/// What the hand does between transitions. The index is also the finger shown in mode select.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Mode 0: follow the flex-sensor glove.
    #[default]
    GloveMatch,
    /// Mode 1: short presses step through the preset gestures.
    GestureCycle,
    /// Mode 2: the beckoning demo.
    DemoWave,
    /// Modes 3 and 4 when the mode count allows them: hold the current positions.
    Idle(u8),
}

impl Mode {
    /// The mode at `index` (0..=4).
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        match index {
            0 => Self::GloveMatch,
            1 => Self::GestureCycle,
            2 => Self::DemoWave,
            other => Self::Idle(other),
        }
    }

    /// Mode number as shown during mode select.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::GloveMatch => 0,
            Self::GestureCycle => 1,
            Self::DemoWave => 2,
            Self::Idle(index) => index,
        }
    }
}

// ============================================================================
// ModeEvent
// ============================================================================

/// The transition, if any, that one frame of button input caused.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeEvent {
    /// Nothing changed.
    #[default]
    None,
    /// A long press entered mode select. The positions now show `tentative`.
    EnteredSelect { tentative: u8 },
    /// A short press in mode select moved the tentative mode on.
    Tapped { tentative: u8 },
    /// A long press left mode select and made `mode` active. `calibrate` is set when the
    /// commit started a calibration run.
    Committed { mode: Mode, calibrate: bool },
}

impl ModeEvent {
    /// `true` for the long-press transitions (entering and leaving mode select).
    #[must_use]
    pub const fn is_transition(&self) -> bool {
        matches!(self, Self::EnteredSelect { .. } | Self::Committed { .. })
    }
}

// ============================================================================
// ModeMachine
// ============================================================================

/// Normal/mode-select state, the active and tentative modes, and the calibration flag.
///
/// # Example
///
/// ```rust
/// use hand_envoy::mode::{ModeEvent, ModeMachine};
/// use hand_envoy::{FingerPositions, HandConfig, Mode};
///
/// let mut machine = ModeMachine::new(&HandConfig::new());
/// let mut positions = FingerPositions::OPEN;
///
/// let mut transitions = 0;
/// for _ in 0..40 {
///     if machine.update(true, &mut positions) != ModeEvent::None {
///         transitions += 1;
///     }
/// }
/// assert_eq!(transitions, 1, "holding on does not fire again");
/// assert!(machine.in_select());
/// assert_eq!(positions.as_array(), &[255, 0, 0, 0, 0]);
///
/// machine.update(false, &mut positions);
/// machine.update(true, &mut positions);
/// assert_eq!(machine.update(false, &mut positions), ModeEvent::Tapped { tentative: 1 });
/// assert_eq!(positions.as_array(), &[0, 255, 0, 0, 0]);
/// assert_eq!(machine.active(), Mode::GloveMatch);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeMachine {
    active: Mode,
    tentative: u8,
    in_select: bool,
    calibrating: bool,
    button: ButtonState,
    mode_count: u8,
    long_press_frames: u16,
}

impl ModeMachine {
    /// Start of day: glove mode, not selecting, not calibrating.
    #[must_use]
    pub const fn new(config: &HandConfig) -> Self {
        Self {
            active: Mode::GloveMatch,
            tentative: 0,
            in_select: false,
            calibrating: false,
            button: ButtonState::new(),
            mode_count: config.mode_count,
            long_press_frames: config.long_press_frames,
        }
    }

    /// Mode that produces positions outside mode select.
    #[must_use]
    pub const fn active(&self) -> Mode {
        self.active
    }

    /// Mode shown while selecting.
    #[must_use]
    pub const fn tentative(&self) -> u8 {
        self.tentative
    }

    /// `true` while in mode select.
    #[must_use]
    pub const fn in_select(&self) -> bool {
        self.in_select
    }

    /// `true` while a calibration run is active.
    #[must_use]
    pub const fn is_calibrating(&self) -> bool {
        self.calibrating
    }

    /// Frame-level press tracking.
    #[must_use]
    pub const fn button(&self) -> &ButtonState {
        &self.button
    }

    /// Number of selectable modes.
    #[must_use]
    pub const fn mode_count(&self) -> u8 {
        self.mode_count
    }

    /// End the calibration run started by the last commit of mode 0.
    pub const fn finish_calibration(&mut self) {
        self.calibrating = false;
    }

    /// Feed one frame of button level.
    ///
    /// In mode select this writes the selection display into `positions`; a commit resets
    /// them to open. Otherwise `positions` is not touched.
    pub fn update(&mut self, pressed: bool, positions: &mut FingerPositions) -> ModeEvent {
        if pressed {
            let Some(held_frames) = self.button.hold() else {
                return ModeEvent::None;
            };
            if held_frames < self.long_press_frames {
                return ModeEvent::None;
            }
            self.button.fire();
            if self.in_select {
                self.commit(positions)
            } else {
                self.enter_select(positions)
            }
        } else {
            if !self.button.release() || !self.in_select {
                return ModeEvent::None;
            }
            self.tentative = next_mode(self.tentative, self.mode_count);
            *positions = selection_display(self.tentative);
            debug!("mode select: tentative {}", self.tentative);
            ModeEvent::Tapped {
                tentative: self.tentative,
            }
        }
    }

    fn enter_select(&mut self, positions: &mut FingerPositions) -> ModeEvent {
        self.in_select = true;
        self.tentative = self.active.index();
        *positions = selection_display(self.tentative);
        info!("mode select entered at {}", self.tentative);
        ModeEvent::EnteredSelect {
            tentative: self.tentative,
        }
    }

    fn commit(&mut self, positions: &mut FingerPositions) -> ModeEvent {
        self.in_select = false;
        self.active = Mode::from_index(self.tentative);
        self.calibrating = self.tentative == 0;
        *positions = FingerPositions::OPEN;
        info!("mode {} committed, calibrating={}", self.active, self.calibrating);
        ModeEvent::Committed {
            mode: self.active,
            calibrate: self.calibrating,
        }
    }
}

/// `mode + 1`, wrapping at `mode_count`.
const fn next_mode(mode: u8, mode_count: u8) -> u8 {
    let next = mode.saturating_add(1);
    if next >= mode_count { 0 } else { next }
}

/// The finger at `tentative` closed, every other finger open.
const fn selection_display(tentative: u8) -> FingerPositions {
    match Finger::from_index(tentative as usize) {
        Some(finger) => FingerPositions::only_closed(finger),
        None => FingerPositions::OPEN,
    }
}
