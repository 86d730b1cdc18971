//! The operator button, sampled once per frame.
//!
//! There is no dedicated debounce filter: the button is read between servo frames, so
//! bounce shorter than a frame (~20 ms) is never seen. See [`Button`] and [`ButtonState`].

use embedded_hal::digital::InputPin;

use crate::{Error, Result};

// ============================================================================
// PressedTo - How the button is wired
// ============================================================================

/// Describes how the button is physically wired.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PressedTo {
    /// Button connects the line to voltage when pressed. Line reads HIGH when pressed.
    Voltage,

    /// Button connects the line to ground when pressed. Line reads LOW when pressed.
    /// This is how the hand's button is wired.
    #[default]
    Ground,
}

// ============================================================================
// Button
// ============================================================================

/// A button on a digital input line.
///
/// # Example
///
/// ```rust
/// use hand_envoy::button::{Button, PressedTo};
/// use hand_envoy::sim::SimButton;
///
/// # fn main() -> hand_envoy::Result<()> {
/// let line = SimButton::new();
/// let mut button = Button::new(line.clone(), PressedTo::Ground);
/// assert!(!button.is_pressed()?);
///
/// line.press();
/// assert!(button.is_pressed()?);
/// # Ok(())
/// # }
/// ```
pub struct Button<P: InputPin> {
    input: P,
    pressed_to: PressedTo,
}

impl<P: InputPin> Button<P> {
    /// Wrap an input line. Pull resistors are the board's business.
    #[must_use]
    pub const fn new(input: P, pressed_to: PressedTo) -> Self {
        Self { input, pressed_to }
    }

    /// Returns whether the button is currently pressed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DigitalIo`] if the line cannot be read.
    pub fn is_pressed(&mut self) -> Result<bool> {
        let pressed = match self.pressed_to {
            PressedTo::Voltage => self.input.is_high(),
            PressedTo::Ground => self.input.is_low(),
        };
        pressed.map_err(|_| Error::DigitalIo)
    }

    /// How the button is wired.
    #[must_use]
    pub const fn pressed_to(&self) -> PressedTo {
        self.pressed_to
    }
}

// ============================================================================
// ButtonState - Frame-granular press tracking
// ============================================================================

/// Press tracking shared by the mode machine and the gesture cycler.
///
/// Holds the level seen on the last frame, how many consecutive frames the button has been
/// held, and whether it has been released since the last long-press transition. The last
/// flag makes transitions edge-triggered: a hold that already fired cannot fire again until
/// the button goes up.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonState {
    pressed: bool,
    held_frames: u16,
    released_since_transition: bool,
    press_latched: bool,
}

impl ButtonState {
    /// Button up, nothing held, ready for a transition.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pressed: false,
            held_frames: 0,
            released_since_transition: true,
            press_latched: false,
        }
    }

    /// Level seen on the last frame.
    #[must_use]
    pub const fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Consecutive held frames counted toward the next long press.
    #[must_use]
    pub const fn held_frames(&self) -> u16 {
        self.held_frames
    }

    /// `false` from the frame a long press fires until the button is released.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.released_since_transition
    }

    /// Record a held frame. Returns the updated hold count, or `None` while disarmed.
    pub(crate) fn hold(&mut self) -> Option<u16> {
        self.pressed = true;
        self.press_latched = true;
        if !self.released_since_transition {
            return None;
        }
        self.held_frames = self.held_frames.saturating_add(1);
        Some(self.held_frames)
    }

    /// A long press fired: clear the count and disarm until release.
    pub(crate) fn fire(&mut self) {
        self.held_frames = 0;
        self.released_since_transition = false;
    }

    /// Record a frame with the button up. Returns `true` when this ends a short press, i.e. a
    /// press that started armed and never fired.
    pub(crate) fn release(&mut self) -> bool {
        let short_press = self.press_latched && self.released_since_transition;
        self.pressed = false;
        self.held_frames = 0;
        self.press_latched = false;
        self.released_since_transition = true;
        short_press
    }
}

impl Default for ButtonState {
    fn default() -> Self {
        Self::new()
    }
}
