//! The beckoning demo: every finger closed except the index, which sweeps back and forth.

use crate::finger::{Finger, FingerPositions, Position};

/// Moves the index finger by a fixed step each frame, reversing at either end of travel.
///
/// # Example
///
/// ```rust
/// use hand_envoy::demo_wave::DemoWave;
/// use hand_envoy::{Finger, FingerPositions};
///
/// let mut wave = DemoWave::new(5);
/// let mut positions = FingerPositions::OPEN;
///
/// wave.update(&mut positions);
/// assert_eq!(positions.as_array(), &[255, 5, 255, 255, 255]);
/// wave.update(&mut positions);
/// assert_eq!(positions[Finger::Index], 10);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DemoWave {
    index: Position,
    step: u8,
    closing: bool,
}

impl DemoWave {
    /// Starts one step in from open, closing.
    #[must_use]
    pub const fn new(step: u8) -> Self {
        Self {
            index: step,
            step,
            closing: true,
        }
    }

    /// Index-finger position the next [`update`](Self::update) writes.
    #[must_use]
    pub const fn index_position(&self) -> Position {
        self.index
    }

    /// `true` while the index finger is moving towards closed.
    #[must_use]
    pub const fn is_closing(&self) -> bool {
        self.closing
    }

    /// Write this frame's positions, then advance the index finger.
    pub fn update(&mut self, positions: &mut FingerPositions) {
        *positions = FingerPositions::CLOSED;
        positions[Finger::Index] = self.index;

        if self.closing {
            self.index = self.index.saturating_add(self.step);
            if self.index == Position::MAX {
                self.closing = false;
            }
        } else {
            self.index = self.index.saturating_sub(self.step);
            if self.index == 0 {
                self.closing = true;
            }
        }
    }
}

impl Default for DemoWave {
    fn default() -> Self {
        Self::new(crate::config::WAVE_STEP_DEFAULT)
    }
}
