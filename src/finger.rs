//! Finger identities and the five-finger position vector.
//!
//! See [`FingerPositions`].

use core::ops::{Index, IndexMut};

/// Position of one finger. `0` is fully open, `255` fully closed.
pub type Position = u8;

/// A fully extended finger.
pub const OPEN: Position = 0;

/// A fully bent finger.
pub const CLOSED: Position = Position::MAX;

/// One finger of the hand. The discriminant is the servo channel and sensor order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Finger {
    /// Channel 0.
    Thumb,
    /// Channel 1.
    Index,
    /// Channel 2.
    Middle,
    /// Channel 3.
    Ring,
    /// Channel 4.
    Pinkie,
}

impl Finger {
    /// Number of fingers (and servo channels).
    pub const COUNT: usize = 5;

    /// All fingers in channel order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Thumb,
        Self::Index,
        Self::Middle,
        Self::Ring,
        Self::Pinkie,
    ];

    /// Channel index of this finger (Thumb = 0 … Pinkie = 4).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The finger on channel `index`, if there is one.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Thumb),
            1 => Some(Self::Index),
            2 => Some(Self::Middle),
            3 => Some(Self::Ring),
            4 => Some(Self::Pinkie),
            _ => None,
        }
    }
}

/// The position of every finger, indexed by [`Finger`].
///
/// This is the single buffer the active mode writes each frame and the
/// [`ServoFrame`](crate::servo::ServoFrame) reads.
///
/// # Example
///
/// ```rust
/// use hand_envoy::{Finger, FingerPositions};
///
/// let mut positions = FingerPositions::OPEN;
/// positions[Finger::Index] = 255;
/// assert_eq!(positions, FingerPositions::only_closed(Finger::Index));
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FingerPositions([Position; Finger::COUNT]);

impl FingerPositions {
    /// Open hand.
    pub const OPEN: Self = Self([OPEN; Finger::COUNT]);

    /// Fist.
    pub const CLOSED: Self = Self([CLOSED; Finger::COUNT]);

    /// Positions in Thumb, Index, Middle, Ring, Pinkie order.
    #[must_use]
    pub const fn new(positions: [Position; Finger::COUNT]) -> Self {
        Self(positions)
    }

    /// `finger` fully closed, every other finger fully open.
    #[must_use]
    pub const fn only_closed(finger: Finger) -> Self {
        let mut positions = [OPEN; Finger::COUNT];
        positions[finger.index()] = CLOSED;
        Self(positions)
    }

    /// Position of `finger`.
    #[must_use]
    pub const fn get(&self, finger: Finger) -> Position {
        self.0[finger.index()]
    }

    /// Move `finger` to `position`.
    pub const fn set(&mut self, finger: Finger, position: Position) {
        self.0[finger.index()] = position;
    }

    /// Positions, Thumb first.
    #[must_use]
    pub const fn as_array(&self) -> &[Position; Finger::COUNT] {
        &self.0
    }

    /// `(finger, position)` pairs in channel order.
    pub fn iter(&self) -> impl Iterator<Item = (Finger, Position)> + '_ {
        Finger::ALL.into_iter().zip(self.0.iter().copied())
    }
}

impl From<[Position; Finger::COUNT]> for FingerPositions {
    fn from(positions: [Position; Finger::COUNT]) -> Self {
        Self(positions)
    }
}

impl Index<Finger> for FingerPositions {
    type Output = Position;

    fn index(&self, finger: Finger) -> &Position {
        &self.0[finger.index()]
    }
}

impl IndexMut<Finger> for FingerPositions {
    fn index_mut(&mut self, finger: Finger) -> &mut Position {
        &mut self.0[finger.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finger_index_round_trips() {
        for finger in Finger::ALL {
            assert_eq!(Finger::from_index(finger.index()), Some(finger));
        }
        assert_eq!(Finger::from_index(Finger::COUNT), None);
    }

    #[test]
    fn only_closed_bends_a_single_finger() {
        let positions = FingerPositions::only_closed(Finger::Ring);
        assert_eq!(positions.as_array(), &[0, 0, 0, 255, 0]);
    }
}
