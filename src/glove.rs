//! Glove mimicry: flex-sensor codes to finger positions.
//!
//! A bending sensor conducts more and reads lower, so the mapping inverts: `p = 255 - r`.
//! Two optional post-processes are available, see [`GloveMapper`].

use crate::calibration::CalibrationVector;
use crate::finger::{Finger, FingerPositions, Position};
use crate::sensor::FingerSensors;
use crate::Result;

/// Position of a finger whose sensor reads `raw`, with no calibration applied.
#[must_use]
pub const fn invert(raw: u8) -> Position {
    Position::MAX - raw
}

/// Position of a finger whose sensor reads `raw`, stretched so the calibrated minimum
/// `minimum` maps to fully closed.
///
/// An unset minimum (255) leaves the plain inversion.
#[must_use]
pub const fn calibrated(raw: u8, minimum: u8) -> Position {
    let span = (u8::MAX - minimum) as u32;
    if span == 0 {
        return invert(raw);
    }
    let stretched = invert(raw) as u32 * Position::MAX as u32 / span;
    if stretched > Position::MAX as u32 {
        Position::MAX
    } else {
        stretched as Position
    }
}

/// Keep the middle finger from being the only one bent.
///
/// If Middle is strictly more closed than each of the other four fingers, it is pulled
/// back to the least-closed of them. Otherwise `positions` is left as is.
pub fn censor_middle(positions: &mut FingerPositions) {
    let middle = positions[Finger::Middle];
    let others = positions
        .iter()
        .filter(|(finger, _)| *finger != Finger::Middle)
        .map(|(_, position)| position);

    let mut lowest = Position::MAX;
    for position in others {
        if position >= middle {
            return;
        }
        lowest = lowest.min(position);
    }
    debug!("censoring middle finger {} -> {}", middle, lowest);
    positions[Finger::Middle] = lowest;
}

/// Maps a sensor sweep to positions in glove mode.
///
/// # Example
///
/// ```rust
/// use hand_envoy::calibration::CalibrationVector;
/// use hand_envoy::glove::GloveMapper;
///
/// let mapper = GloveMapper::new(true, false);
/// let positions = mapper.map(&[155, 205, 55, 245, 255], &CalibrationVector::UNSET);
/// assert_eq!(positions.as_array(), &[100, 50, 0, 10, 0]);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GloveMapper {
    censor_middle: bool,
    apply_calibration: bool,
}

impl GloveMapper {
    /// A mapper with middle-finger censorship and calibrated stretching switched on or off.
    #[must_use]
    pub const fn new(censor_middle: bool, apply_calibration: bool) -> Self {
        Self {
            censor_middle,
            apply_calibration,
        }
    }

    /// Whether middle-finger censorship is on.
    #[must_use]
    pub const fn censors_middle(&self) -> bool {
        self.censor_middle
    }

    /// Whether readings are stretched by the calibration vector.
    #[must_use]
    pub const fn applies_calibration(&self) -> bool {
        self.apply_calibration
    }

    /// Positions for one sweep of raw codes (Thumb first).
    #[must_use]
    pub fn map(&self, raw: &[u8; Finger::COUNT], calibration: &CalibrationVector) -> FingerPositions {
        let mut positions = FingerPositions::OPEN;
        for finger in Finger::ALL {
            let code = raw[finger.index()];
            positions[finger] = if self.apply_calibration {
                calibrated(code, calibration.get(finger))
            } else {
                invert(code)
            };
        }
        if self.censor_middle {
            censor_middle(&mut positions);
        }
        positions
    }

    /// Sweep `sensors` and write the mapped positions.
    ///
    /// # Errors
    ///
    /// Propagates a sensor failure and leaves `positions` untouched.
    pub fn update<S: FingerSensors>(
        &self,
        sensors: &mut S,
        calibration: &CalibrationVector,
        positions: &mut FingerPositions,
    ) -> Result<()> {
        let raw = sensors.read_all()?;
        *positions = self.map(&raw, calibration);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inversion_spans_the_range() {
        assert_eq!(invert(255), 0);
        assert_eq!(invert(0), 255);
        assert_eq!(invert(155), 100);
    }

    #[test]
    fn middle_is_left_alone_unless_most_closed() {
        let mut positions = FingerPositions::new([100, 50, 100, 10, 0]);
        censor_middle(&mut positions);
        assert_eq!(positions[Finger::Middle], 100, "a tie is not strictly more closed");

        let mut positions = FingerPositions::new([0, 0, 255, 0, 0]);
        censor_middle(&mut positions);
        assert_eq!(positions, FingerPositions::OPEN);
    }

    #[test]
    fn calibrated_minimum_maps_to_closed() {
        assert_eq!(calibrated(100, 100), 255);
        assert_eq!(calibrated(90, 100), 255);
        assert_eq!(calibrated(255, 100), 0);
        assert_eq!(calibrated(155, 255), 100);
    }
}
