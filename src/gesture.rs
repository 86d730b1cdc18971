//! The nine preset hand gestures and the tap-driven cycler that steps through them.

use crate::finger::FingerPositions;

/// A preset hand shape. Discriminants are the cycling order.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gesture {
    /// Every finger extended.
    #[default]
    Open,
    /// Every finger closed.
    Fist,
    /// Middle and ring closed.
    SpiderMan,
    /// Thumb and pinkie out.
    HangLoose,
    /// Index and middle up, thumb partly closed.
    Peace,
    /// Thumb and index partly closed into a ring.
    Ok,
    /// Only the thumb out.
    ThumbsUp,
    /// Only the index out.
    Pointing,
    /// Index and pinkie out.
    RockOn,
}

impl Gesture {
    /// Number of presets.
    pub const COUNT: usize = 9;

    /// All gestures in cycling order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Open,
        Self::Fist,
        Self::SpiderMan,
        Self::HangLoose,
        Self::Peace,
        Self::Ok,
        Self::ThumbsUp,
        Self::Pointing,
        Self::RockOn,
    ];

    /// Finger positions of this gesture, Thumb first.
    #[must_use]
    pub const fn positions(self) -> FingerPositions {
        FingerPositions::new(match self {
            Self::Open => [0, 0, 0, 0, 0],
            Self::Fist => [255, 255, 255, 255, 255],
            Self::SpiderMan => [0, 0, 255, 255, 0],
            Self::HangLoose => [0, 255, 255, 255, 0],
            Self::Peace => [200, 0, 0, 255, 255],
            Self::Ok => [200, 200, 0, 0, 0],
            Self::ThumbsUp => [0, 255, 255, 255, 255],
            Self::Pointing => [255, 0, 255, 255, 255],
            Self::RockOn => [255, 0, 255, 255, 0],
        })
    }

    /// Position in the cycling order.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The gesture at `index`, wrapping modulo [`Gesture::COUNT`].
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::COUNT]
    }

    /// The gesture after this one, wrapping from [`Gesture::RockOn`] to [`Gesture::Open`].
    #[must_use]
    pub const fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }
}

/// Steps through the gestures on short presses.
///
/// A press sets a pending latch; the release that follows advances to the next gesture.
/// Presses are ignored while the mode machine has the button (mode select, or a hold that
/// already fired).
///
/// # Example
///
/// ```rust
/// use hand_envoy::gesture::{Gesture, GestureCycler};
/// use hand_envoy::FingerPositions;
///
/// let mut cycler = GestureCycler::new();
/// let mut positions = FingerPositions::OPEN;
///
/// assert_eq!(cycler.update(true, true, &mut positions), None);
/// assert_eq!(cycler.update(false, true, &mut positions), Some(Gesture::Fist));
/// assert_eq!(positions, FingerPositions::CLOSED);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GestureCycler {
    current: Gesture,
    pending: bool,
}

impl GestureCycler {
    /// Starts at [`Gesture::Open`] with nothing pending.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: Gesture::Open,
            pending: false,
        }
    }

    /// The gesture last written.
    #[must_use]
    pub const fn current(&self) -> Gesture {
        self.current
    }

    /// `true` between an armed press and its release.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// Drop a pending advance. Called when the mode machine claims the press.
    pub const fn clear_pending(&mut self) {
        self.pending = false;
    }

    /// Sample one frame of button level. On the release that advances, the new gesture is
    /// written to `positions`; every other frame leaves them alone.
    ///
    /// `armed` is `false` while the press belongs to the mode machine; such presses never
    /// set the latch. Returns the new gesture on the frame it advances.
    pub fn update(&mut self, pressed: bool, armed: bool, positions: &mut FingerPositions) -> Option<Gesture> {
        let mut advanced = None;
        if pressed {
            if armed {
                self.pending = true;
            }
        } else if self.pending {
            self.pending = false;
            self.current = self.current.next();
            info!("gesture {}", self.current);
            *positions = self.current.positions();
            advanced = Some(self.current);
        }
        advanced
    }
}
