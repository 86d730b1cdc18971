//! The flex-sensor service: one blocking 8-bit conversion per finger.

use crate::Result;
use crate::finger::Finger;

/// Reads the flex sensor of each finger.
///
/// A straight finger reads high; bending the sensor raises its conductivity and lowers the
/// code. Implementations block until the conversion is done.
pub trait FingerSensors {
    /// Convert the channel wired to `finger`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Sensor`](crate::Error::Sensor) if the converter reports a failure.
    fn read(&mut self, finger: Finger) -> Result<u8>;

    /// Convert all five channels, Thumb first.
    ///
    /// # Errors
    ///
    /// Stops at the first failing channel.
    fn read_all(&mut self) -> Result<[u8; Finger::COUNT]> {
        let mut raw = [0; Finger::COUNT];
        for (slot, finger) in raw.iter_mut().zip(Finger::ALL) {
            *slot = self.read(finger)?;
        }
        Ok(raw)
    }
}

impl<S: FingerSensors + ?Sized> FingerSensors for &mut S {
    fn read(&mut self, finger: Finger) -> Result<u8> {
        (**self).read(finger)
    }
}
