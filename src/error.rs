use derive_more::{Display, Error};

use crate::finger::Finger;

/// Errors reported by the hand controller.
///
/// The control loop itself has no logical failure modes; these cover a rejected
/// [`HandConfig`](crate::HandConfig) and hardware services that can report faults.
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A configuration value is outside its supported range.
    #[display("invalid configuration: {_0}")]
    InvalidConfig(#[error(not(source))] &'static str),

    /// A digital input or output line reported a failure.
    #[display("digital I/O line failed")]
    DigitalIo,

    /// The sensor service could not convert a finger's channel.
    #[display("sensor conversion failed for {_0:?}")]
    Sensor(#[error(not(source))] Finger),
}

/// Result type used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
