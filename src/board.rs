//! Binding of the hand to a Raspberry Pi Pico.
//!
//! | Signal | Pin |
//! | ------ | --- |
//! | Servos (Thumb → Pinkie) | GPIO 2–6 |
//! | Beeper | GPIO 7 |
//! | Multiplexer select (A0, A1, A2) | GPIO 10–12 |
//! | Button (to ground) | GPIO 13 |
//! | Multiplexer output | GPIO 26 (ADC0) |
//!
//! The Pico has only three ADC inputs, so the five flex sensors go through an 8:1 analog
//! multiplexer (CD4051-style); sensor `n` sits on multiplexer input `n`.

use embassy_rp::Peripherals;
use embassy_rp::adc::{self, Adc, Channel};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_time::{Delay, block_for, Duration};

use crate::button::PressedTo;
use crate::config::HandConfig;
use crate::finger::Finger;
use crate::hand::{Hand, HandParts};
use crate::sensor::FingerSensors;
use crate::{Error, Result};

/// Settling time after switching the multiplexer (microseconds).
const MUX_SETTLE_US: u64 = 10;

/// The five flex sensors behind the analog multiplexer.
pub struct MuxedFlexSensors {
    adc: Adc<'static, adc::Blocking>,
    channel: Channel<'static>,
    select: [Output<'static>; 3],
}

impl MuxedFlexSensors {
    /// Take the ADC, the multiplexer's input channel and its three select lines (S0 first).
    #[must_use]
    pub const fn new(
        adc: Adc<'static, adc::Blocking>,
        channel: Channel<'static>,
        select: [Output<'static>; 3],
    ) -> Self {
        Self {
            adc,
            channel,
            select,
        }
    }
}

impl FingerSensors for MuxedFlexSensors {
    fn read(&mut self, finger: Finger) -> Result<u8> {
        let address = finger.index();
        for (bit, line) in self.select.iter_mut().enumerate() {
            line.set_level(Level::from(address & (1 << bit) != 0));
        }
        block_for(Duration::from_micros(MUX_SETTLE_US));

        let code = self
            .adc
            .blocking_read(&mut self.channel)
            .map_err(|_| Error::Sensor(finger))?;
        // 12-bit conversion; keep the top 8 bits.
        Ok(u8::try_from(code >> 4).unwrap_or(u8::MAX))
    }
}

/// The hand as wired on the Pico.
pub type PicoHand = Hand<Output<'static>, Output<'static>, Input<'static>, MuxedFlexSensors, Delay>;

/// Claim the hand's pins from `p` and build a ready [`Hand`].
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] if `config` does not validate.
pub fn hand(p: Peripherals, config: HandConfig) -> Result<PicoHand> {
    let pull = match config.pressed_to {
        PressedTo::Voltage => Pull::Down,
        PressedTo::Ground => Pull::Up,
    };

    let parts = HandParts {
        servos: [
            Output::new(p.PIN_2, Level::Low),
            Output::new(p.PIN_3, Level::Low),
            Output::new(p.PIN_4, Level::Low),
            Output::new(p.PIN_5, Level::Low),
            Output::new(p.PIN_6, Level::Low),
        ],
        beeper: Output::new(p.PIN_7, Level::Low),
        button: Input::new(p.PIN_13, pull),
        sensors: MuxedFlexSensors::new(
            Adc::new_blocking(p.ADC, adc::Config::default()),
            Channel::new_pin(p.PIN_26, Pull::None),
            [
                Output::new(p.PIN_10, Level::Low),
                Output::new(p.PIN_11, Level::Low),
                Output::new(p.PIN_12, Level::Low),
            ],
        ),
    };
    info!("pico hand: servos GPIO2-6, beeper GPIO7, button GPIO13, sensors ADC0 via mux");
    Hand::new(parts, Delay, config)
}
