#![no_std]
#![no_main]
#![cfg(not(feature = "host"))]

use core::{convert::Infallible, panic};
use embassy_executor::Spawner;
use hand_envoy::{HandConfig, Result, board};
use {defmt::info, defmt_rtt as _, panic_probe as _};

// Censor the middle finger; the glove is worn by visitors.
const CONFIG: HandConfig = HandConfig::new().with_censor_middle(true);

#[embassy_executor::main]
async fn main(spawner: Spawner) -> ! {
    let err = inner_main(spawner).await.unwrap_err();
    panic!("{err}");
}

async fn inner_main(_spawner: Spawner) -> Result<Infallible> {
    let p = embassy_rp::init(Default::default());

    let mut hand = board::hand(p, CONFIG)?;
    info!("Hand ready. Hold the button to pick a mode.");

    // The control loop busy-waits, so it owns the core from here on.
    hand.run()
}
