#![cfg(feature = "host")]
#![allow(missing_docs)]
//! Host-level tests for the beckoning demo on a simulated hand.

use std::error::Error;

use hand_envoy::demo_wave::DemoWave;
use hand_envoy::sim::SimRig;
use hand_envoy::{Finger, FingerPositions, HandConfig, Mode};

#[test]
fn index_sweeps_back_and_forth_forever() {
    let mut wave = DemoWave::new(5);
    let mut positions = FingerPositions::OPEN;
    let mut seen = Vec::new();
    for _ in 0..(3 * 102) {
        wave.update(&mut positions);
        seen.push(positions[Finger::Index]);
    }

    // One full period is 51 steps up and 51 steps down.
    assert_eq!(&seen[..3], &[5, 10, 15]);
    assert_eq!(seen[50], 255);
    assert_eq!(seen[51], 250);
    assert_eq!(seen[101], 0);
    assert_eq!(seen[102], 5);
    assert_eq!(&seen[102..204], &seen[..102]);
    assert!(seen.windows(2).all(|pair| pair[0].abs_diff(pair[1]) == 5));
}

#[test]
fn other_fingers_stay_closed() -> Result<(), Box<dyn Error>> {
    let mut rig = SimRig::new(HandConfig::new())?;
    rig.select_mode(2)?;
    assert_eq!(rig.hand.mode_machine().active(), Mode::DemoWave);

    for _ in 0..60 {
        rig.hand.step()?;
        for (finger, position) in rig.hand.positions().iter() {
            if finger != Finger::Index {
                assert_eq!(position, 255, "{finger:?} moved");
            }
        }
    }
    Ok(())
}

#[test]
fn wave_step_is_configurable() -> Result<(), Box<dyn Error>> {
    let mut rig = SimRig::new(HandConfig::new().with_wave_step(51))?;
    rig.select_mode(2)?;

    let mut seen = Vec::new();
    for _ in 0..6 {
        rig.hand.step()?;
        seen.push(rig.hand.positions()[Finger::Index]);
    }

    // The commit's release frame already moved the finger once.
    assert_eq!(seen, [102, 153, 204, 255, 204, 153]);
    Ok(())
}
