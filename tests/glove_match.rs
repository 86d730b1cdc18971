#![cfg(feature = "host")]
#![allow(missing_docs)]
//! Host-level tests for glove mimicry: sensor codes in, servo pulses out.

use std::error::Error;

use hand_envoy::calibration::CalibrationVector;
use hand_envoy::glove::GloveMapper;
use hand_envoy::servo::{FrameTiming, PulsePolarity, on_time_us};
use hand_envoy::sim::{Line, SimRig};
use hand_envoy::{Finger, FingerPositions, HandConfig};

#[test]
fn censored_middle_is_pulled_back_end_to_end() -> Result<(), Box<dyn Error>> {
    let mut rig = SimRig::new(HandConfig::new().with_censor_middle(true))?;
    rig.sensors.set([155, 205, 55, 245, 255]);

    rig.steps(1)?;

    assert_eq!(rig.hand.positions().as_array(), &[100, 50, 0, 10, 0]);
    let middle = rig.timeline.pulses(Line::Servo(Finger::Middle));
    assert_eq!(middle.len(), 1);
    assert_eq!(middle[0].width_us, 2_070);
    Ok(())
}

#[test]
fn uncensored_middle_follows_the_glove() -> Result<(), Box<dyn Error>> {
    let mut rig = SimRig::new(HandConfig::new())?;
    rig.sensors.set([155, 205, 55, 245, 255]);

    rig.steps(1)?;

    assert_eq!(rig.hand.positions().as_array(), &[100, 50, 200, 10, 0]);
    let widths: Vec<u64> = Finger::ALL
        .iter()
        .map(|finger| rig.timeline.pulses(Line::Servo(*finger))[0].width_us)
        .collect();
    let expected: Vec<u64> = [100, 50, 200, 10, 0]
        .iter()
        .map(|position| u64::from(on_time_us(*position, &FrameTiming::SG90, PulsePolarity::ClosedShort)))
        .collect();
    assert_eq!(widths, expected);
    Ok(())
}

#[test]
fn censorship_keeps_a_bent_hand_bent() {
    let mapper = GloveMapper::new(true, false);
    let positions = mapper.map(&[0, 0, 0, 0, 0], &CalibrationVector::UNSET);
    assert_eq!(positions, FingerPositions::CLOSED);

    let positions = mapper.map(&[0, 0, 55, 0, 0], &CalibrationVector::UNSET);
    assert_eq!(positions.as_array(), &[255, 255, 200, 255, 255]);
}

#[test]
fn glove_is_resampled_every_frame() -> Result<(), Box<dyn Error>> {
    let mut rig = SimRig::new(HandConfig::new())?;
    rig.sensors.script([[255; 5], [0; 5], [128; 5]]);

    rig.steps(1)?;
    assert_eq!(*rig.hand.positions(), FingerPositions::OPEN);
    rig.steps(1)?;
    assert_eq!(*rig.hand.positions(), FingerPositions::CLOSED);
    rig.steps(1)?;
    assert_eq!(*rig.hand.positions(), FingerPositions::new([127; 5]));
    assert_eq!(rig.sensors.sweeps(), 3);
    Ok(())
}

#[test]
fn sensor_failure_is_reported_before_the_frame() -> Result<(), Box<dyn Error>> {
    let mut rig = SimRig::new(HandConfig::new())?;
    rig.sensors.fail(Some(Finger::Pinkie));

    assert_eq!(rig.hand.step(), Err(hand_envoy::Error::Sensor(Finger::Pinkie)));
    assert!(rig.timeline.all_pulses().is_empty());
    Ok(())
}

#[test]
fn invalid_configurations_are_rejected() {
    for config in [
        HandConfig::new().with_mode_count(0),
        HandConfig::new().with_mode_count(6),
        HandConfig::new().with_long_press_frames(0),
        HandConfig::new().with_calibration(0, 1),
        HandConfig::new().with_wave_step(0),
    ] {
        assert!(matches!(
            SimRig::new(config).err(),
            Some(hand_envoy::Error::InvalidConfig(_))
        ));
    }
}
