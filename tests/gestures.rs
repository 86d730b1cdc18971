#![cfg(feature = "host")]
#![allow(missing_docs)]
//! Host-level tests for gesture cycling on a simulated hand.

use std::error::Error;

use hand_envoy::mode::ModeEvent;
use hand_envoy::sim::SimRig;
use hand_envoy::{FingerPositions, Gesture, HandConfig, HandStep, Mode};

fn gesture_rig() -> Result<SimRig, Box<dyn Error>> {
    let mut rig = SimRig::new(HandConfig::new())?;
    rig.select_mode(1)?;
    assert_eq!(rig.hand.mode_machine().active(), Mode::GestureCycle);
    Ok(rig)
}

#[test]
fn preset_table_matches_the_catalogue() {
    let table: Vec<[u8; 5]> = Gesture::ALL
        .iter()
        .map(|gesture| *gesture.positions().as_array())
        .collect();
    assert_eq!(
        table,
        [
            [0, 0, 0, 0, 0],
            [255, 255, 255, 255, 255],
            [0, 0, 255, 255, 0],
            [0, 255, 255, 255, 0],
            [200, 0, 0, 255, 255],
            [200, 200, 0, 0, 0],
            [0, 255, 255, 255, 255],
            [255, 0, 255, 255, 255],
            [255, 0, 255, 255, 0],
        ]
    );
    assert_eq!(Gesture::from_index(1).positions(), FingerPositions::CLOSED);
    assert_eq!(Gesture::from_index(0).positions(), FingerPositions::OPEN);
}

#[test]
fn nine_taps_cycle_back_to_open() -> Result<(), Box<dyn Error>> {
    let mut rig = gesture_rig()?;
    assert_eq!(rig.hand.gesture(), Gesture::Open);

    for taps in 1..=Gesture::COUNT {
        rig.tap()?;
        let expected = Gesture::from_index(taps);
        assert_eq!(rig.hand.gesture(), expected);
        assert_eq!(*rig.hand.positions(), expected.positions());
    }
    assert_eq!(rig.hand.gesture(), Gesture::Open);
    Ok(())
}

#[test]
fn gesture_advances_on_release() -> Result<(), Box<dyn Error>> {
    let mut rig = gesture_rig()?;

    rig.hold(5)?;
    assert_eq!(rig.hand.gesture(), Gesture::Open);

    rig.release()?;
    assert_eq!(rig.hand.gesture(), Gesture::Fist);
    Ok(())
}

#[test]
fn preset_holds_between_taps() -> Result<(), Box<dyn Error>> {
    let mut rig = gesture_rig()?;
    for _ in 0..4 {
        rig.tap()?;
    }

    rig.steps(25)?;

    assert_eq!(rig.hand.gesture(), Gesture::Peace);
    assert_eq!(rig.hand.positions().as_array(), &[200, 0, 0, 255, 255]);
    Ok(())
}

#[test]
fn mode_select_presses_never_advance_the_gesture() -> Result<(), Box<dyn Error>> {
    let mut rig = gesture_rig()?;
    rig.tap()?;
    assert_eq!(rig.hand.gesture(), Gesture::Fist);

    // Enter mode select and commit gesture mode again without tapping.
    rig.select_mode(0)?;

    assert_eq!(rig.hand.mode_machine().active(), Mode::GestureCycle);
    assert_eq!(rig.hand.gesture(), Gesture::Fist);
    rig.steps(3)?;
    assert_eq!(*rig.hand.positions(), FingerPositions::OPEN);
    Ok(())
}

#[test]
fn commit_opens_the_hand_until_the_next_tap() -> Result<(), Box<dyn Error>> {
    let mut rig = gesture_rig()?;
    rig.tap()?;
    assert_eq!(*rig.hand.positions(), FingerPositions::CLOSED);

    let frames = usize::from(rig.hand.config().long_press_frames);
    rig.hold(frames)?;
    rig.release()?;
    let steps = rig.hold(frames)?;
    assert!(matches!(
        steps.last(),
        Some(HandStep::Frame {
            event: ModeEvent::Committed {
                mode: Mode::GestureCycle,
                ..
            },
            ..
        })
    ));
    assert_eq!(*rig.hand.positions(), FingerPositions::OPEN);

    rig.release()?;
    rig.steps(5)?;
    assert_eq!(*rig.hand.positions(), FingerPositions::OPEN);

    rig.tap()?;
    assert_eq!(rig.hand.gesture(), Gesture::SpiderMan);
    assert_eq!(*rig.hand.positions(), Gesture::SpiderMan.positions());
    Ok(())
}

#[test]
fn taps_in_other_modes_leave_the_gesture_alone() -> Result<(), Box<dyn Error>> {
    let mut rig = SimRig::new(HandConfig::new())?;
    for _ in 0..3 {
        rig.tap()?;
    }
    assert_eq!(rig.hand.gesture(), Gesture::Open);
    assert_eq!(rig.hand.mode_machine().active(), Mode::GloveMatch);
    Ok(())
}
