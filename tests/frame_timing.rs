#![cfg(feature = "host")]
#![allow(missing_docs)]
//! Host-level tests for servo frame timing on the simulated timeline.

use std::error::Error;

use hand_envoy::servo::{
    FrameReport, FrameTiming, PulsePolarity, ServoFrame, on_time_us,
};
use hand_envoy::beeper::{Beep, Beeper, Tone};
use hand_envoy::sim::{Line, SimPin, SimRig, Timeline, VirtualClock};
use hand_envoy::{Finger, FingerPositions, HandConfig};

fn servo_frame(timeline: &Timeline, timing: FrameTiming) -> ServoFrame<SimPin> {
    let pins = Finger::ALL.map(|finger| SimPin::new(timeline, Line::Servo(finger)));
    ServoFrame::new(pins, timing, PulsePolarity::ClosedShort).expect("servo lines must start low")
}

#[test]
fn on_time_stays_in_the_sg90_window() {
    let timing = FrameTiming::SG90;
    for position in 0..=u8::MAX {
        let on_time = on_time_us(position, &timing, PulsePolarity::ClosedShort);
        assert!((540..=2_070).contains(&on_time), "{position} -> {on_time}us");
    }
}

#[test]
fn every_reachable_frame_sums_to_the_period() {
    let timing = FrameTiming::SG90;
    for position in 0..=u8::MAX {
        for odd_one in Finger::ALL {
            let mut positions = FingerPositions::new([position; 5]);
            positions[odd_one] = u8::MAX - position;
            let report = FrameReport::plan(&positions, &timing, PulsePolarity::ClosedShort);
            assert!(!report.clamped);
            assert_eq!(
                report.pulses_us() + report.idle_us + timing.overhead_us,
                timing.frame_period_us
            );
        }
    }
}

#[test]
fn pulses_run_in_channel_order_without_overlap() -> Result<(), Box<dyn Error>> {
    let timeline = Timeline::new();
    let mut servos = servo_frame(&timeline, FrameTiming::SG90);
    let mut clock = VirtualClock::new(&timeline);

    let positions = FingerPositions::new([0, 64, 128, 192, 255]);
    let report = servos.run(&positions, &mut clock)?;

    let pulses = timeline.all_pulses();
    assert_eq!(pulses.len(), 5);
    let mut previous_end = 0;
    for ((pulse, finger), on_time) in pulses.iter().zip(Finger::ALL).zip(report.on_times_us) {
        assert_eq!(pulse.line, Line::Servo(finger));
        assert_eq!(pulse.width_us, u64::from(on_time));
        assert!(pulse.start_us >= previous_end, "{finger:?} overlaps the previous pulse");
        previous_end = pulse.start_us + pulse.width_us;
    }
    assert_eq!(report.on_times_us, [2_070, 1_686, 1_302, 918, 540]);
    assert_eq!(timeline.now_us(), 17_500);
    Ok(())
}

#[test]
fn overrun_frame_runs_long_instead_of_wrapping() -> Result<(), Box<dyn Error>> {
    let timing = FrameTiming {
        overhead_us: 10_000,
        ..FrameTiming::SG90
    };
    let timeline = Timeline::new();
    let mut servos = servo_frame(&timeline, timing);
    let mut clock = VirtualClock::new(&timeline);

    let report = servos.run(&FingerPositions::OPEN, &mut clock)?;

    assert!(report.clamped);
    assert_eq!(report.idle_us, 0);
    assert_eq!(timeline.now_us(), 5 * 2_070);
    Ok(())
}

#[test]
fn closed_long_polarity_mirrors_the_pulses() -> Result<(), Box<dyn Error>> {
    let timeline = Timeline::new();
    let pins = Finger::ALL.map(|finger| SimPin::new(&timeline, Line::Servo(finger)));
    let mut servos = ServoFrame::new(pins, FrameTiming::SG90, PulsePolarity::ClosedLong)?;
    let mut clock = VirtualClock::new(&timeline);

    let report = servos.run(&FingerPositions::only_closed(Finger::Thumb), &mut clock)?;

    assert_eq!(report.on_times_us, [2_070, 540, 540, 540, 540]);
    Ok(())
}

#[test]
fn failing_line_is_reported_at_construction() {
    let timeline = Timeline::new();
    let pins = Finger::ALL.map(|finger| {
        if finger == Finger::Middle {
            SimPin::failing(&timeline, Line::Servo(finger))
        } else {
            SimPin::new(&timeline, Line::Servo(finger))
        }
    });
    assert_eq!(
        ServoFrame::new(pins, FrameTiming::SG90, PulsePolarity::ClosedShort).err(),
        Some(hand_envoy::Error::DigitalIo)
    );
}

#[test]
fn line_failing_mid_frame_still_runs_the_full_frame() -> Result<(), Box<dyn Error>> {
    let timeline = Timeline::new();
    let pins = Finger::ALL.map(|finger| {
        if finger == Finger::Middle {
            SimPin::stuck_low(&timeline, Line::Servo(finger))
        } else {
            SimPin::new(&timeline, Line::Servo(finger))
        }
    });
    let mut servos = ServoFrame::new(pins, FrameTiming::SG90, PulsePolarity::ClosedShort)?;
    let mut clock = VirtualClock::new(&timeline);

    let outcome = servos.run(&FingerPositions::OPEN, &mut clock);

    assert_eq!(outcome.err(), Some(hand_envoy::Error::DigitalIo));
    assert_eq!(timeline.now_us(), 17_500);
    let pulsed: Vec<Line> = timeline.all_pulses().iter().map(|pulse| pulse.line).collect();
    assert_eq!(
        pulsed,
        [
            Line::Servo(Finger::Thumb),
            Line::Servo(Finger::Index),
            Line::Servo(Finger::Ring),
            Line::Servo(Finger::Pinkie),
        ]
    );
    assert!(timeline.all_pulses().iter().all(|pulse| pulse.width_us == 2_070));
    Ok(())
}

#[test]
fn failing_beeper_still_plays_its_full_length() -> Result<(), Box<dyn Error>> {
    let timeline = Timeline::new();
    let mut beeper = Beeper::new(SimPin::stuck_low(&timeline, Line::Beeper), Tone::SHORT, Tone::LONG)?;
    let mut clock = VirtualClock::new(&timeline);

    assert_eq!(beeper.beep(Beep::Long, &mut clock).err(), Some(hand_envoy::Error::DigitalIo));
    assert_eq!(timeline.now_us(), 100_000);
    assert!(timeline.pulses(Line::Beeper).is_empty());
    Ok(())
}

#[test]
fn hand_frames_take_the_frame_budget() -> Result<(), Box<dyn Error>> {
    let mut rig = SimRig::new(HandConfig::new())?;
    rig.sensors.set([0, 50, 100, 150, 200]);

    rig.steps(10)?;

    assert_eq!(rig.timeline.now_us(), 10 * 17_500);
    assert_eq!(rig.timeline.pulses(Line::Servo(Finger::Thumb)).len(), 10);
    assert!(rig.timeline.pulses(Line::Beeper).is_empty());
    Ok(())
}
