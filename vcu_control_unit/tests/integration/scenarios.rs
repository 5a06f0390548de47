//! Integration test: reference pedal scenarios through a full cycle.
//!
//! Each pair of raw samples is written into the ADC buffer, one cycle runs,
//! and both the published driving input and the transmitted frame are checked.

use vcu_common::driving_input::DrivingInput;
use vcu_common::mcu::McuCommand;
use vcu_control_unit::cycle::ControlCycle;
use vcu_control_unit::io::sim::{AdcBuffer, ManualClock, RecordingTransport};

use super::reference_config;

fn run_once(raw0: u16, raw1: u16) -> (DrivingInput, Option<McuCommand>) {
    let config = reference_config();
    let adc = AdcBuffer::new(4).unwrap();
    let clock = ManualClock::new();
    let mut cycle = ControlCycle::new(&config, &adc, RecordingTransport::new(), &clock).unwrap();

    adc.set(0, raw0).unwrap();
    adc.set(1, raw1).unwrap();
    let report = cycle.step();

    assert_eq!(cycle.reader().read(), report.input);
    let frames = cycle.dispatcher().transport().frames();
    assert_eq!(frames.len(), 1, "exactly one frame per cycle");
    let sent = frames[0].decode_command(&config.mcu).ok();
    assert_eq!(sent, Some(report.command));
    (report.input, sent)
}

#[test]
fn half_pedal_travel() {
    assert_eq!(
        run_once(750, 1750),
        (DrivingInput::plausible(250), Some(McuCommand::Torque { torque: 250 }))
    );
}

#[test]
fn released_pedal_with_undershoot() {
    assert_eq!(run_once(485, 1485).0, DrivingInput::plausible(0));
}

#[test]
fn full_pedal_with_overshoot() {
    assert_eq!(run_once(1015, 2015).0, DrivingInput::plausible(500));
}

#[test]
fn single_channel_out_of_range_publishes_error() {
    for (raw0, raw1) in [(475, 1500), (500, 1475), (1025, 2000), (1000, 2025), (475, 1475)] {
        let (input, sent) = run_once(raw0, raw1);
        assert_eq!(input, DrivingInput::FAULTED, "raw0={raw0} raw1={raw1}");
        // Not yet confirmed: zero torque, no fault command.
        assert_eq!(sent, Some(McuCommand::Torque { torque: 0 }));
    }
}

#[test]
fn deviation_between_channels() {
    assert_eq!(run_once(740, 1760).0, DrivingInput::plausible(240));
    assert_eq!(run_once(700, 1755).0, DrivingInput::FAULTED);
}

#[test]
fn validated_torque_never_exceeds_max() {
    for raw0 in (400..=1100).step_by(25) {
        for raw1 in (1400..=2100).step_by(25) {
            let (input, _) = run_once(raw0, raw1);
            assert!(input.torque <= 500);
            if input.error {
                assert_eq!(input.torque, 0);
            }
        }
    }
}
