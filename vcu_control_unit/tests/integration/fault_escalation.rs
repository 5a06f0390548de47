//! Integration test: implausibility debounce across cycles.
//!
//! Validates: an error shorter than the threshold interval never produces a
//! fault command, a persistent error escalates once the interval has elapsed,
//! and a single clean cycle restores torque commands.

use std::time::Duration;

use vcu_common::driving_input::DrivingInput;
use vcu_common::mcu::{FaultCode, McuCommand};
use vcu_control_unit::cycle::ControlCycle;
use vcu_control_unit::fault::persistence::FaultPhase;
use vcu_control_unit::io::sim::{AdcBuffer, ManualClock, PedalSimulator, RecordingTransport};

use super::reference_config;

const CYCLE: Duration = Duration::from_millis(10);

fn set(adc: &AdcBuffer, raw0: u16, raw1: u16) {
    adc.set(0, raw0).unwrap();
    adc.set(1, raw1).unwrap();
}

#[test]
fn short_error_never_emits_fault_command() {
    let config = reference_config();
    let adc = AdcBuffer::new(4).unwrap();
    let clock = ManualClock::new();
    let mut cycle = ControlCycle::new(&config, &adc, RecordingTransport::new(), &clock).unwrap();

    // 9 faulted cycles at 10 ms = 80 ms of error.
    set(&adc, 475, 1500);
    for _ in 0..9 {
        let report = cycle.step();
        assert!(!report.phase.is_confirmed());
        assert_eq!(report.command, McuCommand::Torque { torque: 0 });
        clock.advance(CYCLE);
    }

    set(&adc, 750, 1750);
    let report = cycle.step();
    assert_eq!(report.phase, FaultPhase::Idle);
    assert_eq!(report.command, McuCommand::Torque { torque: 250 });

    let faults = cycle
        .dispatcher()
        .transport()
        .frames()
        .iter()
        .filter(|f| f.id == config.mcu.fault_command_id)
        .count();
    assert_eq!(faults, 0);
}

#[test]
fn persistent_error_escalates_and_recovers() {
    let config = reference_config();
    let adc = AdcBuffer::new(4).unwrap();
    let clock = ManualClock::new();
    let mut cycle = ControlCycle::new(&config, &adc, RecordingTransport::new(), &clock).unwrap();

    set(&adc, 700, 1755);
    let mut confirmed_at = None;
    for n in 0..20u32 {
        let report = cycle.step();
        if report.phase.is_confirmed() && confirmed_at.is_none() {
            confirmed_at = Some(n);
            assert_eq!(
                report.command,
                McuCommand::Fault {
                    code: FaultCode::ThrottleImplausible
                }
            );
            assert_eq!(report.command.torque(), 0);
        }
        clock.advance(CYCLE);
    }
    // Cycle 0 starts the timer at t0; cycle 10 sees t0 + 100 ms.
    assert_eq!(confirmed_at, Some(10));
    assert!(cycle.tracker().is_confirmed());

    set(&adc, 750, 1750);
    let report = cycle.step();
    assert_eq!(report.input, DrivingInput::plausible(250));
    assert_eq!(report.phase, FaultPhase::Idle);
    assert_eq!(report.command, McuCommand::Torque { torque: 250 });
}

#[test]
fn interrupted_error_restarts_timer() {
    let config = reference_config();
    let adc = AdcBuffer::new(4).unwrap();
    let clock = ManualClock::new();
    let mut cycle = ControlCycle::new(&config, &adc, RecordingTransport::new(), &clock).unwrap();

    for _ in 0..3 {
        set(&adc, 475, 1500);
        for _ in 0..9 {
            assert!(!cycle.step().phase.is_confirmed());
            clock.advance(CYCLE);
        }
        set(&adc, 500, 1500);
        assert_eq!(cycle.step().phase, FaultPhase::Idle);
        clock.advance(CYCLE);
    }
}

#[test]
fn simulated_wire_cut_is_confirmed_then_cleared() {
    let config = reference_config();
    let calibration = config.sensor.calibration().unwrap();
    let adc = AdcBuffer::new(4).unwrap();
    let clock = ManualClock::new();
    let mut cycle = ControlCycle::new(&config, &adc, RecordingTransport::new(), &clock).unwrap();

    let mut pedal = PedalSimulator::new(calibration, [0, 1], 200);
    pedal.inject_fault(50, 30);

    let mut fault_commands = 0;
    for _ in 0..120 {
        pedal.tick(&adc).unwrap();
        let report = cycle.step();
        if report.command.is_fault() {
            fault_commands += 1;
        }
        clock.advance(CYCLE);
    }

    // 30 faulted cycles; the first 10 are debounce.
    assert_eq!(fault_commands, 20);
    assert!(!cycle.tracker().is_confirmed());
    assert_eq!(cycle.dispatcher().send_failures(), 0);
}

#[test]
fn transport_failures_do_not_stop_the_cycle() {
    let config = reference_config();
    let adc = AdcBuffer::new(4).unwrap();
    let clock = ManualClock::new();
    let mut cycle = ControlCycle::new(&config, &adc, RecordingTransport::new(), &clock).unwrap();

    set(&adc, 750, 1750);
    cycle.dispatcher_mut().transport_mut().fail_next(3);
    for _ in 0..5 {
        cycle.step();
        clock.advance(CYCLE);
    }

    assert_eq!(cycle.dispatcher().send_failures(), 3);
    assert_eq!(cycle.dispatcher().transport().frames().len(), 2);
    assert_eq!(cycle.reader().generation(), 5);
}
