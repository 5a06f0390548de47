//! Integration test: observers on other threads.
//!
//! The cycle runs on one thread while readers poll the driving-input cell.
//! Every value a reader sees must be one the cycle actually published.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use vcu_common::driving_input::DrivingInput;
use vcu_control_unit::cycle::ControlCycle;
use vcu_control_unit::io::sim::{AdcBuffer, MonotonicClock, RecordingTransport};

use super::reference_config;

#[test]
fn readers_only_see_published_values() {
    let config = reference_config();
    let adc = AdcBuffer::new(4).unwrap();
    let mut cycle =
        ControlCycle::new(&config, &adc, RecordingTransport::new(), MonotonicClock).unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let readers: Vec<_> = (0..3)
        .map(|_| {
            let reader = cycle.reader();
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut last_generation = 0;
                while !done.load(Ordering::Acquire) {
                    let snap = reader.snapshot();
                    let DrivingInput { torque, error } = snap.input;
                    // Published values: plausible even torques or the faulted pair.
                    assert!(
                        (error && torque == 0) || (!error && torque % 2 == 0),
                        "unexpected value torque={torque} error={error}"
                    );
                    assert!(snap.generation >= last_generation);
                    last_generation = snap.generation;
                }
            })
        })
        .collect();

    for i in 0..5_000u16 {
        if i % 7 == 0 {
            adc.set(0, 400).unwrap();
            adc.set(1, 1500).unwrap();
        } else {
            let step = (i % 250) * 2;
            adc.set(0, 500 + step).unwrap();
            adc.set(1, 1500 + step).unwrap();
        }
        cycle.step();
    }
    done.store(true, Ordering::Release);

    for handle in readers {
        handle.join().unwrap();
    }
    assert_eq!(cycle.reader().generation(), 5_000);
}
