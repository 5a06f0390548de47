//! Dual-channel accelerator pedal plausibility (driving-input validation).
//!
//! Each channel is mapped to a torque on its own, then the pair is checked:
//!
//! 1. Both raw samples inside `[min - out_of_range_threshold, max + out_of_range_threshold]`
//!    (unclamped, boundaries inclusive).
//! 2. Channel torques differ by at most `deviation_threshold`, compared on the
//!    exact (rational) torques rather than the rounded ones.
//! 3. Output is the lower of the two torques, rounded down.
//!
//! A rejected pair publishes `{ torque: 0, error: true }`. The validator keeps
//! no state between calls.

use tracing::debug;
use vcu_common::driving_input::{
    ChannelRange, ChannelReading, DrivingInput, FaultReason, THROTTLE_CHANNELS,
    ThrottleCalibration,
};

use crate::state::driving_input::DrivingInputWriter;

/// Pure pedal validator over an immutable calibration.
#[derive(Debug, Clone, Copy)]
pub struct ThrottleValidator {
    calibration: ThrottleCalibration,
}

impl ThrottleValidator {
    pub const fn new(calibration: ThrottleCalibration) -> Self {
        Self { calibration }
    }

    #[inline]
    pub const fn calibration(&self) -> &ThrottleCalibration {
        &self.calibration
    }

    /// Evaluate one channel on its own.
    ///
    /// Torque is computed in integers on the clamped raw value so that exact
    /// calibration points give exact torques. The range check uses the
    /// unclamped value.
    ///
    /// # Panics
    /// If `index >= 2`.
    pub fn channel(&self, index: usize, raw: u16) -> ChannelReading {
        assert!(index < THROTTLE_CHANNELS, "throttle channel index {index}");

        let range = self.calibration.channel(index);
        let span = u32::from(range.span());
        let offset = u32::from(raw.clamp(range.min, range.max) - range.min);
        let max_torque = u32::from(self.calibration.max_torque());

        let threshold = i32::from(self.calibration.out_of_range_threshold());
        let raw_i = i32::from(raw);
        let in_range = raw_i >= i32::from(range.min) - threshold
            && raw_i <= i32::from(range.max) + threshold;

        ChannelReading {
            percentage: offset as f32 * 100.0 / span as f32,
            torque: (offset * max_torque / span) as u16,
            in_range,
        }
    }

    /// Validated torque for a pair of samples, or the first reason to reject it.
    pub fn evaluate(&self, raw0: u16, raw1: u16) -> Result<u16, FaultReason> {
        let ch0 = self.channel(0, raw0);
        let ch1 = self.channel(1, raw1);

        if !ch0.in_range {
            return Err(FaultReason::OutOfRange { channel: 0, raw: raw0 });
        }
        if !ch1.in_range {
            return Err(FaultReason::OutOfRange { channel: 1, raw: raw1 });
        }
        if self.deviation_exceeded(raw0, raw1) {
            return Err(FaultReason::Deviation {
                torque0: ch0.torque,
                torque1: ch1.torque,
            });
        }

        Ok(ch0.torque.min(ch1.torque))
    }

    /// Whether the exact channel torques differ by more than the threshold.
    ///
    /// `|off0/span0 - off1/span1| * max_torque > threshold`, cross-multiplied
    /// so no rounding is involved. Every product stays below 2^49.
    fn deviation_exceeded(&self, raw0: u16, raw1: u16) -> bool {
        let cal = &self.calibration;
        let (off0, span0) = offset_and_span(cal.channel(0), raw0);
        let (off1, span1) = offset_and_span(cal.channel(1), raw1);
        let max_torque = u64::from(cal.max_torque());

        let lhs = (off0 * max_torque * span1).abs_diff(off1 * max_torque * span0);
        lhs > u64::from(cal.deviation_threshold()) * span0 * span1
    }

    /// Driving input for a pair of samples.
    pub fn validate(&self, raw0: u16, raw1: u16) -> DrivingInput {
        match self.evaluate(raw0, raw1) {
            Ok(torque) => DrivingInput::plausible(torque),
            Err(reason) => {
                debug!(raw0, raw1, %reason, "throttle sample rejected");
                DrivingInput::FAULTED
            }
        }
    }

    /// Validate and publish. Exactly one write per call.
    pub fn read_into(&self, raw0: u16, raw1: u16, writer: &mut DrivingInputWriter) -> DrivingInput {
        let input = self.validate(raw0, raw1);
        writer.publish(input);
        input
    }
}

#[inline]
fn offset_and_span(range: ChannelRange, raw: u16) -> (u64, u64) {
    (
        u64::from(raw.clamp(range.min, range.max) - range.min),
        u64::from(range.span()),
    )
}

// ─── Tests ──────────────────────────────────────────────────────────
