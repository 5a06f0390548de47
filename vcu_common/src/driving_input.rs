//! Driving-input types shared between the validator and its consumers.
//!
//! `ThrottleCalibration` is the immutable per-pedal calibration, checked once
//! at construction. `DrivingInput` is the value published every cycle.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of redundant accelerator pedal channels.
pub const THROTTLE_CHANNELS: usize = 2;

// ─── Calibration ────────────────────────────────────────────────────

/// Rejected calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CalibrationError {
    /// The raw travel window of a channel is empty or inverted.
    #[error("channel {channel}: max_raw ({max}) must be greater than min_raw ({min})")]
    EmptyRange { channel: u8, min: u16, max: u16 },

    /// A zero maximum torque would make every command zero.
    #[error("max_torque must be greater than zero")]
    ZeroMaxTorque,
}

/// Raw travel window of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRange {
    /// Raw sample at 0% pedal travel.
    pub min: u16,
    /// Raw sample at 100% pedal travel.
    pub max: u16,
}

impl ChannelRange {
    /// Width of the travel window in raw counts.
    #[inline]
    pub const fn span(&self) -> u16 {
        self.max - self.min
    }
}

/// Calibration of the dual-channel accelerator pedal sensor.
///
/// Immutable after construction and `Copy`, so it can be handed to any
/// number of components without synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleCalibration {
    channels: [ChannelRange; THROTTLE_CHANNELS],
    max_torque: u16,
    out_of_range_threshold: u16,
    deviation_threshold: u16,
}

impl ThrottleCalibration {
    /// Build a calibration, rejecting empty travel windows and zero torque.
    pub fn new(
        channel0: ChannelRange,
        channel1: ChannelRange,
        max_torque: u16,
        out_of_range_threshold: u16,
        deviation_threshold: u16,
    ) -> Result<Self, CalibrationError> {
        for (channel, range) in [channel0, channel1].iter().enumerate() {
            if range.max <= range.min {
                return Err(CalibrationError::EmptyRange {
                    channel: channel as u8,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        if max_torque == 0 {
            return Err(CalibrationError::ZeroMaxTorque);
        }

        Ok(Self {
            channels: [channel0, channel1],
            max_torque,
            out_of_range_threshold,
            deviation_threshold,
        })
    }

    /// Travel window of channel `index` (0 or 1).
    #[inline]
    pub const fn channel(&self, index: usize) -> ChannelRange {
        self.channels[index]
    }

    #[inline]
    pub const fn max_torque(&self) -> u16 {
        self.max_torque
    }

    #[inline]
    pub const fn out_of_range_threshold(&self) -> u16 {
        self.out_of_range_threshold
    }

    #[inline]
    pub const fn deviation_threshold(&self) -> u16 {
        self.deviation_threshold
    }
}

// ─── Per-Cycle Values ───────────────────────────────────────────────

/// Validated driving input published every cycle.
///
/// `error == true` always comes with `torque == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DrivingInput {
    /// Torque command [torque units, 0..=max_torque].
    pub torque: u16,
    /// Set when the pedal reading was rejected this cycle.
    pub error: bool,
}

impl DrivingInput {
    /// Rejected reading: zero torque, error set.
    pub const FAULTED: Self = Self {
        torque: 0,
        error: true,
    };

    /// Plausible reading carrying `torque`.
    #[inline]
    pub const fn plausible(torque: u16) -> Self {
        Self {
            torque,
            error: false,
        }
    }
}

/// Result of evaluating a single channel for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelReading {
    /// Pedal travel [%], clamped to `0.0..=100.0`.
    pub percentage: f32,
    /// Torque derived from this channel alone, clamped to `0..=max_torque`.
    pub torque: u16,
    /// Raw sample lies inside the out-of-range tolerance band.
    pub in_range: bool,
}

/// Why a pair of samples was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FaultReason {
    /// A raw sample lies outside `[min - threshold, max + threshold]`.
    #[error("channel {channel} out of range (raw {raw})")]
    OutOfRange { channel: u8, raw: u16 },

    /// The channels disagree by more than the deviation threshold.
    #[error("channel deviation {torque0} vs {torque1}")]
    Deviation { torque0: u16, torque1: u16 },

    /// No sample could be read for a channel.
    #[error("channel {channel} sample unavailable")]
    SampleUnavailable { channel: u8 },
}
