//! In-process collaborators for simulation and tests.
//!
//! - [`AdcBuffer`] - DMA-style sample buffer, one atomic slot per channel
//! - [`RecordingTransport`] - keeps every frame, can be told to fail
//! - [`LogTransport`] - traces every frame
//! - [`MonotonicClock`] / [`ManualClock`] - real and hand-advanced time
//! - [`PedalSimulator`] - sweeps both pedal channels, optional fault window

use std::cell::Cell;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::{Duration, Instant};

use heapless::Vec as FixedVec;
use tracing::trace;
use vcu_common::consts::MAX_ADC_CHANNELS;
use vcu_common::driving_input::ThrottleCalibration;
use vcu_common::mcu::McuFrame;

use super::{BusTransport, Clock, SampleError, SampleSource, TransportError};

// ─── ADC Buffer ─────────────────────────────────────────────────────

/// Fixed-length sample buffer written by the converter, read by the core.
///
/// Each slot is an independent atomic, so the producer may run on another
/// thread (or stand in for a DMA engine) while the cycle reads.
#[derive(Debug)]
pub struct AdcBuffer {
    slots: FixedVec<AtomicU16, MAX_ADC_CHANNELS>,
}

impl AdcBuffer {
    /// Zero-initialised buffer of `len` channels.
    ///
    /// Fails if `len` exceeds [`MAX_ADC_CHANNELS`].
    pub fn new(len: usize) -> Result<Self, SampleError> {
        let mut slots = FixedVec::new();
        for _ in 0..len {
            slots
                .push(AtomicU16::new(0))
                .map_err(|_| SampleError::BufferTooLong {
                    len,
                    max: MAX_ADC_CHANNELS,
                })?;
        }
        Ok(Self { slots })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Store a new conversion result for `channel`.
    pub fn set(&self, channel: u8, value: u16) -> Result<(), SampleError> {
        self.slot(channel)?.store(value, Ordering::Release);
        Ok(())
    }

    fn slot(&self, channel: u8) -> Result<&AtomicU16, SampleError> {
        self.slots
            .get(channel as usize)
            .ok_or(SampleError::ChannelOutOfRange {
                channel,
                len: self.slots.len(),
            })
    }
}

impl SampleSource for AdcBuffer {
    fn sample(&self, channel: u8) -> Result<u16, SampleError> {
        Ok(self.slot(channel)?.load(Ordering::Acquire))
    }
}

// ─── Transports ─────────────────────────────────────────────────────

/// Transport that records frames in memory.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    frames: Vec<McuFrame>,
    fail_remaining: u32,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next `count` frames with [`TransportError::QueueFull`].
    pub fn fail_next(&mut self, count: u32) {
        self.fail_remaining = count;
    }

    /// Frames accepted so far, oldest first.
    pub fn frames(&self) -> &[McuFrame] {
        &self.frames
    }

    pub fn last(&self) -> Option<&McuFrame> {
        self.frames.last()
    }
}

impl BusTransport for RecordingTransport {
    fn send(&mut self, frame: &McuFrame) -> Result<(), TransportError> {
        if self.fail_remaining > 0 {
            self.fail_remaining -= 1;
            return Err(TransportError::QueueFull);
        }
        self.frames.push(*frame);
        Ok(())
    }
}

/// Transport that only traces frames. Used by the simulator binary.
#[derive(Debug, Default)]
pub struct LogTransport {
    sent: u64,
}

impl LogTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl BusTransport for LogTransport {
    fn send(&mut self, frame: &McuFrame) -> Result<(), TransportError> {
        self.sent += 1;
        trace!(id = frame.id, data = ?frame.data, "tx");
        Ok(())
    }
}

// ─── Clocks ─────────────────────────────────────────────────────────

/// Wall-clock independent monotonic time.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

// ─── Pedal Simulator ────────────────────────────────────────────────

/// Triangle-wave pedal driving both channels of an [`AdcBuffer`].
///
/// Position ramps 0% → 100% → 0% over `period` cycles. During an injected
/// fault window channel 1 reads 0, as if its wire were cut.
#[derive(Debug, Clone)]
pub struct PedalSimulator {
    calibration: ThrottleCalibration,
    channels: [u8; 2],
    period: u32,
    cycle: u64,
    fault_window: Option<(u64, u64)>,
}

impl PedalSimulator {
    pub fn new(calibration: ThrottleCalibration, channels: [u8; 2], period: u32) -> Self {
        Self {
            calibration,
            channels,
            period: period.max(2),
            cycle: 0,
            fault_window: None,
        }
    }

    /// Cut channel 1 for `length` cycles starting at cycle `start`.
    pub fn inject_fault(&mut self, start: u64, length: u64) {
        self.fault_window = Some((start, start.saturating_add(length)));
    }

    /// Pedal travel [%] at the current cycle.
    pub fn position(&self) -> u32 {
        let half = u64::from(self.period / 2).max(1);
        let phase = self.cycle % (2 * half);
        let ramp = if phase < half { phase } else { 2 * half - phase };
        (ramp * 100 / half) as u32
    }

    /// Whether the current cycle lies inside the injected fault window.
    pub fn fault_active(&self) -> bool {
        self.fault_window
            .is_some_and(|(start, end)| (start..end).contains(&self.cycle))
    }

    /// Write the current samples into `adc` and advance one cycle.
    pub fn tick(&mut self, adc: &AdcBuffer) -> Result<(), SampleError> {
        let position = self.position();
        for (index, &channel) in self.channels.iter().enumerate() {
            let range = self.calibration.channel(index);
            let raw = u32::from(range.min) + u32::from(range.span()) * position / 100;
            let raw = if index == 1 && self.fault_active() {
                0
            } else {
                raw as u16
            };
            adc.set(channel, raw)?;
        }
        self.cycle += 1;
        Ok(())
    }
}
