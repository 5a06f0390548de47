//! Control cycle: sample → validate → debounce → dispatch.
//!
//! [`ControlCycle`] owns one instance of every stage and runs them in strict
//! order on each [`ControlCycle::step`]. [`CycleRunner`] paces `step()` at the
//! configured cycle time, keeps [`CycleStats`] and stops on the shared
//! `running` flag or after an optional cycle limit.
//!
//! ## Cycle Body
//! 1. Read both throttle channels from the sample source.
//! 2. Validate and publish into the driving-input cell (one write).
//! 3. Feed the cell's error flag to the persistence tracker.
//! 4. Dispatch one frame from the cell and the tracker's verdict.
//!
//! A channel that cannot be sampled counts as an implausible reading for that
//! cycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};
use vcu_common::config::{ConfigError, VcuConfig};
use vcu_common::driving_input::{DrivingInput, FaultReason};
use vcu_common::mcu::McuCommand;

use crate::dispatch::mcu::McuDispatcher;
use crate::fault::persistence::{FaultPersistenceTracker, FaultPhase};
use crate::io::{BusTransport, Clock, SampleError, SampleSource};
use crate::sensor::throttle::ThrottleValidator;
use crate::state::driving_input::{DrivingInputReader, DrivingInputWriter, driving_input_cell};

// ─── Errors ─────────────────────────────────────────────────────────

/// Errors while building or running the cycle.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Writing the simulated sample buffer failed.
    #[error("sample buffer: {0}")]
    Sample(#[from] SampleError),
}

// ─── Control Cycle ──────────────────────────────────────────────────

/// Outcome of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Value published to the driving-input cell.
    pub input: DrivingInput,
    /// Tracker state after this cycle's update.
    pub phase: FaultPhase,
    /// Command handed to the transport.
    pub command: McuCommand,
}

/// One driving-input pipeline wired to its collaborators.
#[derive(Debug)]
pub struct ControlCycle<S: SampleSource, T: BusTransport, C: Clock> {
    source: S,
    clock: C,
    channels: [u8; 2],
    validator: ThrottleValidator,
    writer: DrivingInputWriter,
    reader: DrivingInputReader,
    tracker: FaultPersistenceTracker,
    dispatcher: McuDispatcher<T>,
}

impl<S: SampleSource, T: BusTransport, C: Clock> ControlCycle<S, T, C> {
    /// Build the pipeline from a configuration.
    ///
    /// Fails if the sensor calibration is invalid. The rest of the
    /// configuration is expected to have passed [`VcuConfig::validate`].
    pub fn new(config: &VcuConfig, source: S, transport: T, clock: C) -> Result<Self, CycleError> {
        let calibration = config
            .sensor
            .calibration()
            .map_err(ConfigError::from)?;
        let (writer, reader) = driving_input_cell();

        Ok(Self {
            source,
            clock,
            channels: [config.adc.throttle_channel0, config.adc.throttle_channel1],
            validator: ThrottleValidator::new(calibration),
            dispatcher: McuDispatcher::new(reader.clone(), transport, config.mcu),
            writer,
            reader,
            tracker: FaultPersistenceTracker::new(config.fault.implausible_threshold_interval()),
        })
    }

    /// Run one cycle.
    pub fn step(&mut self) -> CycleReport {
        let input = match self.sample_pair() {
            Ok((raw0, raw1)) => self.validator.read_into(raw0, raw1, &mut self.writer),
            Err(reason) => {
                debug!(%reason, "throttle sample rejected");
                self.writer.publish(DrivingInput::FAULTED);
                DrivingInput::FAULTED
            }
        };

        let phase = self.tracker.update(self.reader.read().error, self.clock.now());
        let command = self.dispatcher.dispatch(phase.is_confirmed());

        CycleReport {
            input,
            phase,
            command,
        }
    }

    fn sample_pair(&self) -> Result<(u16, u16), FaultReason> {
        let [ch0, ch1] = self.channels;
        let read = |channel: u8| {
            self.source
                .sample(channel)
                .map_err(|_| FaultReason::SampleUnavailable { channel })
        };
        Ok((read(ch0)?, read(ch1)?))
    }

    /// New read handle on the driving-input cell.
    pub fn reader(&self) -> DrivingInputReader {
        self.reader.clone()
    }

    #[inline]
    pub fn validator(&self) -> &ThrottleValidator {
        &self.validator
    }

    #[inline]
    pub fn tracker(&self) -> &FaultPersistenceTracker {
        &self.tracker
    }

    #[inline]
    pub fn dispatcher(&self) -> &McuDispatcher<T> {
        &self.dispatcher
    }

    #[inline]
    pub fn dispatcher_mut(&mut self) -> &mut McuDispatcher<T> {
        &mut self.dispatcher
    }

    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    #[inline]
    pub fn clock(&self) -> &C {
        &self.clock
    }
}

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-cycle timing and fault statistics.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Last cycle duration [ns].
    pub last_cycle_ns: u64,
    /// Minimum cycle duration [ns].
    pub min_cycle_ns: u64,
    /// Maximum cycle duration [ns].
    pub max_cycle_ns: u64,
    /// Running sum for average computation.
    pub sum_cycle_ns: u128,
    /// Cycles that took longer than the cycle time.
    pub overruns: u64,
    /// Cycles that published an error.
    pub implausible_cycles: u64,
    /// Cycles that sent a fault command.
    pub fault_commands: u64,
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: u64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
            implausible_cycles: 0,
            fault_commands: 0,
        }
    }

    /// Record one cycle.
    #[inline]
    pub fn record(&mut self, duration: Duration, report: &CycleReport) {
        let duration_ns = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        self.min_cycle_ns = self.min_cycle_ns.min(duration_ns);
        self.max_cycle_ns = self.max_cycle_ns.max(duration_ns);
        self.sum_cycle_ns += u128::from(duration_ns);
        if report.input.error {
            self.implausible_cycles += 1;
        }
        if report.command.is_fault() {
            self.fault_commands += 1;
        }
    }

    /// Average cycle time [ns] (0 if no cycles).
    #[inline]
    pub fn avg_cycle_ns(&self) -> u64 {
        if self.cycle_count == 0 {
            0
        } else {
            (self.sum_cycle_ns / u128::from(self.cycle_count)) as u64
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Cycle Runner ───────────────────────────────────────────────────

/// Paces a [`ControlCycle`] with `std::thread::sleep`.
#[derive(Debug)]
pub struct CycleRunner<S: SampleSource, T: BusTransport, C: Clock> {
    cycle: ControlCycle<S, T, C>,
    cycle_time: Duration,
    stats_interval: u64,
    max_cycles: Option<u64>,
    running: Arc<AtomicBool>,
    stats: CycleStats,
}

impl<S: SampleSource, T: BusTransport, C: Clock> CycleRunner<S, T, C> {
    pub fn new(cycle: ControlCycle<S, T, C>, config: &VcuConfig) -> Self {
        Self {
            cycle,
            cycle_time: config.cycle.cycle_time(),
            stats_interval: u64::from(config.cycle.stats_interval),
            max_cycles: None,
            running: Arc::new(AtomicBool::new(true)),
            stats: CycleStats::new(),
        }
    }

    /// Stop after `limit` cycles.
    pub fn with_max_cycles(mut self, limit: Option<u64>) -> Self {
        self.max_cycles = limit;
        self
    }

    /// Flag that keeps the loop alive; clear it to stop after the current cycle.
    pub fn running(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    #[inline]
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    #[inline]
    pub fn cycle(&self) -> &ControlCycle<S, T, C> {
        &self.cycle
    }

    /// Run until the running flag clears or the cycle limit is reached.
    ///
    /// `before_step` is called with the cycle number ahead of every `step()`;
    /// the simulator uses it to refresh the sample buffer.
    pub fn run<F>(&mut self, mut before_step: F) -> Result<(), CycleError>
    where
        F: FnMut(u64) -> Result<(), CycleError>,
    {
        info!(
            cycle_time_us = self.cycle_time.as_micros() as u64,
            max_cycles = ?self.max_cycles,
            "entering control cycle"
        );

        while self.running.load(Ordering::SeqCst) {
            if self
                .max_cycles
                .is_some_and(|limit| self.stats.cycle_count >= limit)
            {
                break;
            }

            let cycle_start = Instant::now();

            before_step(self.stats.cycle_count)?;
            let report = self.cycle.step();

            let elapsed = cycle_start.elapsed();
            self.stats.record(elapsed, &report);

            if elapsed > self.cycle_time {
                self.stats.overruns += 1;
                warn!(
                    cycle = self.stats.cycle_count,
                    elapsed_us = elapsed.as_micros() as u64,
                    "cycle overrun"
                );
            }

            if self.stats_interval > 0 && self.stats.cycle_count % self.stats_interval == 0 {
                self.log_stats();
            }

            if let Some(remaining) = self.cycle_time.checked_sub(elapsed) {
                std::thread::sleep(remaining);
            }
        }

        self.log_stats();
        Ok(())
    }

    fn log_stats(&self) {
        let s = &self.stats;
        info!(
            cycles = s.cycle_count,
            avg_ns = s.avg_cycle_ns(),
            max_ns = s.max_cycle_ns,
            overruns = s.overruns,
            implausible = s.implausible_cycles,
            fault_commands = s.fault_commands,
            send_failures = self.cycle.dispatcher().send_failures(),
            "cycle stats"
        );
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
