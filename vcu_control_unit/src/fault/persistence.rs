//! Fault persistence (debounce) for the driving-input error flag.
//!
//! ```text
//!            error                 error && elapsed >= interval
//!   Idle ───────────▶ Faulting(t) ──────────────────────────────▶ Confirmed(t)
//!    ▲                    │                                          │
//!    └──── !error ────────┴──────────────── !error ──────────────────┘
//! ```
//!
//! Only a continuous run of errors reaches `Confirmed`; a single cycle without
//! error returns to `Idle` and discards the timer. Elapsed time is measured on
//! a monotonic clock, never a cycle counter.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

/// Tracker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPhase {
    /// No error observed in the latest update.
    Idle,
    /// Error present since `since`, not yet long enough to confirm.
    Faulting { since: Instant },
    /// Error present since `since` for at least the threshold interval.
    Confirmed { since: Instant },
}

impl FaultPhase {
    #[inline]
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }

    #[inline]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Start of the current error run, if any.
    #[inline]
    const fn since(&self) -> Option<Instant> {
        match self {
            Self::Idle => None,
            Self::Faulting { since } | Self::Confirmed { since } => Some(*since),
        }
    }
}

/// Debounces the error flag into a confirmed implausibility.
#[derive(Debug, Clone)]
pub struct FaultPersistenceTracker {
    phase: FaultPhase,
    threshold: Duration,
}

impl FaultPersistenceTracker {
    /// `implausible_threshold_interval`: how long an error must persist.
    pub const fn new(implausible_threshold_interval: Duration) -> Self {
        Self {
            phase: FaultPhase::Idle,
            threshold: implausible_threshold_interval,
        }
    }

    #[inline]
    pub const fn phase(&self) -> FaultPhase {
        self.phase
    }

    #[inline]
    pub const fn is_confirmed(&self) -> bool {
        self.phase.is_confirmed()
    }

    #[inline]
    pub const fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Length of the current error run at `now` (zero when idle).
    pub fn fault_duration(&self, now: Instant) -> Duration {
        self.phase
            .since()
            .map_or(Duration::ZERO, |since| now.saturating_duration_since(since))
    }

    /// Feed the error flag observed at `now`.
    pub fn update(&mut self, error: bool, now: Instant) -> FaultPhase {
        self.phase = match (self.phase, error) {
            (FaultPhase::Idle, false) => FaultPhase::Idle,

            (FaultPhase::Idle, true) => {
                debug!("driving input implausible, starting persistence timer");
                self.escalate(now, now)
            }

            (FaultPhase::Faulting { since }, true) => self.escalate(since, now),

            (FaultPhase::Faulting { since }, false) => {
                debug!(
                    duration_ms = now.saturating_duration_since(since).as_millis() as u64,
                    "transient implausibility cleared"
                );
                FaultPhase::Idle
            }

            (FaultPhase::Confirmed { since }, true) => FaultPhase::Confirmed { since },

            (FaultPhase::Confirmed { since }, false) => {
                info!(
                    duration_ms = now.saturating_duration_since(since).as_millis() as u64,
                    "implausibility resolved"
                );
                FaultPhase::Idle
            }
        };
        self.phase
    }

    fn escalate(&self, since: Instant, now: Instant) -> FaultPhase {
        if now.saturating_duration_since(since) >= self.threshold {
            warn!(
                threshold_ms = self.threshold.as_millis() as u64,
                "implausibility confirmed"
            );
            FaultPhase::Confirmed { since }
        } else {
            FaultPhase::Faulting { since }
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
