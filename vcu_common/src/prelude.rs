//! Prelude module for common re-exports.
//!
//! ```rust
//! use vcu_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{
    AdcConfig, ConfigError, ConfigLoader, CycleConfig, FaultConfig, LogLevel, McuConfig,
    SensorConfig, SharedConfig, VcuConfig,
};

// ─── Driving Input ──────────────────────────────────────────────────
pub use crate::driving_input::{
    CalibrationError, ChannelRange, ChannelReading, DrivingInput, FaultReason,
    ThrottleCalibration,
};

// ─── MCU ────────────────────────────────────────────────────────────
pub use crate::mcu::{FaultCode, McuCommand, McuFrame};
