//! System-wide constants for the VCU workspace.
//!
//! Single source of truth for numeric limits and defaults.

/// Default control cycle time in microseconds (100 Hz).
pub const CYCLE_TIME_US: u32 = 10_000;

/// Lower bound for `cycle_time_us`.
pub const CYCLE_TIME_US_MIN: u32 = 1_000;

/// Upper bound for `cycle_time_us`.
pub const CYCLE_TIME_US_MAX: u32 = 100_000;

/// Default number of cycles between cycle statistics log lines.
pub const STATS_INTERVAL_DEFAULT: u32 = 500;

/// Maximum number of ADC channels in the DMA sample buffer.
pub const MAX_ADC_CHANNELS: usize = 16;

/// Minimum ADC buffer length (two throttle channels).
pub const ADC_BUFFER_LENGTH_MIN: u8 = 2;

/// Default ADC buffer length.
pub const ADC_BUFFER_LENGTH_DEFAULT: u8 = 4;

/// Default time an implausibility must persist before it is confirmed [ms].
pub const IMPLAUSIBLE_THRESHOLD_MS_DEFAULT: u64 = 100;

/// Upper bound for `implausible_threshold_ms`.
pub const IMPLAUSIBLE_THRESHOLD_MS_MAX: u64 = 10_000;

/// Default bus identifier of the MCU torque command.
pub const MCU_TORQUE_COMMAND_ID_DEFAULT: u16 = 0x0C0;

/// Default bus identifier of the MCU fault command.
pub const MCU_FAULT_COMMAND_ID_DEFAULT: u16 = 0x0C1;

/// Highest standard (11-bit) CAN identifier.
pub const CAN_STANDARD_ID_MAX: u16 = 0x7FF;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/vcu.toml";
