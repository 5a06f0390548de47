//! Configuration loading traits and types.
//!
//! The VCU is configured from a single TOML file. Every section maps to one
//! struct below; all of them are validated once by [`VcuConfig::validate`]
//! before any component is constructed.
//!
//! # Usage
//!
//! ```rust,no_run
//! use vcu_common::config::{ConfigError, ConfigLoader, VcuConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = VcuConfig::load(Path::new("config/vcu.toml"))?;
//!     config.validate()?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::consts::{
    ADC_BUFFER_LENGTH_DEFAULT, ADC_BUFFER_LENGTH_MIN, CAN_STANDARD_ID_MAX, CYCLE_TIME_US,
    CYCLE_TIME_US_MAX, CYCLE_TIME_US_MIN, IMPLAUSIBLE_THRESHOLD_MS_DEFAULT,
    IMPLAUSIBLE_THRESHOLD_MS_MAX, MAX_ADC_CHANNELS, MCU_FAULT_COMMAND_ID_DEFAULT,
    MCU_TORQUE_COMMAND_ID_DEFAULT, STATS_INTERVAL_DEFAULT,
};
use crate::driving_input::{CalibrationError, ChannelRange, ThrottleCalibration};

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// Pedal calibration rejected.
    #[error("Invalid sensor calibration: {0}")]
    Calibration(#[from] CalibrationError),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Per-cycle detail (every frame, every rejected sample).
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages, e.g. confirmed implausibility.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Filter directive understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Common fields shared by every VCU service.
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "vcu-01"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    pub service_name: String,
}

impl SharedConfig {
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Trait for loading configuration from TOML files.
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
///
/// Semantic validation is left to the caller.
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

// ─── Sections ───────────────────────────────────────────────────────

/// Control cycle pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CycleConfig {
    /// Cycle period [µs].
    #[serde(default = "default_cycle_time_us")]
    pub cycle_time_us: u32,

    /// Cycles between two statistics log lines (0 disables them).
    #[serde(default = "default_stats_interval")]
    pub stats_interval: u32,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            cycle_time_us: CYCLE_TIME_US,
            stats_interval: STATS_INTERVAL_DEFAULT,
        }
    }
}

impl CycleConfig {
    #[inline]
    pub fn cycle_time(&self) -> Duration {
        Duration::from_micros(u64::from(self.cycle_time_us))
    }
}

fn default_cycle_time_us() -> u32 {
    CYCLE_TIME_US
}
fn default_stats_interval() -> u32 {
    STATS_INTERVAL_DEFAULT
}

/// ADC sample buffer layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdcConfig {
    /// Number of channels in the DMA sample buffer.
    #[serde(default = "default_adc_buffer_length")]
    pub buffer_length: u8,

    /// Buffer index of throttle channel 0.
    #[serde(default)]
    pub throttle_channel0: u8,

    /// Buffer index of throttle channel 1.
    #[serde(default = "default_throttle_channel1")]
    pub throttle_channel1: u8,
}

impl Default for AdcConfig {
    fn default() -> Self {
        Self {
            buffer_length: ADC_BUFFER_LENGTH_DEFAULT,
            throttle_channel0: 0,
            throttle_channel1: 1,
        }
    }
}

fn default_adc_buffer_length() -> u8 {
    ADC_BUFFER_LENGTH_DEFAULT
}
fn default_throttle_channel1() -> u8 {
    1
}

/// Raw pedal calibration as written in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensorConfig {
    pub min_raw0: u16,
    pub max_raw0: u16,
    pub min_raw1: u16,
    pub max_raw1: u16,
    /// Torque commanded at 100% pedal travel.
    pub max_torque: u16,
    /// Raw tolerance beyond the travel window before a channel is unusable.
    pub out_of_range_threshold: u16,
    /// Largest accepted torque difference between the two channels.
    pub deviation_threshold: u16,
}

impl SensorConfig {
    /// Checked calibration for the validator.
    pub fn calibration(&self) -> Result<ThrottleCalibration, CalibrationError> {
        ThrottleCalibration::new(
            ChannelRange {
                min: self.min_raw0,
                max: self.max_raw0,
            },
            ChannelRange {
                min: self.min_raw1,
                max: self.max_raw1,
            },
            self.max_torque,
            self.out_of_range_threshold,
            self.deviation_threshold,
        )
    }
}

/// Fault persistence settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FaultConfig {
    /// How long an implausibility must persist before it is confirmed [ms].
    #[serde(default = "default_implausible_threshold_ms")]
    pub implausible_threshold_ms: u64,
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self {
            implausible_threshold_ms: IMPLAUSIBLE_THRESHOLD_MS_DEFAULT,
        }
    }
}

impl FaultConfig {
    #[inline]
    pub fn implausible_threshold_interval(&self) -> Duration {
        Duration::from_millis(self.implausible_threshold_ms)
    }
}

fn default_implausible_threshold_ms() -> u64 {
    IMPLAUSIBLE_THRESHOLD_MS_DEFAULT
}

/// Motor control unit interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct McuConfig {
    /// Bus identifier of the nominal torque command.
    #[serde(default = "default_torque_command_id")]
    pub torque_command_id: u16,

    /// Bus identifier of the safe/fault command.
    #[serde(default = "default_fault_command_id")]
    pub fault_command_id: u16,
}

impl Default for McuConfig {
    fn default() -> Self {
        Self {
            torque_command_id: MCU_TORQUE_COMMAND_ID_DEFAULT,
            fault_command_id: MCU_FAULT_COMMAND_ID_DEFAULT,
        }
    }
}

fn default_torque_command_id() -> u16 {
    MCU_TORQUE_COMMAND_ID_DEFAULT
}
fn default_fault_command_id() -> u16 {
    MCU_FAULT_COMMAND_ID_DEFAULT
}

// ─── Top-Level Config ───────────────────────────────────────────────

/// Complete VCU configuration. Immutable once validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VcuConfig {
    pub shared: SharedConfig,
    #[serde(default)]
    pub cycle: CycleConfig,
    #[serde(default)]
    pub adc: AdcConfig,
    pub sensor: SensorConfig,
    #[serde(default)]
    pub fault: FaultConfig,
    #[serde(default)]
    pub mcu: McuConfig,
}

impl VcuConfig {
    /// Parse from a TOML string (no validation).
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        let cycle = self.cycle.cycle_time_us;
        if !(CYCLE_TIME_US_MIN..=CYCLE_TIME_US_MAX).contains(&cycle) {
            return Err(ConfigError::ValidationError(format!(
                "cycle_time_us {cycle} out of range [{CYCLE_TIME_US_MIN}, {CYCLE_TIME_US_MAX}]"
            )));
        }

        let adc = &self.adc;
        if adc.buffer_length < ADC_BUFFER_LENGTH_MIN
            || adc.buffer_length as usize > MAX_ADC_CHANNELS
        {
            return Err(ConfigError::ValidationError(format!(
                "adc buffer_length {} out of range [{ADC_BUFFER_LENGTH_MIN}, {MAX_ADC_CHANNELS}]",
                adc.buffer_length
            )));
        }
        for channel in [adc.throttle_channel0, adc.throttle_channel1] {
            if channel >= adc.buffer_length {
                return Err(ConfigError::ValidationError(format!(
                    "throttle channel {channel} outside ADC buffer of length {}",
                    adc.buffer_length
                )));
            }
        }
        if adc.throttle_channel0 == adc.throttle_channel1 {
            return Err(ConfigError::ValidationError(
                "throttle channels must use distinct ADC indices".to_string(),
            ));
        }

        self.sensor.calibration()?;

        if self.fault.implausible_threshold_ms > IMPLAUSIBLE_THRESHOLD_MS_MAX {
            return Err(ConfigError::ValidationError(format!(
                "implausible_threshold_ms {} exceeds {IMPLAUSIBLE_THRESHOLD_MS_MAX}",
                self.fault.implausible_threshold_ms
            )));
        }

        for id in [self.mcu.torque_command_id, self.mcu.fault_command_id] {
            if id > CAN_STANDARD_ID_MAX {
                return Err(ConfigError::ValidationError(format!(
                    "bus id {id:#x} exceeds 11-bit range"
                )));
            }
        }
        if self.mcu.torque_command_id == self.mcu.fault_command_id {
            return Err(ConfigError::ValidationError(
                "torque and fault commands must use distinct bus ids".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[shared]
service_name = "vcu-test"

[sensor]
min_raw0 = 500
max_raw0 = 1000
min_raw1 = 1500
max_raw1 = 2000
max_torque = 500
out_of_range_threshold = 20
deviation_threshold = 50
"#;

    fn minimal() -> VcuConfig {
        VcuConfig::from_toml(MINIMAL).unwrap()
    }

    #[test]
    fn test_log_level_default() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
        assert_eq!(LogLevel::Warn.as_directive(), "warn");
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = minimal();
        assert_eq!(config.shared.log_level, LogLevel::Info);
        assert_eq!(config.cycle, CycleConfig::default());
        assert_eq!(config.adc, AdcConfig::default());
        assert_eq!(config.fault.implausible_threshold_ms, IMPLAUSIBLE_THRESHOLD_MS_DEFAULT);
        assert_eq!(config.mcu, McuConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_durations() {
        let config = minimal();
        assert_eq!(config.cycle.cycle_time(), Duration::from_millis(10));
        assert_eq!(
            config.fault.implausible_threshold_interval(),
            Duration::from_millis(100)
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let toml = format!("{MINIMAL}\n[fault]\nimplausible_ms = 5\n");
        assert!(matches!(
            VcuConfig::from_toml(&toml),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_negative_threshold_is_parse_error() {
        let toml = MINIMAL.replace("deviation_threshold = 50", "deviation_threshold = -1");
        assert!(matches!(
            VcuConfig::from_toml(&toml),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_empty_service_name_rejected() {
        let mut config = minimal();
        config.shared.service_name.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_cycle_time_bounds() {
        let mut config = minimal();
        config.cycle.cycle_time_us = CYCLE_TIME_US_MIN - 1;
        assert!(config.validate().is_err());
        config.cycle.cycle_time_us = CYCLE_TIME_US_MAX;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_adc_channel_outside_buffer() {
        let mut config = minimal();
        config.adc.throttle_channel1 = config.adc.buffer_length;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("outside ADC buffer"));
    }

    #[test]
    fn test_adc_channels_must_differ() {
        let mut config = minimal();
        config.adc.throttle_channel1 = config.adc.throttle_channel0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_width_calibration_is_fatal() {
        let mut config = minimal();
        config.sensor.max_raw1 = config.sensor.min_raw1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Calibration(CalibrationError::EmptyRange { channel: 1, .. }))
        ));
    }

    #[test]
    fn test_bus_ids() {
        let mut config = minimal();
        config.mcu.fault_command_id = config.mcu.torque_command_id;
        assert!(config.validate().is_err());

        let mut config = minimal();
        config.mcu.torque_command_id = 0x800;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_implausible_threshold_upper_bound() {
        let mut config = minimal();
        config.fault.implausible_threshold_ms = IMPLAUSIBLE_THRESHOLD_MS_MAX + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_loader_file_not_found() {
        let result = VcuConfig::load(Path::new("/nonexistent/path/vcu.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound)));
    }

    #[test]
    fn test_config_loader_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "invalid toml {{{{").unwrap();

        let result = VcuConfig::load(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_config_loader_success() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{MINIMAL}
[cycle]
cycle_time_us = 5000

[mcu]
torque_command_id = 0x200
fault_command_id = 0x201
"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = VcuConfig::load(file.path()).unwrap();
        assert_eq!(config.cycle.cycle_time_us, 5000);
        assert_eq!(config.cycle.stats_interval, STATS_INTERVAL_DEFAULT);
        assert_eq!(config.mcu.torque_command_id, 0x200);
        assert_eq!(config.sensor.max_torque, 500);
        assert!(config.validate().is_ok());
    }
}
