//! Integration test: configuration file loading and validation.

use std::io::Write;

use tempfile::NamedTempFile;
use vcu_common::config::{ConfigError, ConfigLoader, VcuConfig};
use vcu_control_unit::cycle::ControlCycle;
use vcu_control_unit::io::sim::{AdcBuffer, LogTransport, MonotonicClock};

use super::REFERENCE_TOML;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn load_reference_file_and_build_cycle() {
    let file = write_config(REFERENCE_TOML);
    let config = VcuConfig::load(file.path()).unwrap();
    config.validate().unwrap();

    let adc = AdcBuffer::new(usize::from(config.adc.buffer_length)).unwrap();
    let cycle = ControlCycle::new(&config, &adc, LogTransport::new(), MonotonicClock).unwrap();
    assert_eq!(cycle.validator().calibration().max_torque(), 500);
    assert_eq!(
        cycle.tracker().threshold(),
        std::time::Duration::from_millis(100)
    );
}

#[test]
fn shipped_config_is_valid() {
    let content = include_str!("../../config/vcu.toml");
    let config = VcuConfig::from_toml(content).unwrap();
    assert!(config.validate().is_ok());
}

#[test]
fn missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let result = VcuConfig::load(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::FileNotFound)));
}

#[test]
fn inverted_calibration_fails_validation() {
    let content = REFERENCE_TOML.replace("max_raw1 = 2000", "max_raw1 = 1400");
    let file = write_config(&content);
    let config = VcuConfig::load(file.path()).unwrap();
    assert!(matches!(config.validate(), Err(ConfigError::Calibration(_))));
}

#[test]
fn unknown_field_is_a_parse_error() {
    let content = REFERENCE_TOML.replace("[fault]", "[fault]\nretries = 3");
    let file = write_config(&content);
    assert!(matches!(
        VcuConfig::load(file.path()),
        Err(ConfigError::ParseError(_))
    ));
}
