mod concurrent_reader;
mod config_loading;
mod fault_escalation;
mod scenarios;

use vcu_common::config::VcuConfig;

/// Reference calibration used throughout the integration tests.
pub const REFERENCE_TOML: &str = r#"
[shared]
service_name = "vcu-it"

[cycle]
cycle_time_us = 10000
stats_interval = 0

[adc]
buffer_length = 4
throttle_channel0 = 0
throttle_channel1 = 1

[sensor]
min_raw0 = 500
max_raw0 = 1000
min_raw1 = 1500
max_raw1 = 2000
max_torque = 500
out_of_range_threshold = 20
deviation_threshold = 50

[fault]
implausible_threshold_ms = 100

[mcu]
torque_command_id = 0x0C0
fault_command_id = 0x0C1
"#;

pub fn reference_config() -> VcuConfig {
    let config = VcuConfig::from_toml(REFERENCE_TOML).unwrap();
    config.validate().unwrap();
    config
}
