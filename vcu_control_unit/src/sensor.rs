//! Sensor plausibility checks.

pub mod throttle;
