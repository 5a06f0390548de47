//! Fault detection over time.

pub mod persistence;
