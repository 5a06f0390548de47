//! Outbound command dispatch.

pub mod mcu;
