//! VCU Common Library
//!
//! Shared types and configuration for the vehicle control unit workspace.
//!
//! # Module Structure
//!
//! - [`consts`] - System-wide limits and defaults
//! - [`config`] - TOML configuration sections, loading and validation
//! - [`driving_input`] - Pedal calibration and the per-cycle driving input value
//! - [`mcu`] - Motor control unit commands and their bus frames
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use vcu_common::prelude::*;
//! ```

pub mod config;
pub mod consts;
pub mod driving_input;
pub mod mcu;
pub mod prelude;
