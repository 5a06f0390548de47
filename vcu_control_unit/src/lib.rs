//! # VCU Control Unit Library
//!
//! Driving-input core of a vehicle control unit. Each cycle it samples the two
//! accelerator pedal channels, validates them into a torque request, debounces
//! implausibilities over time and sends exactly one command frame to the motor
//! control unit.
//!
//! ## Cycle Order
//!
//! 1. **Sample** both pedal channels ([`io::SampleSource`])
//! 2. **Validate** into the driving-input cell ([`sensor::throttle`])
//! 3. **Debounce** the error flag ([`fault::persistence`])
//! 4. **Dispatch** one frame ([`dispatch::mcu`])
//!
//! Hardware is reached only through the traits in [`io`]; [`io::sim`] provides
//! in-process implementations for the simulator binary and tests.

pub mod cycle;
pub mod dispatch;
pub mod fault;
pub mod io;
pub mod sensor;
pub mod state;
