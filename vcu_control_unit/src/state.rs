//! Shared cycle state.
//!
//! Values published by one stage of the cycle and read by the stages after it
//! (and by observers on other threads).

pub mod driving_input;
