//! Collaborator interfaces of the driving-input core.
//!
//! The core never touches a hardware handle. Sampling, transmission and
//! time are injected through the three traits below.
//!
//! # Contracts
//!
//! | Trait          | Operation  | Constraint |
//! |----------------|------------|------------|
//! | `SampleSource` | `sample()` | latest buffered value, never blocks |
//! | `BusTransport` | `send()`   | best-effort enqueue, never blocks |
//! | `Clock`        | `now()`    | monotonic |

use std::time::Instant;

use thiserror::Error;
use vcu_common::mcu::McuFrame;

pub mod sim;

/// Failure to obtain a raw sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SampleError {
    /// Requested channel lies outside the sample buffer.
    #[error("ADC channel {channel} outside buffer of length {len}")]
    ChannelOutOfRange { channel: u8, len: usize },

    /// Buffer cannot hold the requested number of channels.
    #[error("ADC buffer length {len} exceeds {max}")]
    BufferTooLong { len: usize, max: usize },
}

/// Failure to hand a frame to the bus.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Transmit mailbox or queue full; the frame was dropped.
    #[error("transmit queue full")]
    QueueFull,

    /// Bus is off or the controller is not started.
    #[error("bus unavailable: {0}")]
    Unavailable(String),
}

/// Source of raw analog samples, one value per ADC channel.
pub trait SampleSource {
    /// Most recent sample of `channel`.
    fn sample(&self, channel: u8) -> Result<u16, SampleError>;
}

/// Outbound vehicle bus.
pub trait BusTransport {
    /// Enqueue `frame` for transmission.
    fn send(&mut self, frame: &McuFrame) -> Result<(), TransportError>;
}

/// Monotonic time source.
pub trait Clock {
    fn now(&self) -> Instant;
}

impl<S: SampleSource + ?Sized> SampleSource for &S {
    fn sample(&self, channel: u8) -> Result<u16, SampleError> {
        (**self).sample(channel)
    }
}

impl<T: BusTransport + ?Sized> BusTransport for &mut T {
    fn send(&mut self, frame: &McuFrame) -> Result<(), TransportError> {
        (**self).send(frame)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}
