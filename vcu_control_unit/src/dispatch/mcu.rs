//! Motor control unit command dispatch.
//!
//! One frame per cycle: a torque command while the input is trusted, a
//! zero-torque fault command while an implausibility is confirmed. A frame the
//! transport rejects is counted and dropped; the next cycle sends a fresh one.

use tracing::warn;
use vcu_common::config::McuConfig;
use vcu_common::driving_input::DrivingInput;
use vcu_common::mcu::{FaultCode, McuCommand};

use crate::io::BusTransport;
use crate::state::driving_input::DrivingInputReader;

/// Command for one cycle: fault while confirmed, the published torque otherwise.
#[inline]
pub const fn command_for(input: DrivingInput, confirmed: bool) -> McuCommand {
    if confirmed {
        McuCommand::Fault {
            code: FaultCode::ThrottleImplausible,
        }
    } else {
        McuCommand::Torque {
            torque: input.torque,
        }
    }
}

/// Turns the published driving input into MCU bus frames.
#[derive(Debug)]
pub struct McuDispatcher<T: BusTransport> {
    input: DrivingInputReader,
    transport: T,
    config: McuConfig,
    sent: u64,
    send_failures: u64,
}

impl<T: BusTransport> McuDispatcher<T> {
    pub fn new(input: DrivingInputReader, transport: T, config: McuConfig) -> Self {
        Self {
            input,
            transport,
            config,
            sent: 0,
            send_failures: 0,
        }
    }

    /// Read the driving-input cell and send this cycle's frame.
    pub fn dispatch(&mut self, confirmed: bool) -> McuCommand {
        let input = self.input.read();
        self.dispatch_input(input, confirmed)
    }

    /// Send the frame for `input`. Exactly one frame reaches the transport.
    pub fn dispatch_input(&mut self, input: DrivingInput, confirmed: bool) -> McuCommand {
        let command = command_for(input, confirmed);
        let frame = command.encode(&self.config);

        match self.transport.send(&frame) {
            Ok(()) => self.sent += 1,
            Err(e) => {
                self.send_failures += 1;
                warn!(id = frame.id, failures = self.send_failures, "MCU frame dropped: {e}");
            }
        }
        command
    }

    /// Frames accepted by the transport.
    #[inline]
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Frames the transport refused.
    #[inline]
    pub fn send_failures(&self) -> u64 {
        self.send_failures
    }

    #[inline]
    pub fn config(&self) -> &McuConfig {
        &self.config
    }

    #[inline]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[inline]
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}
