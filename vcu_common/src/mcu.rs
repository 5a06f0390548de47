//! Commands sent from the VCU to the motor control unit and their bus frames.
//!
//! ## Frame Layout (8 data bytes, little-endian)
//!
//! | Byte | Torque command          | Fault command              |
//! |------|-------------------------|----------------------------|
//! | 0..2 | torque                  | 0                          |
//! | 2    | `McuCommandFlags::ENABLE` | `McuCommandFlags::FAULT` |
//! | 3    | 0                       | `FaultCode`                |
//! | 4..8 | 0                       | 0                          |

use bitflags::bitflags;
use static_assertions::const_assert;
use thiserror::Error;

use crate::config::McuConfig;

/// Data length of every MCU frame.
pub const MCU_FRAME_DLC: u8 = 8;

const TORQUE_OFFSET: usize = 0;
const FLAGS_OFFSET: usize = 2;
const FAULT_CODE_OFFSET: usize = 3;

// Fields must not overlap and must lie inside the transmitted bytes.
const_assert!(TORQUE_OFFSET + 2 <= FLAGS_OFFSET);
const_assert!(FLAGS_OFFSET < FAULT_CODE_OFFSET);
const_assert!(FAULT_CODE_OFFSET < MCU_FRAME_DLC as usize);

bitflags! {
    /// Command flags carried in byte 2.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct McuCommandFlags: u8 {
        /// Torque request is valid and may be applied.
        const ENABLE = 0x01;
        /// Input cannot be trusted; apply zero torque.
        const FAULT  = 0x02;
    }
}

impl Default for McuCommandFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Reason code carried by a fault command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FaultCode {
    /// Accelerator pedal channels implausible for longer than the threshold.
    ThrottleImplausible = 1,
}

impl FaultCode {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::ThrottleImplausible),
            _ => None,
        }
    }
}

/// One outbound command per control cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McuCommand {
    /// Nominal torque request.
    Torque { torque: u16 },
    /// Safe command: zero torque with an explicit error indication.
    Fault { code: FaultCode },
}

impl McuCommand {
    /// Torque carried by this command (always 0 for a fault command).
    #[inline]
    pub const fn torque(&self) -> u16 {
        match self {
            Self::Torque { torque } => *torque,
            Self::Fault { .. } => 0,
        }
    }

    #[inline]
    pub const fn is_fault(&self) -> bool {
        matches!(self, Self::Fault { .. })
    }

    /// Build the bus frame for this command.
    pub fn encode(&self, config: &McuConfig) -> McuFrame {
        let mut data = [0u8; 8];
        let id = match *self {
            Self::Torque { torque } => {
                data[TORQUE_OFFSET..TORQUE_OFFSET + 2].copy_from_slice(&torque.to_le_bytes());
                data[FLAGS_OFFSET] = McuCommandFlags::ENABLE.bits();
                config.torque_command_id
            }
            Self::Fault { code } => {
                data[FLAGS_OFFSET] = McuCommandFlags::FAULT.bits();
                data[FAULT_CODE_OFFSET] = code as u8;
                config.fault_command_id
            }
        };

        McuFrame {
            id,
            dlc: MCU_FRAME_DLC,
            data,
        }
    }
}

/// Frame that cannot be interpreted as an MCU command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("unexpected bus id {0:#x}")]
    UnknownId(u16),

    #[error("invalid data length {0}")]
    InvalidDlc(u8),

    #[error("invalid command flags {0:#04x}")]
    InvalidFlags(u8),

    #[error("unknown fault code {0}")]
    UnknownFaultCode(u8),
}

/// Standard-id bus frame as handed to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct McuFrame {
    /// 11-bit bus identifier.
    pub id: u16,
    /// Data length code.
    pub dlc: u8,
    /// Payload, bytes beyond `dlc` are zero.
    pub data: [u8; 8],
}

impl McuFrame {
    /// Parse a frame produced by [`McuCommand::encode`].
    pub fn decode_command(&self, config: &McuConfig) -> Result<McuCommand, FrameError> {
        if self.dlc != MCU_FRAME_DLC {
            return Err(FrameError::InvalidDlc(self.dlc));
        }
        let flags = self.data[FLAGS_OFFSET];

        if self.id == config.torque_command_id {
            if flags != McuCommandFlags::ENABLE.bits() {
                return Err(FrameError::InvalidFlags(flags));
            }
            let torque = u16::from_le_bytes([
                self.data[TORQUE_OFFSET],
                self.data[TORQUE_OFFSET + 1],
            ]);
            Ok(McuCommand::Torque { torque })
        } else if self.id == config.fault_command_id {
            if flags != McuCommandFlags::FAULT.bits() {
                return Err(FrameError::InvalidFlags(flags));
            }
            let raw = self.data[FAULT_CODE_OFFSET];
            let code = FaultCode::from_u8(raw).ok_or(FrameError::UnknownFaultCode(raw))?;
            Ok(McuCommand::Fault { code })
        } else {
            Err(FrameError::UnknownId(self.id))
        }
    }
}
