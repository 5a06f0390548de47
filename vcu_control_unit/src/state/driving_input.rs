//! Single-writer, multi-reader cell holding the latest driving input.
//!
//! Torque, error flag and a write generation are packed into one `AtomicU64`
//! and published with a single store, so a reader on any thread sees either
//! the previous or the next value, never a mix of the two.
//!
//! ```text
//!  63            32 31      17  16   15         0
//! ┌────────────────┬──────────┬─────┬────────────┐
//! │   generation   │ reserved │ err │   torque   │
//! └────────────────┴──────────┴─────┴────────────┘
//! ```
//!
//! The writer half is not `Clone`; there is exactly one per cell.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use vcu_common::driving_input::DrivingInput;

const TORQUE_MASK: u64 = 0xFFFF;
const ERROR_BIT: u64 = 1 << 16;
const GENERATION_SHIFT: u32 = 32;

#[inline]
const fn pack(input: DrivingInput, generation: u32) -> u64 {
    let mut word = input.torque as u64 | (generation as u64) << GENERATION_SHIFT;
    if input.error {
        word |= ERROR_BIT;
    }
    word
}

#[inline]
const fn unpack(word: u64) -> DrivingInputSnapshot {
    DrivingInputSnapshot {
        input: DrivingInput {
            torque: (word & TORQUE_MASK) as u16,
            error: word & ERROR_BIT != 0,
        },
        generation: (word >> GENERATION_SHIFT) as u32,
    }
}

/// A driving input together with the write that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrivingInputSnapshot {
    pub input: DrivingInput,
    /// Number of writes so far (wrapping). 0 = never written.
    pub generation: u32,
}

/// Create a cell initialised to `{ torque: 0, error: false }`, generation 0.
pub fn driving_input_cell() -> (DrivingInputWriter, DrivingInputReader) {
    let slot = Arc::new(AtomicU64::new(pack(DrivingInput::default(), 0)));
    (
        DrivingInputWriter {
            slot: Arc::clone(&slot),
            generation: 0,
        },
        DrivingInputReader { slot },
    )
}

/// The only writer of a driving-input cell.
#[derive(Debug)]
pub struct DrivingInputWriter {
    slot: Arc<AtomicU64>,
    generation: u32,
}

impl DrivingInputWriter {
    /// Publish a new torque/error pair.
    #[inline]
    pub fn write(&mut self, torque: u16, error: bool) {
        self.publish(DrivingInput { torque, error });
    }

    #[inline]
    pub fn publish(&mut self, input: DrivingInput) {
        self.generation = self.generation.wrapping_add(1);
        self.slot
            .store(pack(input, self.generation), Ordering::Release);
    }

    /// Generation of the last write made through this handle.
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// A new reader of this cell.
    pub fn reader(&self) -> DrivingInputReader {
        DrivingInputReader {
            slot: Arc::clone(&self.slot),
        }
    }
}

/// Read handle. Cheap to clone, `Send + Sync`.
#[derive(Debug, Clone)]
pub struct DrivingInputReader {
    slot: Arc<AtomicU64>,
}

impl DrivingInputReader {
    #[inline]
    pub fn read(&self) -> DrivingInput {
        self.snapshot().input
    }

    #[inline]
    pub fn snapshot(&self) -> DrivingInputSnapshot {
        unpack(self.slot.load(Ordering::Acquire))
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.snapshot().generation
    }
}
