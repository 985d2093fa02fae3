//! Fault taxonomy for the emulation core.
//!
//! Every error here is fatal to the current run: once an access misses the
//! mapped region or an encoding has no handler, the machine state past that
//! cycle is undefined and the engine stops. The caller decides what to do
//! with the outcome; the core never exits the process.

use crate::dispatch::Selector;

/// Memory-system faults raised by the bus and the backing image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MemError {
    /// The address falls below the single mapped region.
    #[error("address {0:#x} is below the mapped memory region")]
    Unmapped(u64),

    /// The access would run past the loaded image.
    #[error("{width}-bit access at {addr:#x} runs past the loaded image")]
    OutOfBounds { addr: u64, width: u32 },
}

/// Decode faults raised while resolving an instruction to a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// No instruction family is assigned to this opcode.
    #[error("unknown opcode {0:#04x}")]
    UnknownOpcode(u32),

    /// The discriminant chain reached a hole in the dispatch table.
    #[error("unassigned encoding: {selector} value {value:#x}")]
    Unassigned { selector: Selector, value: u32 },
}

/// Union of the faults that can halt the execution engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Fault {
    #[error("memory fault: {0}")]
    Mem(#[from] MemError),

    #[error("decode fault: {0}")]
    Decode(#[from] DecodeError),
}
