//! RV64I-subset emulation core.
//!
//! The pieces of a miniature CPU, leaf to root:
//!
//! - [`mem::MemoryImage`] — simulated RAM, one contiguous region at a base
//!   address, always little-endian.
//! - [`bus::Bus`] — routes every access at or above the base to the image
//!   and faults the rest.
//! - [`registers::RegisterFile`] — 32 general-purpose registers plus the
//!   program counter; x0 is hardwired to zero.
//! - [`inst::InstructionWord`] — a fetched word split once into its
//!   encoding fields (opcode, rd, rs1, rs2, funct3, funct7, immediate).
//! - [`dispatch::DispatchTable`] — a trie over discriminant fields that
//!   resolves a decoded word to exactly one handler, or faults.
//! - [`semantics::InstructionKind`] — the handlers: each variant applies
//!   one instruction's effect to the register file and bus.
//!
//! The execution engine driving fetch/decode/execute lives in the
//! `rv64emu` crate; this crate is the machine it drives.

pub mod bus;
pub mod dispatch;
pub mod error;
pub mod inst;
pub mod mem;
pub mod registers;
pub mod semantics;

// Re-export the main types and functions
pub use bus::Bus;
pub use dispatch::{rv64i_table, DispatchNode, DispatchTable, Selector};
pub use error::{DecodeError, Fault, MemError};
pub use inst::{sign_extend, InstructionWord};
pub use mem::{AccessWidth, MemoryImage};
pub use registers::{RegisterFile, RegisterSnapshot, REG_COUNT, REG_RA, REG_SP, REG_ZERO};
pub use semantics::InstructionKind;
