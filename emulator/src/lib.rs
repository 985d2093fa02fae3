//! RV64I-subset emulator: the execution engine and its I/O boundary.
//!
//! [`emu::Emu`] drives the fetch/decode/execute loop from `rv64-core`
//! against a loaded program image; [`loader`] turns a flat binary file
//! into that image. The `rv64emu` binary wires both to a command line.

pub mod emu;
pub mod loader;

pub use emu::{Emu, EmuOptions, FaultInfo, RunOutcome, StepResult, DEFAULT_BASE, DEFAULT_REGION_SIZE};
pub use loader::load_image;
