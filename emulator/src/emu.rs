//! The execution engine: fetch, decode, execute, advance.
//!
//! One instruction is in flight at a time. The engine borrows an immutable
//! dispatch table (shareable across engines) and exclusively owns the
//! register file and bus it mutates. A fault at any phase of a cycle is
//! unrecoverable: the loop stops with the faulting pc and word, and the
//! registers keep the state they had before that cycle.

use rv64_core::{
    AccessWidth, Bus, DispatchTable, Fault, InstructionWord, MemoryImage, RegisterFile,
    RegisterSnapshot,
};
use tracing::{debug, trace};

/// Default base address of the mapped region.
pub const DEFAULT_BASE: u64 = 0x8000_0000;

/// Default total region size: 128 MiB, the top of which seeds the stack
/// pointer.
pub const DEFAULT_REGION_SIZE: u64 = 128 * 1024 * 1024;

/// Run configuration.
#[derive(Debug, Clone)]
pub struct EmuOptions {
    /// Base address the program image is placed at; the entry pc.
    pub base_address: u64,
    /// Total region size; `x2` starts at `base_address + region_size`.
    pub region_size: u64,
}

impl Default for EmuOptions {
    fn default() -> Self {
        Self { base_address: DEFAULT_BASE, region_size: DEFAULT_REGION_SIZE }
    }
}

/// What a single cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// An instruction executed and the pc advanced.
    Executed,
    /// The pc reached the end of the loaded code region.
    Halted,
}

/// The instruction and pc a fault was observed at.
///
/// `raw` is 0 when the fetch itself faulted and no word was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultInfo {
    pub pc: u64,
    pub raw: u32,
    pub cause: Fault,
}

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The pc reached the end of the loaded code region.
    Halted,
    /// Decode or memory fault; the loop stopped at the reported cycle.
    Faulted(FaultInfo),
}

/// Drives the fetch → decode → execute → advance loop against a program
/// image until the instruction stream is exhausted or a cycle faults.
pub struct Emu<'a> {
    dispatch: &'a DispatchTable,
    regs: RegisterFile,
    bus: Bus,
    /// First address past the loaded code; reaching it halts the machine.
    code_end: u64,
}

impl<'a> Emu<'a> {
    /// Places `image` on the bus and sets up the entry state: pc at the
    /// image base, stack pointer at the top of the configured region.
    pub fn new(dispatch: &'a DispatchTable, image: MemoryImage, options: &EmuOptions) -> Self {
        let base = image.base();
        let code_end = base + image.loaded_len();
        let regs = RegisterFile::new(base, base + options.region_size);
        Self { dispatch, regs, bus: Bus::new(image), code_end }
    }

    /// Read-only view of the register state.
    pub fn registers(&self) -> RegisterSnapshot {
        self.regs.snapshot()
    }

    /// Executes one cycle, or reports that the machine already halted.
    ///
    /// On a fault nothing is executed and the pc does not advance, so the
    /// reported pc is the faulting instruction's own address.
    pub fn step(&mut self) -> Result<StepResult, FaultInfo> {
        let pc = self.regs.pc;
        if pc >= self.code_end {
            return Ok(StepResult::Halted);
        }

        let raw = self
            .bus
            .read(pc, AccessWidth::Word)
            .map_err(|e| FaultInfo { pc, raw: 0, cause: e.into() })? as u32;

        let inst = InstructionWord::decode(raw);
        let kind = self
            .dispatch
            .resolve(&inst)
            .map_err(|e| FaultInfo { pc, raw, cause: e.into() })?;

        trace!(pc = format_args!("{pc:#x}"), mnemonic = kind.mnemonic(), "execute");

        kind.execute(&inst, &mut self.regs, &mut self.bus)
            .map_err(|e| FaultInfo { pc, raw, cause: e.into() })?;

        self.regs.pc = pc + 4;
        Ok(StepResult::Executed)
    }

    /// Runs until the machine halts or faults.
    pub fn run(&mut self) -> RunOutcome {
        loop {
            match self.step() {
                Ok(StepResult::Executed) => {}
                Ok(StepResult::Halted) => {
                    debug!(pc = format_args!("{:#x}", self.regs.pc), "halted");
                    return RunOutcome::Halted;
                }
                Err(info) => {
                    debug!(
                        pc = format_args!("{:#x}", info.pc),
                        raw = format_args!("{:#010x}", info.raw),
                        cause = %info.cause,
                        "faulted"
                    );
                    return RunOutcome::Faulted(info);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rv64_core::{rv64i_table, DecodeError, MemError};

    fn emu_with<'a>(dispatch: &'a DispatchTable, code: &[u8]) -> Emu<'a> {
        let options = EmuOptions::default();
        let image = MemoryImage::new(code.to_vec(), options.base_address);
        Emu::new(dispatch, image, &options)
    }

    #[test]
    fn test_single_addi_scenario() {
        let table = rv64i_table();
        // Little-endian word 0x05A00093: addi x1, x0, 90.
        let mut emu = emu_with(&table, &[0x93, 0x00, 0xA0, 0x05]);

        assert_eq!(emu.step().unwrap(), StepResult::Executed);
        let snap = emu.registers();
        assert_eq!(snap.x[1], 90);
        assert_eq!(snap.pc, DEFAULT_BASE + 4);

        // pc reached base + 4 == code end.
        assert_eq!(emu.step().unwrap(), StepResult::Halted);
        assert_eq!(emu.run(), RunOutcome::Halted);
    }

    #[test]
    fn test_entry_state() {
        let table = rv64i_table();
        let emu = emu_with(&table, &[0x93, 0x00, 0xA0, 0x05]);
        let snap = emu.registers();
        assert_eq!(snap.pc, DEFAULT_BASE);
        assert_eq!(snap.x[2], DEFAULT_BASE + DEFAULT_REGION_SIZE);
    }

    #[test]
    fn test_unknown_opcode_faults_at_pc() {
        let table = rv64i_table();
        // addi x1, x0, 90 then an all-zero word (opcode 0x00 unassigned).
        let mut emu = emu_with(
            &table,
            &[0x93, 0x00, 0xA0, 0x05, 0x00, 0x00, 0x00, 0x00],
        );

        let before = {
            emu.step().unwrap();
            emu.registers()
        };

        let outcome = emu.run();
        let info = match outcome {
            RunOutcome::Faulted(info) => info,
            RunOutcome::Halted => panic!("expected fault"),
        };
        assert_eq!(info.pc, DEFAULT_BASE + 4);
        assert_eq!(info.raw, 0);
        assert_eq!(info.cause, Fault::Decode(DecodeError::UnknownOpcode(0)));

        // The faulting cycle changed nothing.
        assert_eq!(emu.registers(), before);
    }

    #[test]
    fn test_out_of_region_load_faults_without_mutation() {
        let table = rv64i_table();
        // ld x1, 0(x0): effective address 0 is below the mapped base.
        let mut emu = emu_with(&table, &0x0000_3083u32.to_le_bytes());

        let before = emu.registers();
        let info = emu.step().unwrap_err();
        assert_eq!(info.pc, DEFAULT_BASE);
        assert_eq!(info.raw, 0x0000_3083);
        assert_eq!(info.cause, Fault::Mem(MemError::Unmapped(0)));
        assert_eq!(emu.registers(), before);
    }

    #[test]
    fn test_load_past_loaded_length_faults() {
        let table = rv64i_table();
        // ld x1, 0(x2): x2 holds the initial sp, far past the 4-byte image.
        let mut emu = emu_with(&table, &0x0001_3083u32.to_le_bytes());

        let info = emu.step().unwrap_err();
        assert_eq!(
            info.cause,
            Fault::Mem(MemError::OutOfBounds {
                addr: DEFAULT_BASE + DEFAULT_REGION_SIZE,
                width: 64
            })
        );
    }

    #[test]
    fn test_sequential_program() {
        let table = rv64i_table();
        // addi x1, x0, 5; addi x2, x0, 7; mul x3, x1, x2; sub x4, x3, x1
        let code: Vec<u8> = [0x0050_0093u32, 0x0070_0113, 0x0220_81B3, 0x4011_8233]
            .iter()
            .flat_map(|w| w.to_le_bytes())
            .collect();
        let mut emu = emu_with(&table, &code);

        assert_eq!(emu.run(), RunOutcome::Halted);
        let snap = emu.registers();
        assert_eq!(snap.x[1], 5);
        assert_eq!(snap.x[2], 7);
        assert_eq!(snap.x[3], 35);
        assert_eq!(snap.x[4], 30);
        assert_eq!(snap.pc, DEFAULT_BASE + 16);
    }
}
