//! Hierarchical instruction dispatch.
//!
//! Resolution is a trie walk over the instruction's discriminant fields:
//! the root table is keyed on the opcode, and any entry that is still
//! ambiguous nests another table keyed on the next field. Which field a
//! table consumes is data (its [`Selector`]), not code, so richer
//! instruction sets extend the tree without touching the walk. The tree is
//! built once, never mutated, and can be shared by any number of engines.

use std::collections::HashMap;
use std::fmt;

use crate::error::DecodeError;
use crate::inst::InstructionWord;
use crate::semantics::InstructionKind;

/// The discriminant field a table level keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Opcode,
    Funct3,
    Funct7,
}

impl Selector {
    /// Extracts this field from a decoded instruction.
    pub fn extract(self, inst: &InstructionWord) -> u32 {
        match self {
            Selector::Opcode => inst.opcode,
            Selector::Funct3 => inst.funct3,
            Selector::Funct7 => inst.funct7,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Opcode => write!(f, "opcode"),
            Selector::Funct3 => write!(f, "funct3"),
            Selector::Funct7 => write!(f, "funct7"),
        }
    }
}

/// A resolved position is either a terminal handler or a nested table —
/// never both, never neither.
#[derive(Debug)]
pub enum DispatchNode {
    Handler(InstructionKind),
    Table(DispatchTable),
}

/// One level of the dispatch trie.
#[derive(Debug)]
pub struct DispatchTable {
    selector: Selector,
    entries: HashMap<u32, DispatchNode>,
}

impl DispatchTable {
    pub fn new(selector: Selector) -> Self {
        Self { selector, entries: HashMap::new() }
    }

    /// Assigns a terminal handler to a discriminant value.
    pub fn handler(mut self, value: u32, kind: InstructionKind) -> Self {
        self.entries.insert(value, DispatchNode::Handler(kind));
        self
    }

    /// Nests a child table under a discriminant value.
    pub fn table(mut self, value: u32, child: DispatchTable) -> Self {
        self.entries.insert(value, DispatchNode::Table(child));
        self
    }

    /// Walks the discriminant chain until a handler terminates it.
    ///
    /// Only descends as deep as the tree itself requires; a miss at the
    /// root is an unknown opcode, a miss below it an unassigned encoding.
    pub fn resolve(&self, inst: &InstructionWord) -> Result<InstructionKind, DecodeError> {
        let mut table = self;
        loop {
            let value = table.selector.extract(inst);
            match table.entries.get(&value) {
                Some(DispatchNode::Handler(kind)) => return Ok(*kind),
                Some(DispatchNode::Table(child)) => table = child,
                None if table.selector == Selector::Opcode => {
                    return Err(DecodeError::UnknownOpcode(value))
                }
                None => {
                    return Err(DecodeError::Unassigned { selector: table.selector, value })
                }
            }
        }
    }
}

/// Builds the dispatch tree for the implemented RV64I subset: loads,
/// immediate ALU, and register ALU families.
pub fn rv64i_table() -> DispatchTable {
    use InstructionKind::*;

    // LOAD (0x03): one variant per funct3.
    let load = DispatchTable::new(Selector::Funct3)
        .handler(0x0, Lb)
        .handler(0x1, Lh)
        .handler(0x2, Lw)
        .handler(0x3, Ld)
        .handler(0x4, Lbu)
        .handler(0x5, Lhu)
        .handler(0x6, Lwu);

    // OP-IMM (0x13): funct3 disambiguates everything except the right
    // shifts, which share funct3=5 and split on funct7. Bit 25 is shamt[5]
    // on RV64, so both funct7 values of each shift map to the same handler.
    let op_imm = DispatchTable::new(Selector::Funct3)
        .handler(0x0, Addi)
        .handler(0x1, Slli)
        .handler(0x2, Slti)
        .handler(0x3, Sltiu)
        .handler(0x4, Xori)
        .table(
            0x5,
            DispatchTable::new(Selector::Funct7)
                .handler(0x00, Srli)
                .handler(0x01, Srli)
                .handler(0x20, Srai)
                .handler(0x21, Srai),
        )
        .handler(0x6, Ori)
        .handler(0x7, Andi);

    // OP (0x33): funct3=0 and funct3=5 stay ambiguous and descend to
    // funct7; the rest terminate at funct3.
    let op = DispatchTable::new(Selector::Funct3)
        .table(
            0x0,
            DispatchTable::new(Selector::Funct7)
                .handler(0x00, Add)
                .handler(0x01, Mul)
                .handler(0x20, Sub),
        )
        .handler(0x1, Sll)
        .handler(0x2, Slt)
        .handler(0x3, Sltu)
        .handler(0x4, Xor)
        .table(
            0x5,
            DispatchTable::new(Selector::Funct7)
                .handler(0x00, Srl)
                .handler(0x20, Sra),
        )
        .handler(0x6, Or)
        .handler(0x7, And);

    DispatchTable::new(Selector::Opcode)
        .table(0x03, load)
        .table(0x13, op_imm)
        .table(0x33, op)
}
