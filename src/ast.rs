/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Typed representation of the statements and operands the (external)
//! parser produces, per spec §3 and the Pass 2 contract in §4.2.

use std::collections::{HashMap, HashSet};

/// The width a register identity is viewed through. The numeric value
/// matches the keyword table's packed high nibble (§4.1): the emitter
/// depends on exactly this packing when building opcodes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RegisterWidth {
    Dword = 0,
    Word = 1,
    High = 2,
    Low = 4,
}

impl RegisterWidth {
    /// Number of bytes an immediate paired with a register of this width
    /// occupies (§4.4: `LD reg, imm` is `2 + width(reg)`).
    pub fn bytes(self) -> u32 {
        match self {
            RegisterWidth::Dword => 4,
            RegisterWidth::Word => 2,
            RegisterWidth::High | RegisterWidth::Low => 1,
        }
    }
}

/// A register identity: `(width, index)`, index in `0..=15`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Register {
    pub width: RegisterWidth,
    pub index: u8,
}

impl Register {
    pub const fn new(width: RegisterWidth, index: u8) -> Self {
        Register { width, index }
    }

    pub const D0: Register = Register::new(RegisterWidth::Dword, 0);
    pub const W0: Register = Register::new(RegisterWidth::Word, 0);
    pub const L0: Register = Register::new(RegisterWidth::Low, 0);

    /// True for D0/W0/L0: the implicit destination of accumulator-form
    /// arithmetic (spec §3, Register identity).
    pub fn is_accumulator(&self) -> bool {
        self.index == 0
    }
}

/// Condition codes, fixed numeric encoding per spec §3.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConditionCode {
    Nc = 0,
    Zs = 1,
    Zc = 2,
    Cs = 3,
    Cc = 4,
    Vs = 5,
    Vc = 6,
}

impl ConditionCode {
    pub fn encoding(self) -> u8 {
        self as u8
    }
}

/// An address that may already be numeric or may still be a label
/// reference to resolve in Pass 1/Pass 2.
#[derive(Debug, Clone, PartialEq)]
pub enum AddrOrLabel {
    Address(u32),
    Label(String),
}

/// Tagged variant over every operand shape an instruction can take
/// (spec §3). Every operand carries its source provenance for
/// diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Operand {
    pub kind: OperandKind,
    pub provenance: Provenance,
}

impl Operand {
    pub fn new(kind: OperandKind, provenance: Provenance) -> Self {
        Operand { kind, provenance }
    }

    pub fn none(provenance: Provenance) -> Self {
        Operand::new(OperandKind::None, provenance)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OperandKind {
    None,
    Register(Register),
    Immediate(i64),
    MemoryAbsolute(AddrOrLabel),
    IndirectRegister(Register),
    LabelReference(String),
}

/// Source-token provenance carried by every operand (spec §3).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Provenance {
    pub token: String,
    pub line: usize,
    pub file: String,
}

impl Provenance {
    pub fn new(token: impl Into<String>, line: usize, file: impl Into<String>) -> Self {
        Provenance {
            token: token.into(),
            line,
            file: file.into(),
        }
    }
}

/// Normalized mnemonic identity (never the alias spelling — §4.2:
/// `JP≡JMP`, `JR≡JPB`, `CP≡CMP`, `CPL≡NOT L0`, `TCF≡CCF` are collapsed
/// by the keyword table / parser before an `Instruction` reaches the
/// assembler).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    // Zero-operand control (§4.4)
    Nop,
    Stop,
    Halt,
    Di,
    Ei,
    Eii,
    Daa,
    Scf,
    Ccf,
    Clv,
    Sev,
    Rla,
    Rlca,
    Rra,
    Rrca,
    Reti,
    Ret,
    // Single-register ops
    Push,
    Pop,
    Inc,
    Dec,
    Not,
    Sla,
    Sra,
    Srl,
    Swap,
    Rl,
    Rlc,
    Rr,
    Rrc,
    Spo,
    Spi,
    // Interrupts
    Int,
    // Load/store family
    Ld,
    St,
    Ldq,
    Stq,
    Ldp,
    Stp,
    Mv,
    Mwh,
    Mwl,
    // Arithmetic/logic (width determined from the operand register)
    Add,
    Sub,
    And,
    Or,
    Xor,
    Cmp,
    Adc,
    Sbc,
    // Bit ops
    Bit,
    Set,
    Res,
    Tog,
    // Control flow
    Jmp,
    Call,
    Jpb,
    // Stack pointer
    Lsp,
    Ssp,
}

/// One statement of the program (spec §3). Every statement carries
/// source-file and line for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub file: String,
    pub line: usize,
}

impl Statement {
    pub fn new(kind: StatementKind, file: impl Into<String>, line: usize) -> Self {
        Statement {
            kind,
            file: file.into(),
            line,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    LabelDefinition {
        name: String,
    },
    Instruction {
        mnemonic: Mnemonic,
        /// Up to 2 operands. Bit operations (`BIT`/`SET`/`RES`/`TOG`)
        /// store the bit index (0-7) as `operands[0]` (an
        /// `Immediate`) and the register/indirect target as
        /// `operands[1]`, per §4.2.
        operands: Vec<Operand>,
        /// Explicit condition code for jump/call/return forms; `None`
        /// means `NC` is implied (§4.2).
        condition: Option<ConditionCode>,
    },
    DirectiveOrg {
        address: AddrOrLabel,
    },
    DirectiveData {
        width: u8,
        values: Vec<i64>,
    },
    DirectiveGlobal {
        names: Vec<String>,
    },
    DirectiveExtern {
        names: Vec<String>,
    },
}

/// Ordered sequence of statements with a label index and the
/// program's declared-global/declared-extern name sets (spec §3).
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
    pub label_index: HashMap<String, usize>,
    pub globals: HashSet<String>,
    pub externs: HashSet<String>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }

    pub fn push(&mut self, statement: Statement) {
        if let StatementKind::LabelDefinition { name } = &statement.kind {
            self.label_index
                .entry(name.clone())
                .or_insert(self.statements.len());
        }
        if let StatementKind::DirectiveGlobal { names } = &statement.kind {
            self.globals.extend(names.iter().cloned());
        }
        if let StatementKind::DirectiveExtern { names } = &statement.kind {
            self.externs.extend(names.iter().cloned());
        }
        self.statements.push(statement);
    }
}
