//! Instruction size calculator (spec §4.4). A pure function of
//! mnemonic and operand shapes — deterministic and, by construction,
//! always consistent with what `assembler::pass2` emits for the same
//! shapes (spec §8, testable property 1).

use crate::ast::{Mnemonic, Operand, OperandKind, Statement, StatementKind};
use crate::errors::AssemblyError;

/// Size in bytes of the instruction carried by `stmt`. Panics if
/// `stmt` is not an `Instruction` — callers only invoke this from the
/// `Instruction` arm of their own match.
pub fn instruction_size(stmt: &Statement) -> Result<u32, AssemblyError> {
    let StatementKind::Instruction {
        mnemonic, operands, ..
    } = &stmt.kind
    else {
        unreachable!("instruction_size called on a non-instruction statement")
    };

    use Mnemonic::*;
    let size = match mnemonic {
        Nop | Stop | Halt | Di | Ei | Eii | Daa | Scf | Ccf | Clv | Sev | Rla | Rlca | Rra
        | Rrca | Reti => 2,

        Push | Pop | Inc | Dec | Not | Sla | Sra | Srl | Swap | Rl | Rlc | Rr | Rrc | Spo => 2,
        Ret => 2,

        Int => 3,

        Ld => size_ld(mnemonic, operands, stmt)?,
        St => size_abs_or_indirect(mnemonic, &operands[0], stmt, 6, 2)?,
        Ldq => size_abs_or_indirect(mnemonic, &operands[1], stmt, 4, 2)?,
        Stq => size_abs_or_indirect(mnemonic, &operands[0], stmt, 4, 2)?,
        Ldp => size_abs_or_indirect(mnemonic, &operands[1], stmt, 3, 2)?,
        Stp => size_abs_or_indirect(mnemonic, &operands[0], stmt, 3, 2)?,

        Mv | Mwh | Mwl => 2,

        Add | Sub | And | Or | Xor | Cmp | Adc | Sbc => size_alu(mnemonic, operands, stmt)?,

        Bit | Set | Res | Tog => 2,

        Jmp => match &operands[0].kind {
            OperandKind::Register(_) => 2,
            _ => 6,
        },
        Call => 6,
        Jpb => 4,

        Lsp => 6,
        Spi => 2,
        Ssp => match &operands[0].kind {
            OperandKind::Register(_) => 2,
            _ => 6,
        },
    };

    Ok(size)
}

fn unencodable(mnemonic: Mnemonic, operands: &[Operand], stmt: &Statement) -> AssemblyError {
    let shape = operands
        .iter()
        .map(|op| format!("{:?}", op.kind))
        .collect::<Vec<_>>()
        .join(", ");
    AssemblyError::UnencodableOperands {
        file: stmt.file.clone(),
        line: stmt.line,
        mnemonic: format!("{mnemonic:?}"),
        shape,
    }
}

fn register_width_bytes(op: &Operand) -> Option<u32> {
    match &op.kind {
        OperandKind::Register(reg) => Some(reg.width.bytes()),
        _ => None,
    }
}

/// `LD reg, imm` is `2 + width(reg)`; `LD reg, [abs32]`/`[label]` is
/// `6`; `LD reg, [reg]` is `2` (spec §4.4).
fn size_ld(mnemonic: &Mnemonic, operands: &[Operand], stmt: &Statement) -> Result<u32, AssemblyError> {
    let Some(dest_width) = register_width_bytes(&operands[0]) else {
        return Err(unencodable(*mnemonic, operands, stmt));
    };
    match &operands[1].kind {
        OperandKind::Immediate(_) => Ok(2 + dest_width),
        OperandKind::MemoryAbsolute(_) | OperandKind::LabelReference(_) => Ok(6),
        OperandKind::IndirectRegister(_) => Ok(2),
        _ => Err(unencodable(*mnemonic, operands, stmt)),
    }
}

/// Shared shape for `ST`/`LDQ`/`STQ`/`LDP`/`STP`: the addressed
/// operand is either an absolute/label target (`abs_size`) or an
/// indirect register (`indirect_size`).
fn size_abs_or_indirect(
    mnemonic: &Mnemonic,
    addressed: &Operand,
    stmt: &Statement,
    abs_size: u32,
    indirect_size: u32,
) -> Result<u32, AssemblyError> {
    match &addressed.kind {
        OperandKind::MemoryAbsolute(_) | OperandKind::LabelReference(_) => Ok(abs_size),
        OperandKind::IndirectRegister(_) => Ok(indirect_size),
        _ => Err(unencodable(*mnemonic, std::slice::from_ref(addressed), stmt)),
    }
}

/// `op acc, imm` is `2 + width(acc)`; `op acc, reg` is `2`. The indirect
/// form (`op acc, [reg]`) only exists for 8-bit accumulators — 16/32-bit
/// arithmetic has just the two addressing modes (spec §4.4/§4.5).
fn size_alu(mnemonic: &Mnemonic, operands: &[Operand], stmt: &Statement) -> Result<u32, AssemblyError> {
    use crate::ast::RegisterWidth;
    let Some((acc_width, acc_is_byte)) = (match &operands[0].kind {
        OperandKind::Register(reg) => Some((
            reg.width.bytes(),
            matches!(reg.width, RegisterWidth::Low | RegisterWidth::High),
        )),
        _ => None,
    }) else {
        return Err(unencodable(*mnemonic, operands, stmt));
    };
    match &operands[1].kind {
        OperandKind::Immediate(_) => Ok(2 + acc_width),
        OperandKind::Register(_) => Ok(2),
        OperandKind::IndirectRegister(_) if acc_is_byte => Ok(2),
        _ => Err(unencodable(*mnemonic, operands, stmt)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AddrOrLabel, ConditionCode, Provenance, Register, RegisterWidth};

    fn prov() -> Provenance {
        Provenance::new("tok", 1, "t.asm")
    }

    fn stmt(kind: StatementKind) -> Statement {
        Statement::new(kind, "t.asm", 1)
    }

    #[test]
    fn ld_reg_imm_is_two_plus_width() {
        let s = stmt(StatementKind::Instruction {
            mnemonic: Mnemonic::Ld,
            operands: vec![
                Operand::new(OperandKind::Register(Register::D0), prov()),
                Operand::new(OperandKind::Immediate(0x42), prov()),
            ],
            condition: None,
        });
        assert_eq!(instruction_size(&s).unwrap(), 2 + 4);
    }

    #[test]
    fn jmp_reg_is_two_jmp_imm_is_six() {
        let reg_form = stmt(StatementKind::Instruction {
            mnemonic: Mnemonic::Jmp,
            operands: vec![Operand::new(OperandKind::Register(Register::D0), prov())],
            condition: None,
        });
        assert_eq!(instruction_size(&reg_form).unwrap(), 2);

        let imm_form = stmt(StatementKind::Instruction {
            mnemonic: Mnemonic::Jmp,
            operands: vec![Operand::new(
                OperandKind::LabelReference("start".into()),
                prov(),
            )],
            condition: Some(ConditionCode::Nc),
        });
        assert_eq!(instruction_size(&imm_form).unwrap(), 6);
    }

    #[test]
    fn jpb_is_always_four() {
        let s = stmt(StatementKind::Instruction {
            mnemonic: Mnemonic::Jpb,
            operands: vec![Operand::new(
                OperandKind::LabelReference("loop_top".into()),
                prov(),
            )],
            condition: None,
        });
        assert_eq!(instruction_size(&s).unwrap(), 4);
    }

    #[test]
    fn ldp_distinguishes_abs8_from_indirect() {
        let abs = stmt(StatementKind::Instruction {
            mnemonic: Mnemonic::Ldp,
            operands: vec![
                Operand::new(OperandKind::Register(Register::L0), prov()),
                Operand::new(OperandKind::MemoryAbsolute(AddrOrLabel::Address(0x10)), prov()),
            ],
            condition: None,
        });
        assert_eq!(instruction_size(&abs).unwrap(), 3);

        let indirect = stmt(StatementKind::Instruction {
            mnemonic: Mnemonic::Ldp,
            operands: vec![
                Operand::new(OperandKind::Register(Register::L0), prov()),
                Operand::new(
                    OperandKind::IndirectRegister(Register::new(RegisterWidth::Low, 1)),
                    prov(),
                ),
            ],
            condition: None,
        });
        assert_eq!(instruction_size(&indirect).unwrap(), 2);
    }
}
