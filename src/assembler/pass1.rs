//! Pass 1: address resolution (spec §4.3).

use std::collections::HashMap;

use tracing::debug;

use crate::ast::{AddrOrLabel, Program, StatementKind};
use crate::errors::AssemblyError;
use crate::object::SectionFlags;

use super::size::instruction_size;

/// Per-statement addresses and the label → address map Pass 2 needs
/// to resolve references (spec §4.3 output).
#[derive(Debug, Clone, Default)]
pub struct Pass1Output {
    pub statement_addresses: Vec<u32>,
    pub labels: HashMap<String, u32>,
}

/// Walks every statement once, accumulating a byte cursor. Mirrors
/// spec §4.3's algorithm exactly: section membership only matters
/// here insofar as it decides whether an instruction lands in ROM or
/// RAM (the RAM case is fatal); the actual `Section` objects are
/// built by Pass 2.
#[tracing::instrument(skip(program), fields(statements = program.statements.len()))]
pub fn resolve_addresses(program: &Program, default_base: u32) -> Result<Pass1Output, AssemblyError> {
    let mut cursor: u32 = default_base;
    let mut current_flags = SectionFlags::for_base_address(cursor);
    let mut labels: HashMap<String, u32> = HashMap::new();
    let mut statement_addresses = Vec::with_capacity(program.statements.len());

    for stmt in &program.statements {
        statement_addresses.push(cursor);

        match &stmt.kind {
            StatementKind::LabelDefinition { name } => {
                if labels.contains_key(name) {
                    return Err(AssemblyError::semantic(
                        &stmt.file,
                        stmt.line,
                        format!("duplicate label definition `{name}`"),
                    ));
                }
                labels.insert(name.clone(), cursor);
            }

            StatementKind::Instruction { .. } => {
                if current_flags.is_ram() {
                    return Err(AssemblyError::semantic(
                        &stmt.file,
                        stmt.line,
                        "cannot emit an instruction into a RAM section",
                    ));
                }
                cursor += instruction_size(stmt)?;
            }

            StatementKind::DirectiveOrg { address } => {
                let addr = resolve_org_address(address, &labels, &stmt.file, stmt.line)?;
                cursor = addr;
                current_flags = SectionFlags::for_base_address(addr);
            }

            StatementKind::DirectiveData { width, values } => {
                if current_flags.is_ram() {
                    let count = values.first().copied().unwrap_or(0).max(0) as u32;
                    cursor += u32::from(*width) * count;
                } else {
                    cursor += u32::from(*width) * values.len() as u32;
                }
            }

            StatementKind::DirectiveGlobal { .. } | StatementKind::DirectiveExtern { .. } => {}
        }
    }

    debug!(labels = labels.len(), final_cursor = cursor, "pass 1 complete");
    Ok(Pass1Output {
        statement_addresses,
        labels,
    })
}

/// `.ORG` only accepts a numeric address or a label already defined
/// earlier in the program — a forward reference here would make
/// section layout depend on code that hasn't been resolved yet.
fn resolve_org_address(
    address: &AddrOrLabel,
    labels: &HashMap<String, u32>,
    file: &str,
    line: usize,
) -> Result<u32, AssemblyError> {
    match address {
        AddrOrLabel::Address(addr) => Ok(*addr),
        AddrOrLabel::Label(name) => labels.get(name).copied().ok_or_else(|| {
            AssemblyError::semantic(
                file,
                line,
                format!("`.ORG {name}` refers to a label not yet defined"),
            )
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Mnemonic, Statement};
    use crate::assembler::DEFAULT_SECTION_BASE;

    #[test]
    fn labels_resolve_to_the_address_of_the_next_statement() {
        let mut program = Program::new();
        program.push(Statement::new(
            StatementKind::LabelDefinition {
                name: "start".into(),
            },
            "t.asm",
            1,
        ));
        program.push(Statement::new(
            StatementKind::Instruction {
                mnemonic: Mnemonic::Nop,
                operands: vec![],
                condition: None,
            },
            "t.asm",
            2,
        ));

        let out = resolve_addresses(&program, DEFAULT_SECTION_BASE).unwrap();
        assert_eq!(out.labels["start"], DEFAULT_SECTION_BASE);
        assert_eq!(out.statement_addresses, vec![DEFAULT_SECTION_BASE, DEFAULT_SECTION_BASE]);
    }

    #[test]
    fn duplicate_label_is_fatal() {
        let mut program = Program::new();
        for _ in 0..2 {
            program.push(Statement::new(
                StatementKind::LabelDefinition {
                    name: "dup".into(),
                },
                "t.asm",
                1,
            ));
        }
        assert!(resolve_addresses(&program, DEFAULT_SECTION_BASE).is_err());
    }

    #[test]
    fn instruction_in_ram_section_is_fatal() {
        let mut program = Program::new();
        program.push(Statement::new(
            StatementKind::DirectiveOrg {
                address: AddrOrLabel::Address(0x8000_0000),
            },
            "t.asm",
            1,
        ));
        program.push(Statement::new(
            StatementKind::Instruction {
                mnemonic: Mnemonic::Nop,
                operands: vec![],
                condition: None,
            },
            "t.asm",
            2,
        ));
        assert!(resolve_addresses(&program, DEFAULT_SECTION_BASE).is_err());
    }

    #[test]
    fn ram_data_directive_only_reserves_space() {
        let mut program = Program::new();
        program.push(Statement::new(
            StatementKind::DirectiveOrg {
                address: AddrOrLabel::Address(0x8000_0000),
            },
            "t.asm",
            1,
        ));
        program.push(Statement::new(
            StatementKind::DirectiveData {
                width: 1,
                values: vec![4],
            },
            "t.asm",
            2,
        ));
        program.push(Statement::new(
            StatementKind::LabelDefinition {
                name: "after".into(),
            },
            "t.asm",
            3,
        ));
        let out = resolve_addresses(&program, DEFAULT_SECTION_BASE).unwrap();
        assert_eq!(out.labels["after"], 0x8000_0004);
    }
}
