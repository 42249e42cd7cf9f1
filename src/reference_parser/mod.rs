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

//! A minimal, line-oriented parser: one statement per line, covering
//! exactly the textual forms spec.md's worked scenarios use (labels,
//! `.ORG`/`.BYTE`/`.WORD`/`.DWORD`/`.GLOBAL`/`.EXTERN`, and
//! `MNEMONIC [cond,] operand[, operand]`). A real toolchain's
//! preprocessor and parser are an external collaborator (§1); this one
//! exists so the crate has a working end-to-end path without it.

use crate::ast::{
    AddrOrLabel, ConditionCode, Mnemonic, Operand, OperandKind, Program, Provenance, Statement,
    StatementKind,
};
use crate::errors::ParseError;
use crate::keyword_table::{self, AliasOperand, Category, DirectiveKeyword};

/// Turns assembly source text into a `Program`. A production toolchain
/// would implement this over a real lexer and grammar; `LineParser`
/// below is the stand-in used by this crate's own tests and CLI.
pub trait SourceParser {
    fn parse(&self, source: &str, filename: &str) -> Result<Program, ParseError>;
}

pub struct LineParser;

impl SourceParser for LineParser {
    fn parse(&self, source: &str, filename: &str) -> Result<Program, ParseError> {
        let mut program = Program::new();
        for (index, raw_line) in source.lines().enumerate() {
            let line = index + 1;
            let text = strip_comment(raw_line).trim();
            if text.is_empty() {
                continue;
            }
            program.push(parse_line(text, filename, line)?);
        }
        Ok(program)
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(index) => &line[..index],
        None => line,
    }
}

fn parse_line(text: &str, filename: &str, line: usize) -> Result<Statement, ParseError> {
    if let Some(name) = text.strip_suffix(':') {
        return Ok(Statement::new(
            StatementKind::LabelDefinition {
                name: name.trim().to_string(),
            },
            filename,
            line,
        ));
    }

    let (head, rest) = match text.find(char::is_whitespace) {
        Some(index) => (&text[..index], text[index..].trim()),
        None => (text, ""),
    };

    if head.starts_with('.') {
        return parse_directive(head, rest, filename, line);
    }

    let entry = lookup_or_err(head, filename, line)?;
    if entry.category != Category::Mnemonic {
        return Err(syntax_error(filename, line, format!("`{head}` is not an instruction")));
    }
    let mnemonic = keyword_table::decode_mnemonic(entry.param1);
    parse_instruction(mnemonic, entry.param2, &split_operands(rest), filename, line)
}

fn parse_directive(head: &str, rest: &str, filename: &str, line: usize) -> Result<Statement, ParseError> {
    let entry = lookup_or_err(head, filename, line)?;
    if entry.category != Category::Directive {
        return Err(syntax_error(filename, line, format!("`{head}` is not a directive")));
    }

    match keyword_table::decode_directive(entry.param1) {
        DirectiveKeyword::Org => {
            let address = parse_addr_or_label(rest.trim(), filename, line)?;
            Ok(Statement::new(StatementKind::DirectiveOrg { address }, filename, line))
        }
        directive @ (DirectiveKeyword::Byte | DirectiveKeyword::Word | DirectiveKeyword::Dword) => {
            let width = match directive {
                DirectiveKeyword::Byte => 1,
                DirectiveKeyword::Word => 2,
                DirectiveKeyword::Dword => 4,
                _ => unreachable!(),
            };
            let values = split_operands(rest)
                .into_iter()
                .map(|token| {
                    parse_number(&token)
                        .ok_or_else(|| syntax_error(filename, line, format!("expected a number, found `{token}`")))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Statement::new(StatementKind::DirectiveData { width, values }, filename, line))
        }
        DirectiveKeyword::Global => Ok(Statement::new(
            StatementKind::DirectiveGlobal {
                names: split_operands(rest),
            },
            filename,
            line,
        )),
        DirectiveKeyword::Extern => Ok(Statement::new(
            StatementKind::DirectiveExtern {
                names: split_operands(rest),
            },
            filename,
            line,
        )),
    }
}

/// `JMP`/`CALL`/`JPB`/`RET`/`RETI` may lead with a bare condition-code
/// token before the first comma (`JMP NC, start`); everything else
/// treats every token as an operand.
fn parse_instruction(
    mnemonic: Mnemonic,
    implicit: Option<AliasOperand>,
    tokens: &[String],
    filename: &str,
    line: usize,
) -> Result<Statement, ParseError> {
    let supports_condition = matches!(
        mnemonic,
        Mnemonic::Jmp | Mnemonic::Call | Mnemonic::Jpb | Mnemonic::Ret | Mnemonic::Reti
    );

    let mut condition = None;
    let mut rest = tokens;
    if supports_condition {
        if let Some(first) = tokens.first() {
            if let Some(entry) = keyword_table::lookup(first) {
                if entry.category == Category::ConditionCode {
                    condition = Some(decode_condition(entry.param1));
                    rest = &tokens[1..];
                }
            }
        }
    }

    let mut operands = Vec::with_capacity(rest.len() + 1);
    if let Some(AliasOperand::Register(reg)) = implicit {
        operands.push(Operand::new(
            OperandKind::Register(reg),
            Provenance::new(String::new(), line, filename),
        ));
    }
    for token in rest {
        operands.push(parse_operand(token, filename, line)?);
    }

    Ok(Statement::new(
        StatementKind::Instruction {
            mnemonic,
            operands,
            condition,
        },
        filename,
        line,
    ))
}

fn parse_operand(token: &str, filename: &str, line: usize) -> Result<Operand, ParseError> {
    let provenance = Provenance::new(token.to_string(), line, filename);

    if let Some(inner) = token.strip_prefix('[').and_then(|body| body.strip_suffix(']')) {
        let inner = inner.trim();
        if let Some(entry) = keyword_table::lookup(inner) {
            if entry.category == Category::Register {
                let reg = keyword_table::decode_register(entry.param1);
                return Ok(Operand::new(OperandKind::IndirectRegister(reg), provenance));
            }
        }
        if let Some(value) = parse_number(inner) {
            return Ok(Operand::new(
                OperandKind::MemoryAbsolute(AddrOrLabel::Address(value as u32)),
                provenance,
            ));
        }
        if is_identifier(inner) {
            return Ok(Operand::new(
                OperandKind::MemoryAbsolute(AddrOrLabel::Label(inner.to_string())),
                provenance,
            ));
        }
        return Err(syntax_error(filename, line, format!("cannot parse indirect operand `{token}`")));
    }

    if let Some(entry) = keyword_table::lookup(token) {
        return match entry.category {
            Category::Register => {
                let reg = keyword_table::decode_register(entry.param1);
                Ok(Operand::new(OperandKind::Register(reg), provenance))
            }
            _ => Err(syntax_error(filename, line, format!("`{token}` cannot be used as an operand"))),
        };
    }

    if let Some(value) = parse_number(token) {
        return Ok(Operand::new(OperandKind::Immediate(value), provenance));
    }

    if is_identifier(token) {
        return Ok(Operand::new(OperandKind::LabelReference(token.to_string()), provenance));
    }

    Err(syntax_error(filename, line, format!("cannot parse operand `{token}`")))
}

fn parse_addr_or_label(token: &str, filename: &str, line: usize) -> Result<AddrOrLabel, ParseError> {
    if token.is_empty() {
        return Err(syntax_error(filename, line, "`.ORG` needs an address or label"));
    }
    if let Some(value) = parse_number(token) {
        return Ok(AddrOrLabel::Address(value as u32));
    }
    Ok(AddrOrLabel::Label(token.to_string()))
}

fn split_operands(rest: &str) -> Vec<String> {
    if rest.trim().is_empty() {
        return Vec::new();
    }
    rest.split(',').map(|token| token.trim().to_string()).collect()
}

fn parse_number(token: &str) -> Option<i64> {
    let (negative, body) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    let magnitude = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else if !body.is_empty() && body.chars().all(|c| c.is_ascii_digit()) {
        body.parse::<i64>().ok()?
    } else {
        return None;
    };
    Some(if negative { -magnitude } else { magnitude })
}

fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn decode_condition(value: u8) -> ConditionCode {
    match value {
        1 => ConditionCode::Zs,
        2 => ConditionCode::Zc,
        3 => ConditionCode::Cs,
        4 => ConditionCode::Cc,
        5 => ConditionCode::Vs,
        6 => ConditionCode::Vc,
        _ => ConditionCode::Nc,
    }
}

fn lookup_or_err(lexeme: &str, filename: &str, line: usize) -> Result<keyword_table::KeywordEntry, ParseError> {
    keyword_table::lookup(lexeme).ok_or_else(|| ParseError::UnknownLexeme {
        file: filename.to_string(),
        line,
        lexeme: lexeme.to_string(),
    })
}

fn syntax_error(filename: &str, line: usize, reason: impl Into<String>) -> ParseError {
    ParseError::Syntax {
        file: filename.to_string(),
        line,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Register, RegisterWidth};

    fn parse(source: &str) -> Program {
        LineParser.parse(source, "t.asm").unwrap()
    }

    #[test]
    fn parses_a_label_and_a_zero_operand_instruction() {
        let program = parse("start:\n  NOP\n");
        assert_eq!(program.statements.len(), 2);
        assert!(matches!(
            program.statements[0].kind,
            StatementKind::LabelDefinition { ref name } if name == "start"
        ));
        assert!(matches!(
            program.statements[1].kind,
            StatementKind::Instruction { mnemonic: Mnemonic::Nop, .. }
        ));
    }

    #[test]
    fn parses_ld_reg_immediate() {
        let program = parse("LD D0, 0x1234");
        let StatementKind::Instruction { mnemonic, operands, condition } = &program.statements[0].kind else {
            panic!("expected instruction");
        };
        assert_eq!(*mnemonic, Mnemonic::Ld);
        assert_eq!(*condition, None);
        assert_eq!(operands[0].kind, OperandKind::Register(Register::D0));
        assert_eq!(operands[1].kind, OperandKind::Immediate(0x1234));
    }

    #[test]
    fn parses_indirect_register_operand() {
        let program = parse("ST [D2], L0");
        let StatementKind::Instruction { operands, .. } = &program.statements[0].kind else {
            panic!("expected instruction");
        };
        assert_eq!(
            operands[0].kind,
            OperandKind::IndirectRegister(Register::new(RegisterWidth::Dword, 2))
        );
    }

    #[test]
    fn parses_conditional_jump_with_label_target() {
        let program = parse("JMP NC, loop");
        let StatementKind::Instruction { mnemonic, operands, condition } = &program.statements[0].kind else {
            panic!("expected instruction");
        };
        assert_eq!(*mnemonic, Mnemonic::Jmp);
        assert_eq!(*condition, Some(ConditionCode::Nc));
        assert_eq!(operands[0].kind, OperandKind::LabelReference("loop".to_string()));
    }

    #[test]
    fn parses_bare_call_with_no_condition() {
        let program = parse("CALL helper");
        let StatementKind::Instruction { condition, operands, .. } = &program.statements[0].kind else {
            panic!("expected instruction");
        };
        assert_eq!(*condition, None);
        assert_eq!(operands[0].kind, OperandKind::LabelReference("helper".to_string()));
    }

    #[test]
    fn jr_alias_normalizes_to_jpb() {
        let program = parse("JR loop");
        assert!(matches!(
            program.statements[0].kind,
            StatementKind::Instruction { mnemonic: Mnemonic::Jpb, .. }
        ));
    }

    #[test]
    fn cpl_alias_supplies_the_implicit_l0_operand() {
        let program = parse("CPL");
        let StatementKind::Instruction { mnemonic, operands, .. } = &program.statements[0].kind else {
            panic!("expected instruction");
        };
        assert_eq!(*mnemonic, Mnemonic::Not);
        assert_eq!(operands.len(), 1);
        assert_eq!(operands[0].kind, OperandKind::Register(Register::L0));
    }

    #[test]
    fn parses_directives() {
        let program = parse(".ORG 0x2000\n.GLOBAL start, helper\n.BYTE 1, 2, 0xFF\n");
        assert!(matches!(
            program.statements[0].kind,
            StatementKind::DirectiveOrg { address: AddrOrLabel::Address(0x2000) }
        ));
        assert!(matches!(
            &program.statements[1].kind,
            StatementKind::DirectiveGlobal { names } if names == &["start", "helper"]
        ));
        assert!(matches!(
            &program.statements[2].kind,
            StatementKind::DirectiveData { width: 1, values } if values == &[1, 2, 255]
        ));
    }

    #[test]
    fn org_accepts_a_label_target() {
        let program = parse(".ORG reset_vector");
        assert!(matches!(
            program.statements[0].kind,
            StatementKind::DirectiveOrg { address: AddrOrLabel::Label(ref name) } if name == "reset_vector"
        ));
    }

    #[test]
    fn strips_comments_and_blank_lines() {
        let program = parse("; a whole comment line\nNOP ; trailing comment\n\n");
        assert_eq!(program.statements.len(), 1);
    }

    #[test]
    fn unknown_lexeme_is_reported_with_location() {
        let err = LineParser.parse("BANANA D0", "t.asm").unwrap_err();
        assert!(matches!(err, ParseError::UnknownLexeme { line: 1, .. }));
    }

    #[test]
    fn bit_index_parses_as_a_plain_immediate() {
        let program = parse("SET 5, [D2]");
        let StatementKind::Instruction { operands, .. } = &program.statements[0].kind else {
            panic!("expected instruction");
        };
        assert_eq!(operands[0].kind, OperandKind::Immediate(5));
        assert_eq!(
            operands[1].kind,
            OperandKind::IndirectRegister(Register::new(RegisterWidth::Dword, 2))
        );
    }
}
