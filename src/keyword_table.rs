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

//! Case-insensitive resolution of lexemes to register ids, condition
//! codes, directives and mnemonics (spec §4.1).
//!
//! The table is a flat static slice of entries, in the spirit of the
//! teacher's `constants.rs` opcode tables: data, not a chain of
//! `if`/`match` on spelling. `lookup` is the single place that knows
//! how a textual lexeme maps onto the typed identities the rest of
//! the assembler consumes.

use crate::ast::{ConditionCode, Mnemonic, Register, RegisterWidth};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Category {
    Register,
    ConditionCode,
    Directive,
    Mnemonic,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DirectiveKeyword {
    Org,
    Byte,
    Word,
    Dword,
    Global,
    Extern,
}

/// A single keyword table entry. `param1`/`param2` are deliberately
/// untyped-ish (small packed integers) so one flat table can describe
/// four different kinds of keyword without four separate tables —
/// `param1` packs width-in-high-nibble/index-in-low-nibble for
/// registers (the emitter depends on this exact packing, §4.1), the
/// condition-code numeric value, the `DirectiveKeyword` discriminant,
/// or the `Mnemonic` discriminant. `param2` carries an alias's
/// implicit operand, when it has one (`CPL` implies register `L0`).
#[derive(Debug, Copy, Clone)]
pub struct KeywordEntry {
    pub lexeme: &'static str,
    pub category: Category,
    pub param1: u8,
    pub param2: Option<AliasOperand>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AliasOperand {
    Register(Register),
}

fn reg_param(width: RegisterWidth, index: u8) -> u8 {
    ((width as u8) << 4) | (index & 0x0F)
}

pub fn decode_register(param1: u8) -> Register {
    let width = match param1 >> 4 {
        0 => RegisterWidth::Dword,
        1 => RegisterWidth::Word,
        2 => RegisterWidth::High,
        4 => RegisterWidth::Low,
        other => unreachable!("keyword table never stores width nibble {other}"),
    };
    Register::new(width, param1 & 0x0F)
}

/// Reverses `*directive as u8`. Order must track `DirectiveKeyword`'s
/// declaration in `ast.rs`.
pub fn decode_directive(param1: u8) -> DirectiveKeyword {
    const ORDER: [DirectiveKeyword; 6] = [
        DirectiveKeyword::Org,
        DirectiveKeyword::Byte,
        DirectiveKeyword::Word,
        DirectiveKeyword::Dword,
        DirectiveKeyword::Global,
        DirectiveKeyword::Extern,
    ];
    ORDER[param1 as usize]
}

/// Reverses `*mnemonic as u8`. Order must track `Mnemonic`'s declaration
/// in `ast.rs` — a parser calling this after `lookup` is how a
/// `KeywordEntry` turns back into the typed `Mnemonic` the assembler
/// dispatches on.
pub fn decode_mnemonic(param1: u8) -> Mnemonic {
    const ORDER: [Mnemonic; 59] = [
        Mnemonic::Nop,
        Mnemonic::Stop,
        Mnemonic::Halt,
        Mnemonic::Di,
        Mnemonic::Ei,
        Mnemonic::Eii,
        Mnemonic::Daa,
        Mnemonic::Scf,
        Mnemonic::Ccf,
        Mnemonic::Clv,
        Mnemonic::Sev,
        Mnemonic::Rla,
        Mnemonic::Rlca,
        Mnemonic::Rra,
        Mnemonic::Rrca,
        Mnemonic::Reti,
        Mnemonic::Ret,
        Mnemonic::Push,
        Mnemonic::Pop,
        Mnemonic::Inc,
        Mnemonic::Dec,
        Mnemonic::Not,
        Mnemonic::Sla,
        Mnemonic::Sra,
        Mnemonic::Srl,
        Mnemonic::Swap,
        Mnemonic::Rl,
        Mnemonic::Rlc,
        Mnemonic::Rr,
        Mnemonic::Rrc,
        Mnemonic::Spo,
        Mnemonic::Spi,
        Mnemonic::Int,
        Mnemonic::Ld,
        Mnemonic::St,
        Mnemonic::Ldq,
        Mnemonic::Stq,
        Mnemonic::Ldp,
        Mnemonic::Stp,
        Mnemonic::Mv,
        Mnemonic::Mwh,
        Mnemonic::Mwl,
        Mnemonic::Add,
        Mnemonic::Sub,
        Mnemonic::And,
        Mnemonic::Or,
        Mnemonic::Xor,
        Mnemonic::Cmp,
        Mnemonic::Adc,
        Mnemonic::Sbc,
        Mnemonic::Bit,
        Mnemonic::Set,
        Mnemonic::Res,
        Mnemonic::Tog,
        Mnemonic::Jmp,
        Mnemonic::Call,
        Mnemonic::Jpb,
        Mnemonic::Lsp,
        Mnemonic::Ssp,
    ];
    ORDER[param1 as usize]
}

// The 64 register lexemes are spelled out directly in four blocks of
// 16 so the correspondence to D/W/H/L is visible at a glance.
const REGISTER_LEXEMES_D: [&str; 16] = [
    "D0", "D1", "D2", "D3", "D4", "D5", "D6", "D7", "D8", "D9", "D10", "D11", "D12", "D13", "D14",
    "D15",
];
const REGISTER_LEXEMES_W: [&str; 16] = [
    "W0", "W1", "W2", "W3", "W4", "W5", "W6", "W7", "W8", "W9", "W10", "W11", "W12", "W13", "W14",
    "W15",
];
const REGISTER_LEXEMES_H: [&str; 16] = [
    "H0", "H1", "H2", "H3", "H4", "H5", "H6", "H7", "H8", "H9", "H10", "H11", "H12", "H13", "H14",
    "H15",
];
const REGISTER_LEXEMES_L: [&str; 16] = [
    "L0", "L1", "L2", "L3", "L4", "L5", "L6", "L7", "L8", "L9", "L10", "L11", "L12", "L13", "L14",
    "L15",
];

const CONDITION_CODES: [(&str, ConditionCode); 7] = [
    ("NC", ConditionCode::Nc),
    ("ZS", ConditionCode::Zs),
    ("ZC", ConditionCode::Zc),
    ("CS", ConditionCode::Cs),
    ("CC", ConditionCode::Cc),
    ("VS", ConditionCode::Vs),
    ("VC", ConditionCode::Vc),
];

const DIRECTIVES: [(&str, DirectiveKeyword); 6] = [
    (".ORG", DirectiveKeyword::Org),
    (".BYTE", DirectiveKeyword::Byte),
    (".WORD", DirectiveKeyword::Word),
    (".DWORD", DirectiveKeyword::Dword),
    (".GLOBAL", DirectiveKeyword::Global),
    (".EXTERN", DirectiveKeyword::Extern),
];

/// Every non-alias mnemonic the encoder can dispatch on (§4.1, §4.4).
/// Aliases (`JP`, `JR`, `CP`, `CPL`, `TCF`) are listed separately in
/// `ALIASES` because they normalize to one of these plus, for `CPL`,
/// an implicit operand.
const MNEMONICS: &[(&str, Mnemonic)] = &[
    ("NOP", Mnemonic::Nop),
    ("STOP", Mnemonic::Stop),
    ("HALT", Mnemonic::Halt),
    ("DI", Mnemonic::Di),
    ("EI", Mnemonic::Ei),
    ("EII", Mnemonic::Eii),
    ("DAA", Mnemonic::Daa),
    ("SCF", Mnemonic::Scf),
    ("CCF", Mnemonic::Ccf),
    ("CLV", Mnemonic::Clv),
    ("SEV", Mnemonic::Sev),
    ("RLA", Mnemonic::Rla),
    ("RLCA", Mnemonic::Rlca),
    ("RRA", Mnemonic::Rra),
    ("RRCA", Mnemonic::Rrca),
    ("RETI", Mnemonic::Reti),
    ("RET", Mnemonic::Ret),
    ("PUSH", Mnemonic::Push),
    ("POP", Mnemonic::Pop),
    ("INC", Mnemonic::Inc),
    ("DEC", Mnemonic::Dec),
    ("NOT", Mnemonic::Not),
    ("SLA", Mnemonic::Sla),
    ("SRA", Mnemonic::Sra),
    ("SRL", Mnemonic::Srl),
    ("SWAP", Mnemonic::Swap),
    ("RL", Mnemonic::Rl),
    ("RLC", Mnemonic::Rlc),
    ("RR", Mnemonic::Rr),
    ("RRC", Mnemonic::Rrc),
    ("SPO", Mnemonic::Spo),
    ("SPI", Mnemonic::Spi),
    ("INT", Mnemonic::Int),
    ("LD", Mnemonic::Ld),
    ("ST", Mnemonic::St),
    ("LDQ", Mnemonic::Ldq),
    ("STQ", Mnemonic::Stq),
    ("LDP", Mnemonic::Ldp),
    ("STP", Mnemonic::Stp),
    ("MV", Mnemonic::Mv),
    ("MWH", Mnemonic::Mwh),
    ("MWL", Mnemonic::Mwl),
    ("ADD", Mnemonic::Add),
    ("SUB", Mnemonic::Sub),
    ("AND", Mnemonic::And),
    ("OR", Mnemonic::Or),
    ("XOR", Mnemonic::Xor),
    ("CMP", Mnemonic::Cmp),
    ("ADC", Mnemonic::Adc),
    ("SBC", Mnemonic::Sbc),
    ("BIT", Mnemonic::Bit),
    ("SET", Mnemonic::Set),
    ("RES", Mnemonic::Res),
    ("TOG", Mnemonic::Tog),
    ("JMP", Mnemonic::Jmp),
    ("CALL", Mnemonic::Call),
    ("JPB", Mnemonic::Jpb),
    ("LSP", Mnemonic::Lsp),
    ("SSP", Mnemonic::Ssp),
];

/// `JP≡JMP`, `JR≡JPB`, `CP≡CMP`, `CPL≡NOT L0`, `TCF≡CCF` (§4.1).
const ALIASES: &[(&str, Mnemonic, Option<Register>)] = &[
    ("JP", Mnemonic::Jmp, None),
    ("JR", Mnemonic::Jpb, None),
    ("CP", Mnemonic::Cmp, None),
    ("CPL", Mnemonic::Not, Some(Register::L0)),
    ("TCF", Mnemonic::Ccf, None),
];

fn ascii_upper(lexeme: &str) -> String {
    lexeme.chars().map(|c| c.to_ascii_uppercase()).collect()
}

/// Looks up a lexeme, case-insensitively, against the register,
/// condition-code, directive, mnemonic and alias tables in that
/// order. Returns `None` if the lexeme is not a keyword at all (the
/// "not a keyword" signal from §4.1 — callers treat that as "must be
/// an identifier/label/number instead").
pub fn lookup(lexeme: &str) -> Option<KeywordEntry> {
    let upper = ascii_upper(lexeme);

    for (prefix, width) in [
        (&REGISTER_LEXEMES_D, RegisterWidth::Dword),
        (&REGISTER_LEXEMES_W, RegisterWidth::Word),
        (&REGISTER_LEXEMES_H, RegisterWidth::High),
        (&REGISTER_LEXEMES_L, RegisterWidth::Low),
    ] {
        if let Some(index) = prefix.iter().position(|name| *name == upper) {
            return Some(KeywordEntry {
                lexeme: prefix[index],
                category: Category::Register,
                param1: reg_param(width, index as u8),
                param2: None,
            });
        }
    }

    if let Some((name, cc)) = CONDITION_CODES.iter().find(|(name, _)| *name == upper) {
        return Some(KeywordEntry {
            lexeme: name,
            category: Category::ConditionCode,
            param1: cc.encoding(),
            param2: None,
        });
    }

    if let Some((name, directive)) = DIRECTIVES.iter().find(|(name, _)| *name == upper) {
        return Some(KeywordEntry {
            lexeme: name,
            category: Category::Directive,
            param1: *directive as u8,
            param2: None,
        });
    }

    if let Some((name, mnemonic)) = MNEMONICS.iter().find(|(name, _)| *name == upper) {
        return Some(KeywordEntry {
            lexeme: name,
            category: Category::Mnemonic,
            param1: *mnemonic as u8,
            param2: None,
        });
    }

    if let Some((name, mnemonic, implicit)) = ALIASES.iter().find(|(name, _, _)| *name == upper) {
        return Some(KeywordEntry {
            lexeme: name,
            category: Category::Mnemonic,
            param1: *mnemonic as u8,
            param2: implicit.map(AliasOperand::Register),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let a = lookup("ld").unwrap();
        let b = lookup("LD").unwrap();
        let c = lookup("Ld").unwrap();
        assert_eq!(a.param1, b.param1);
        assert_eq!(b.param1, c.param1);
        assert_eq!(a.category, Category::Mnemonic);
    }

    #[test]
    fn register_packing_matches_width_nibble_contract() {
        let entry = lookup("l3").unwrap();
        assert_eq!(entry.category, Category::Register);
        let reg = decode_register(entry.param1);
        assert_eq!(reg.width, RegisterWidth::Low);
        assert_eq!(reg.index, 3);

        let entry = lookup("d15").unwrap();
        let reg = decode_register(entry.param1);
        assert_eq!(reg.width, RegisterWidth::Dword);
        assert_eq!(reg.index, 15);
    }

    #[test]
    fn condition_codes_match_fixed_numeric_table() {
        assert_eq!(lookup("NC").unwrap().param1, 0);
        assert_eq!(lookup("ZS").unwrap().param1, 1);
        assert_eq!(lookup("ZC").unwrap().param1, 2);
        assert_eq!(lookup("CS").unwrap().param1, 3);
        assert_eq!(lookup("CC").unwrap().param1, 4);
        assert_eq!(lookup("VS").unwrap().param1, 5);
        assert_eq!(lookup("VC").unwrap().param1, 6);
    }

    #[test]
    fn aliases_normalize_to_non_alias_mnemonics() {
        let jp = lookup("JP").unwrap();
        let jmp = lookup("JMP").unwrap();
        assert_eq!(jp.param1, jmp.param1);

        let cpl = lookup("CPL").unwrap();
        let not = lookup("NOT").unwrap();
        assert_eq!(cpl.param1, not.param1);
        assert_eq!(cpl.param2, Some(AliasOperand::Register(Register::L0)));
    }

    #[test]
    fn unknown_lexeme_is_not_a_keyword() {
        assert!(lookup("banana").is_none());
        assert!(lookup("start").is_none());
    }

    #[test]
    fn mnemonic_decode_inverts_lookup_for_every_entry() {
        for (name, mnemonic) in MNEMONICS {
            let entry = lookup(name).unwrap();
            assert_eq!(decode_mnemonic(entry.param1), *mnemonic);
        }
    }

    #[test]
    fn directive_decode_inverts_lookup_for_every_entry() {
        for (name, directive) in DIRECTIVES {
            let entry = lookup(name).unwrap();
            assert_eq!(decode_directive(entry.param1), *directive);
        }
    }
}
