//! Opcode base constants, grouped by category nibble per spec §4.5.
//!
//! Every constant is the 16-bit `base` half of `base | (X<<4) | Y`.
//! `size.rs` and this table are kept in sync by construction: both
//! dispatch on the same (mnemonic, operand-shape) pairs, so a shape
//! `size()` accepts is always one this table also defines a base for.

// Category 0x0 — zero-operand system control (§4.5).
pub const NOP: u16 = 0x0000;
pub const STOP: u16 = 0x0100;
pub const HALT: u16 = 0x0200;
pub const DI: u16 = 0x0300;
pub const EI: u16 = 0x0400;
pub const EII: u16 = 0x0500;
pub const DAA: u16 = 0x0600;
pub const SCF: u16 = 0x0700;
pub const CCF: u16 = 0x0800;
pub const CLV: u16 = 0x0900;
pub const SEV: u16 = 0x0A00;

// Category 0x1 — 8-bit (L) load/store/move.
pub const LD_L_IMM: u16 = 0x1000;
pub const LD_L_ABS32: u16 = 0x1100;
pub const LD_L_IND: u16 = 0x1200;
pub const LDQ_L_ABS16: u16 = 0x1300;
pub const LDQ_L_IND: u16 = 0x1400;
pub const LDP_L_ABS8: u16 = 0x1500;
pub const LDP_L_IND: u16 = 0x1600;
pub const ST_L_ABS32: u16 = 0x1700;
pub const ST_L_IND: u16 = 0x1800;
pub const STQ_L_ABS16: u16 = 0x1900;
pub const STQ_L_IND: u16 = 0x1A00;
pub const STP_L_ABS8: u16 = 0x1B00;
pub const STP_L_IND: u16 = 0x1C00;
pub const MV: u16 = 0x1D00;
pub const MWH: u16 = 0x1E00;
pub const MWL: u16 = 0x1F00;

// Category 0x2 — 16-bit (W) load/store.
pub const LD_W_IMM: u16 = 0x2000;
pub const LD_W_ABS32: u16 = 0x2100;
pub const LD_W_IND: u16 = 0x2200;
pub const LDQ_W_ABS16: u16 = 0x2300;
pub const LDQ_W_IND: u16 = 0x2400;
pub const ST_W_ABS32: u16 = 0x2500;
pub const ST_W_IND: u16 = 0x2600;
pub const STQ_W_ABS16: u16 = 0x2700;
pub const STQ_W_IND: u16 = 0x2800;

// Category 0x3 — 32-bit (D) load/store and the stack pointer family.
pub const LD_D_IMM: u16 = 0x3000;
pub const LD_D_ABS32: u16 = 0x3100;
pub const LD_D_IND: u16 = 0x3200;
pub const LDQ_D_ABS16: u16 = 0x3300;
pub const LDQ_D_IND: u16 = 0x3400;
pub const LSP: u16 = 0x3500;
pub const POP: u16 = 0x3600;
pub const ST_D_ABS32: u16 = 0x3700;
pub const ST_D_IND: u16 = 0x3800;
pub const STQ_D_ABS16: u16 = 0x3900;
pub const STQ_D_IND: u16 = 0x3A00;
pub const SSP_ABS32: u16 = 0x3B00;
pub const PUSH: u16 = 0x3C00;
pub const SSP_REG: u16 = 0x3D00;
pub const SPO: u16 = 0x3E00;
pub const SPI: u16 = 0x3F00;

// Category 0x4 — branches. `X` carries the condition nibble where a
// mnemonic accepts one (§4.5).
pub const JMP_IMM32: u16 = 0x4000;
pub const JMP_REG: u16 = 0x4100;
pub const JPB: u16 = 0x4200;
pub const CALL: u16 = 0x4300;
pub const INT: u16 = 0x4400;
pub const RET: u16 = 0x4500;
pub const RETI: u16 = 0x4600;

// Category 0x5 — 8-bit arithmetic (ADD/SUB/ADC/SBC), three addressing
// modes each, plus INC/DEC.
pub const ADD_L_IMM: u16 = 0x5000;
pub const ADD_L_REG: u16 = 0x5100;
pub const ADD_L_IND: u16 = 0x5200;
pub const SUB_L_IMM: u16 = 0x5300;
pub const SUB_L_REG: u16 = 0x5400;
pub const SUB_L_IND: u16 = 0x5500;
pub const ADC_L_IMM: u16 = 0x5600;
pub const ADC_L_REG: u16 = 0x5700;
pub const ADC_L_IND: u16 = 0x5800;
pub const SBC_L_IMM: u16 = 0x5900;
pub const SBC_L_REG: u16 = 0x5A00;
pub const SBC_L_IND: u16 = 0x5B00;
pub const INC: u16 = 0x5C00;
pub const DEC: u16 = 0x5D00;
pub const NOT: u16 = 0x5E00;

// Category 0x6 — 16-bit (W) arithmetic/logic, two addressing modes.
pub const ADD_W_IMM: u16 = 0x6000;
pub const ADD_W_REG: u16 = 0x6100;
pub const SUB_W_IMM: u16 = 0x6200;
pub const SUB_W_REG: u16 = 0x6300;
pub const ADC_W_IMM: u16 = 0x6400;
pub const ADC_W_REG: u16 = 0x6500;
pub const SBC_W_IMM: u16 = 0x6600;
pub const SBC_W_REG: u16 = 0x6700;
pub const AND_W_IMM: u16 = 0x6800;
pub const AND_W_REG: u16 = 0x6900;
pub const OR_W_IMM: u16 = 0x6A00;
pub const OR_W_REG: u16 = 0x6B00;
pub const XOR_W_IMM: u16 = 0x6C00;
pub const XOR_W_REG: u16 = 0x6D00;
pub const CMP_W_IMM: u16 = 0x6E00;
pub const CMP_W_REG: u16 = 0x6F00;

// Category 0x7 — 8-bit logic (AND/OR/XOR/CMP), three addressing modes.
pub const AND_L_IMM: u16 = 0x7000;
pub const AND_L_REG: u16 = 0x7100;
pub const AND_L_IND: u16 = 0x7200;
pub const OR_L_IMM: u16 = 0x7300;
pub const OR_L_REG: u16 = 0x7400;
pub const OR_L_IND: u16 = 0x7500;
pub const XOR_L_IMM: u16 = 0x7600;
pub const XOR_L_REG: u16 = 0x7700;
pub const XOR_L_IND: u16 = 0x7800;
pub const CMP_L_IMM: u16 = 0x7900;
pub const CMP_L_REG: u16 = 0x7A00;
pub const CMP_L_IND: u16 = 0x7B00;

// Category 0x8 — shifts, single register operand in `X`.
pub const SLA: u16 = 0x8000;
pub const SRA: u16 = 0x8100;
pub const SRL: u16 = 0x8200;
pub const SWAP: u16 = 0x8300;

// Category 0x9 — rotates: accumulator-only forms and register forms.
// `RLCA`/`RLC` bases are load-bearing (exercised directly in S4).
pub const RLA: u16 = 0x9000;
pub const RRA: u16 = 0x9100;
pub const RRCA: u16 = 0x9200;
pub const RLCA: u16 = 0x9300;
pub const RLC: u16 = 0x9400;
pub const RL: u16 = 0x9500;
pub const RR: u16 = 0x9600;
pub const RRC: u16 = 0x9700;

// Category 0xA — bit ops. Bit index is packed into bits 8-10 (the low
// three bits of the subgroup nibble); `X` selects BIT/SET/RES/TOG, `Y`
// is the register index (§4.5).
pub const BIT_BASE: u16 = 0xA000;
pub const BIT_SELECTOR: u16 = 0;
pub const SET_SELECTOR: u16 = 1;
pub const RES_SELECTOR: u16 = 2;
pub const TOG_SELECTOR: u16 = 3;

/// Builds a category-0xA bit-op opcode: `0xA000 | (bit<<8) | (selector<<4) | reg`.
pub fn bit_op_opcode(selector: u16, bit_index: u8, reg_index: u8) -> u16 {
    BIT_BASE | ((bit_index as u16 & 0x7) << 8) | ((selector & 0xF) << 4) | (reg_index as u16 & 0xF)
}
