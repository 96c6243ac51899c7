//! Example decode oracle covering a representative slice of the classic
//! MIPS32 encodings plus the 16-bit microMIPS MOVE16, with matching alias
//! tables. It stands in for the offline-generated tables so the crate can
//! be exercised end to end; real consumers plug in their own oracle.

use crate::alias::{AliasCond, AliasPattern, AliasSet, OpcodePatterns};
use crate::decoder::{DecodeOracle, TableId};
use crate::insn::Instruction;
use crate::mode::ModeFlags;
use crate::registers::RegisterInfo;

/// Opcode ids for the example subset, in the role the generated instruction
/// enum plays for real tables.
pub mod opcode {
    pub const ADDIU: u32 = 1;
    pub const ADDU: u32 = 2;
    pub const AND: u32 = 3;
    pub const BEQ: u32 = 4;
    pub const BNE: u32 = 5;
    pub const J: u32 = 6;
    pub const JAL: u32 = 7;
    pub const JALR: u32 = 8;
    pub const JR: u32 = 9;
    pub const LUI: u32 = 10;
    pub const LW: u32 = 11;
    pub const NOR: u32 = 12;
    pub const OR: u32 = 13;
    pub const ORI: u32 = 14;
    pub const SLL: u32 = 15;
    pub const SLT: u32 = 16;
    pub const SUBU: u32 = 17;
    pub const SW: u32 = 18;
    pub const XOR: u32 = 19;
    pub const MOVE16: u32 = 20;
}

/// The `$zero` register id.
pub const ZERO: u32 = 0;

/// Register-class id of the 32-bit general-purpose registers.
pub const GPR32: u32 = 0;

#[derive(Debug, Clone, Copy)]
pub struct InstrDesc {
    pub opcode: u32,
    pub mnemonic: &'static str,
}

pub const TABLE: &[InstrDesc] = &[
    InstrDesc { opcode: opcode::ADDIU, mnemonic: "addiu" },
    InstrDesc { opcode: opcode::ADDU, mnemonic: "addu" },
    InstrDesc { opcode: opcode::AND, mnemonic: "and" },
    InstrDesc { opcode: opcode::BEQ, mnemonic: "beq" },
    InstrDesc { opcode: opcode::BNE, mnemonic: "bne" },
    InstrDesc { opcode: opcode::J, mnemonic: "j" },
    InstrDesc { opcode: opcode::JAL, mnemonic: "jal" },
    InstrDesc { opcode: opcode::JALR, mnemonic: "jalr" },
    InstrDesc { opcode: opcode::JR, mnemonic: "jr" },
    InstrDesc { opcode: opcode::LUI, mnemonic: "lui" },
    InstrDesc { opcode: opcode::LW, mnemonic: "lw" },
    InstrDesc { opcode: opcode::NOR, mnemonic: "nor" },
    InstrDesc { opcode: opcode::OR, mnemonic: "or" },
    InstrDesc { opcode: opcode::ORI, mnemonic: "ori" },
    InstrDesc { opcode: opcode::SLL, mnemonic: "sll" },
    InstrDesc { opcode: opcode::SLT, mnemonic: "slt" },
    InstrDesc { opcode: opcode::SUBU, mnemonic: "subu" },
    InstrDesc { opcode: opcode::SW, mnemonic: "sw" },
    InstrDesc { opcode: opcode::XOR, mnemonic: "xor" },
    InstrDesc { opcode: opcode::MOVE16, mnemonic: "move16" },
];

pub fn mnemonic(opcode: u32) -> Option<&'static str> {
    TABLE.iter().find(|d| d.opcode == opcode).map(|d| d.mnemonic)
}

/// GPR32 = registers 0..=31.
pub fn example_registers() -> RegisterInfo {
    RegisterInfo::new(vec![(0..32).collect()])
}

pub struct Mips32Oracle;

impl Mips32Oracle {
    pub fn new() -> Self {
        Self
    }
}

impl DecodeOracle for Mips32Oracle {
    fn try_decode(&self, table: TableId, insn: u32, _addr: u64, _mode: ModeFlags) -> Option<Instruction> {
        match table {
            TableId::Mips32 => decode_mips32(insn),
            TableId::Micro16 => decode_micro16(insn),
            _ => None,
        }
    }
}

#[inline]
fn sign_ext16(v: u32) -> i64 {
    v as u16 as i16 as i64
}

fn rrr(opcode: u32, a: u32, b: u32, c: u32) -> Instruction {
    let mut insn = Instruction::new(opcode);
    insn.push_reg(a);
    insn.push_reg(b);
    insn.push_reg(c);
    insn
}

fn rri(opcode: u32, a: u32, b: u32, imm: i64) -> Instruction {
    let mut insn = Instruction::new(opcode);
    insn.push_reg(a);
    insn.push_reg(b);
    insn.push_imm(imm);
    insn
}

fn decode_mips32(word: u32) -> Option<Instruction> {
    let op = word >> 26;
    let rs = (word >> 21) & 0x1F;
    let rt = (word >> 16) & 0x1F;
    let rd = (word >> 11) & 0x1F;
    let sa = (word >> 6) & 0x1F;
    let imm16 = word & 0xFFFF;

    if op == 0x00 {
        // SPECIAL block
        let funct = word & 0x3F;
        return match funct {
            0x00 if rs == 0 => Some(rri(opcode::SLL, rd, rt, sa as i64)),
            0x08 if rt == 0 && rd == 0 && sa == 0 => {
                let mut insn = Instruction::new(opcode::JR);
                insn.push_reg(rs);
                Some(insn)
            }
            0x09 if rt == 0 && sa == 0 => {
                let mut insn = Instruction::new(opcode::JALR);
                insn.push_reg(rd);
                insn.push_reg(rs);
                Some(insn)
            }
            0x21 if sa == 0 => Some(rrr(opcode::ADDU, rd, rs, rt)),
            0x23 if sa == 0 => Some(rrr(opcode::SUBU, rd, rs, rt)),
            0x24 if sa == 0 => Some(rrr(opcode::AND, rd, rs, rt)),
            0x25 if sa == 0 => Some(rrr(opcode::OR, rd, rs, rt)),
            0x26 if sa == 0 => Some(rrr(opcode::XOR, rd, rs, rt)),
            0x27 if sa == 0 => Some(rrr(opcode::NOR, rd, rs, rt)),
            0x2A if sa == 0 => Some(rrr(opcode::SLT, rd, rs, rt)),
            _ => None,
        };
    }

    match op {
        0x02 | 0x03 => {
            let target = ((word & 0x03FF_FFFF) << 2) as i64;
            let mut insn = Instruction::new(if op == 0x02 { opcode::J } else { opcode::JAL });
            insn.push_imm(target);
            Some(insn)
        }
        // Branch offsets are left shifted by two, relative to the delay slot.
        0x04 => Some(rri(opcode::BEQ, rs, rt, sign_ext16(imm16) << 2)),
        0x05 => Some(rri(opcode::BNE, rs, rt, sign_ext16(imm16) << 2)),
        0x09 => Some(rri(opcode::ADDIU, rt, rs, sign_ext16(imm16))),
        0x0D => Some(rri(opcode::ORI, rt, rs, imm16 as i64)),
        0x0F if rs == 0 => {
            let mut insn = Instruction::new(opcode::LUI);
            insn.push_reg(rt);
            insn.push_imm(imm16 as i64);
            Some(insn)
        }
        0x23 => Some(rri(opcode::LW, rt, rs, sign_ext16(imm16))),
        0x2B => Some(rri(opcode::SW, rt, rs, sign_ext16(imm16))),
        _ => None,
    }
}

fn decode_micro16(word: u32) -> Option<Instruction> {
    let half = word & 0xFFFF;
    // MOVE16 rd, rs: major opcode 0b000011 in bits 15..10
    if half >> 10 == 0x03 {
        let rd = (half >> 5) & 0x1F;
        let rs = half & 0x1F;
        let mut insn = Instruction::new(opcode::MOVE16);
        insn.push_reg(rd);
        insn.push_reg(rs);
        return Some(insn);
    }
    None
}

fn intern(blob: &mut String, s: &str) -> u32 {
    let off = blob.len() as u32;
    blob.push_str(s);
    blob.push('\0');
    off
}

fn push_pattern(
    patterns: &mut Vec<AliasPattern>,
    conds: &mut Vec<AliasCond>,
    num_operands: u32,
    cs: &[AliasCond],
    asm_str_offset: u32,
) {
    let cond_start = conds.len() as u32;
    conds.extend_from_slice(cs);
    patterns.push(AliasPattern {
        num_operands,
        cond_start,
        num_conds: cs.len() as u32,
        asm_str_offset,
    });
}

/// Alias tables matching the example subset: the classic `move`, `nop`,
/// `b`, `li` and `not` rewrites, plus the microMIPS `move16` forms.
pub fn example_alias_set() -> AliasSet {
    use AliasCond::{Ignore, Imm, Reg, RegClass};

    let mut blob = String::new();
    let li = intern(&mut blob, "li\t$1, $3");
    let mv = intern(&mut blob, "move\t$1, $2");
    let b = intern(&mut blob, "b\t$3");
    let not = intern(&mut blob, "not\t$1, $2");
    let nop = intern(&mut blob, "nop");

    let mut index = Vec::new();
    let mut patterns = Vec::new();
    let mut conds = Vec::new();

    // ADDIU rt, rs, imm  ->  li rt, imm      when rs is $zero
    index.push(OpcodePatterns {
        opcode: opcode::ADDIU,
        pattern_start: patterns.len() as u32,
        num_patterns: 1,
    });
    push_pattern(&mut patterns, &mut conds, 3, &[RegClass(GPR32), Reg(ZERO), Ignore], li);

    // ADDU rd, rs, rt  ->  move rd, rs       when rt is $zero
    index.push(OpcodePatterns {
        opcode: opcode::ADDU,
        pattern_start: patterns.len() as u32,
        num_patterns: 1,
    });
    push_pattern(&mut patterns, &mut conds, 3, &[RegClass(GPR32), RegClass(GPR32), Reg(ZERO)], mv);

    // BEQ rs, rt, off  ->  b off             when both registers are $zero
    index.push(OpcodePatterns {
        opcode: opcode::BEQ,
        pattern_start: patterns.len() as u32,
        num_patterns: 1,
    });
    push_pattern(&mut patterns, &mut conds, 3, &[Reg(ZERO), Reg(ZERO), Ignore], b);

    // NOR rd, rs, rt  ->  not rd, rs         when rt is $zero
    index.push(OpcodePatterns {
        opcode: opcode::NOR,
        pattern_start: patterns.len() as u32,
        num_patterns: 1,
    });
    push_pattern(&mut patterns, &mut conds, 3, &[RegClass(GPR32), RegClass(GPR32), Reg(ZERO)], not);

    // SLL $zero, $zero, 0  ->  nop
    index.push(OpcodePatterns {
        opcode: opcode::SLL,
        pattern_start: patterns.len() as u32,
        num_patterns: 1,
    });
    push_pattern(&mut patterns, &mut conds, 3, &[Reg(ZERO), Reg(ZERO), Imm(0)], nop);

    // MOVE16 rd, rs  ->  nop when both are $zero, move rd, rs otherwise
    index.push(OpcodePatterns {
        opcode: opcode::MOVE16,
        pattern_start: patterns.len() as u32,
        num_patterns: 2,
    });
    push_pattern(&mut patterns, &mut conds, 2, &[Reg(ZERO), Reg(ZERO)], nop);
    push_pattern(&mut patterns, &mut conds, 2, &[RegClass(GPR32), RegClass(GPR32)], mv);

    AliasSet::new(index, patterns, conds, blob).expect("example alias tables are well formed")
}
