use serde::{Deserialize, Serialize};

/// A single instruction operand. Order within an instruction is significant
/// and stable across the decode/alias pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    /// Immediate integer (sign-extended where the encoding calls for it).
    Imm(i64),
    /// Register id.
    Reg(u32),
    /// Oracle-defined payload the core carries through untouched.
    Payload(u64),
}

impl Operand {
    pub fn is_imm(&self) -> bool {
        matches!(self, Operand::Imm(_))
    }

    pub fn is_reg(&self) -> bool {
        matches!(self, Operand::Reg(_))
    }

    pub fn imm(&self) -> Option<i64> {
        match self {
            Operand::Imm(v) => Some(*v),
            _ => None,
        }
    }

    pub fn reg(&self) -> Option<u32> {
        match self {
            Operand::Reg(r) => Some(*r),
            _ => None,
        }
    }
}

/// A decoded instruction: opcode id plus ordered operands. Written by the
/// decode oracle, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    opcode: u32,
    operands: Vec<Operand>,
}

impl Instruction {
    pub fn new(opcode: u32) -> Self {
        Self { opcode, operands: Vec::new() }
    }

    pub fn opcode(&self) -> u32 {
        self.opcode
    }

    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    pub fn operand(&self, idx: usize) -> Option<&Operand> {
        self.operands.get(idx)
    }

    pub fn num_operands(&self) -> usize {
        self.operands.len()
    }

    pub fn push(&mut self, op: Operand) {
        self.operands.push(op);
    }

    pub fn push_reg(&mut self, reg: u32) {
        self.push(Operand::Reg(reg));
    }

    pub fn push_imm(&mut self, imm: i64) {
        self.push(Operand::Imm(imm));
    }
}
