pub mod alias;
pub mod bytes;
pub mod decoder;
pub mod dispatch;
pub mod features;
pub mod image;
pub mod insn;
pub mod mode;
pub mod registers;

pub mod isa {
    pub mod mips32; // example MIPS32/microMIPS subset oracle
}

pub use dispatch::{DecodeError, Decoded, Disassembler};
pub use insn::{Instruction, Operand};
pub use mode::ModeFlags;
