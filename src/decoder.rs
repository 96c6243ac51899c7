use serde::{Deserialize, Serialize};

use crate::insn::Instruction;
use crate::mode::ModeFlags;

/// Handles for the offline-generated bit-pattern decode tables. The table
/// layout itself is opaque to this crate; an oracle interprets the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableId {
    Micro16,
    Micro32,
    Cop3,
    Mips32r6_64r6_Gp64,
    Mips32r6_64r6,
    Mips64,
    Mips32,
}

/// Decode oracle seam: maps (table, raw word) to a decoded instruction.
///
/// Implementations wrap the generated per-opcode matchers; the dispatcher
/// never looks inside a table, it only observes success or failure. `addr`
/// is the instruction address, available for PC-relative operand decoding.
pub trait DecodeOracle {
    fn try_decode(&self, table: TableId, insn: u32, addr: u64, mode: ModeFlags) -> Option<Instruction>;
}
