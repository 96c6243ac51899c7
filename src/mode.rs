use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Architecture mode bits fixed for the lifetime of a disassembler:
    /// word width, endianness, microMIPS encoding, ISA revision.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ModeFlags: u32 {
        const MODE_16 = 1 << 1;
        const MODE_32 = 1 << 2;
        const MODE_64 = 1 << 3;
        const MICRO = 1 << 4;
        const MIPS3 = 1 << 5;
        const MIPS32R6 = 1 << 6;
        const MIPS2 = 1 << 7;
        const BIG_ENDIAN = 1 << 31;
    }
}

impl ModeFlags {
    pub fn is_big_endian(self) -> bool {
        self.contains(ModeFlags::BIG_ENDIAN)
    }

    pub fn is_micro(self) -> bool {
        self.contains(ModeFlags::MICRO)
    }
}

impl Default for ModeFlags {
    fn default() -> Self {
        // MIPS binaries are most commonly 32-bit little-endian
        ModeFlags::MODE_32
    }
}
