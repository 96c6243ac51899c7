//! Feature gate: approximates per-instruction feature-bit tests from the
//! small fixed mode-flag set.

use crate::decoder::TableId;
use crate::mode::ModeFlags;

/// Feature ids referenced by decode tables and alias conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Feature {
    MicroMips = 0,
    Mips1 = 1,
    Mips2 = 2,
    Mips3 = 3,
    Mips4_32r2 = 4,
    SoftFloat = 5,
    Mips16 = 6,
    Mips32r6 = 7,
    Mips64r6 = 8,
    Fp64Bit = 9,
    Mips64r2 = 10,
}

impl Feature {
    pub fn from_id(id: u32) -> Option<Feature> {
        match id {
            0 => Some(Feature::MicroMips),
            1 => Some(Feature::Mips1),
            2 => Some(Feature::Mips2),
            3 => Some(Feature::Mips3),
            4 => Some(Feature::Mips4_32r2),
            5 => Some(Feature::SoftFloat),
            6 => Some(Feature::Mips16),
            7 => Some(Feature::Mips32r6),
            8 => Some(Feature::Mips64r6),
            9 => Some(Feature::Fp64Bit),
            10 => Some(Feature::Mips64r2),
            _ => None,
        }
    }
}

/// Whether `feature` is in the state `require` asks for under `mode`.
///
/// `require == false` inverts the test: it asks that the feature be absent.
/// Ids without a mode-bit mapping always pass, so unmodeled features never
/// spuriously reject an instruction.
pub fn check_required(mode: ModeFlags, feature: u32, require: bool) -> bool {
    let Some(feature) = Feature::from_id(feature) else {
        return true;
    };
    match feature {
        Feature::MicroMips | Feature::Mips1 => mode.contains(ModeFlags::MICRO) == require,
        Feature::Mips2 | Feature::Mips4_32r2 => mode.contains(ModeFlags::MICRO) != require,
        Feature::SoftFloat => !require,
        Feature::Mips16 => mode.contains(ModeFlags::MODE_16) == require,
        Feature::Mips32r6 => mode.contains(ModeFlags::MIPS32R6) == require,
        Feature::Mips64r6 => {
            let tiers = ModeFlags::MODE_16 | ModeFlags::MODE_32 | ModeFlags::MIPS32R6 | ModeFlags::MODE_64;
            mode.intersects(tiers) != require
        }
        Feature::Fp64Bit => true,
        Feature::Mips64r2 => mode.contains(ModeFlags::MODE_64) == require,
        Feature::Mips3 => mode.contains(ModeFlags::MIPS3) == require,
    }
}

/// Branch gate for the dispatcher: whether a decode table may be attempted
/// at all under `mode`.
pub fn table_enabled(table: TableId, mode: ModeFlags) -> bool {
    let micro = mode.is_micro();
    match table {
        TableId::Micro16 | TableId::Micro32 => micro,
        TableId::Cop3 => {
            !micro && mode.contains(ModeFlags::MIPS2) && !mode.contains(ModeFlags::MIPS3)
        }
        TableId::Mips32r6_64r6_Gp64 => {
            !micro && mode.contains(ModeFlags::MIPS32R6) && mode.contains(ModeFlags::MODE_64)
        }
        TableId::Mips32r6_64r6 => !micro && mode.contains(ModeFlags::MIPS32R6),
        TableId::Mips64 => !micro && mode.contains(ModeFlags::MODE_64),
        TableId::Mips32 => !micro,
    }
}
