use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::alias::{match_alias_patterns, AliasSet, OperandValidator};
use crate::bytes::{assemble16, assemble32};
use crate::decoder::{DecodeOracle, TableId};
use crate::features::table_enabled;
use crate::image::Image;
use crate::insn::Instruction;
use crate::mode::ModeFlags;
use crate::registers::RegisterInfo;

/// 32-bit candidate tables in precedence order: specialized tables first,
/// the general MIPS32 table last. Candidate tables are not guaranteed
/// disjoint; when a word matches several, the first match is authoritative.
pub const TABLES32: &[TableId] = &[
    TableId::Cop3,
    TableId::Mips32r6_64r6_Gp64,
    TableId::Mips32r6_64r6,
    TableId::Mips64,
    TableId::Mips32,
];

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    /// The window was too short, or every candidate table rejected the word.
    /// Callers cannot act differently on the two, so they share one kind.
    #[error("invalid instruction at {addr:#010x}")]
    InvalidInstruction { addr: u64 },
}

/// One successfully decoded instruction and the byte count it consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoded {
    pub insn: Instruction,
    pub size: u8, // 2 or 4
}

/// Decode front-end: owns the mode flags, the oracle and the static alias
/// and register tables, all fixed at construction. Decoding borrows them
/// read-only, so one `Disassembler` serves any number of threads.
pub struct Disassembler<O> {
    oracle: O,
    mode: ModeFlags,
    aliases: AliasSet,
    regs: RegisterInfo,
    validate: Option<Box<OperandValidator>>,
}

impl<O: DecodeOracle> Disassembler<O> {
    pub fn new(oracle: O, mode: ModeFlags) -> Self {
        Self {
            oracle,
            mode,
            aliases: AliasSet::default(),
            regs: RegisterInfo::default(),
            validate: None,
        }
    }

    pub fn with_aliases(mut self, aliases: AliasSet) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_registers(mut self, regs: RegisterInfo) -> Self {
        self.regs = regs;
        self
    }

    /// Inject the predicate behind `AliasCond::Custom`. Without one, custom
    /// conditions never match.
    pub fn with_operand_validator(mut self, validate: Box<OperandValidator>) -> Self {
        self.validate = Some(validate);
        self
    }

    pub fn mode(&self) -> ModeFlags {
        self.mode
    }

    fn attempt(&self, table: TableId, word: u32, addr: u64) -> Option<Instruction> {
        trace!("trying {:?} table ({:#010x})", table, word);
        self.oracle.try_decode(table, word, addr, self.mode)
    }

    /// Decode one instruction from the start of `code`.
    ///
    /// microMIPS mode tries the 16-bit table on a 2-byte window first and
    /// falls back to the 32-bit microMIPS table; standard mode walks the
    /// 32-bit candidates in `TABLES32` order, skipping tables whose branch
    /// gate rejects the current mode.
    pub fn decode(&self, code: &[u8], addr: u64) -> Result<Decoded, DecodeError> {
        let big = self.mode.is_big_endian();

        if self.mode.is_micro() {
            if code.len() < 2 {
                return Err(DecodeError::InvalidInstruction { addr });
            }
            let word = assemble16(code, big);
            if let Some(insn) = self.attempt(TableId::Micro16, word, addr) {
                return Ok(Decoded { insn, size: 2 });
            }

            if code.len() < 4 {
                return Err(DecodeError::InvalidInstruction { addr });
            }
            let word = assemble32(code, big, true);
            if let Some(insn) = self.attempt(TableId::Micro32, word, addr) {
                return Ok(Decoded { insn, size: 4 });
            }
            return Err(DecodeError::InvalidInstruction { addr });
        }

        if code.len() < 4 {
            return Err(DecodeError::InvalidInstruction { addr });
        }
        let word = assemble32(code, big, false);
        for &table in TABLES32 {
            if !table_enabled(table, self.mode) {
                continue;
            }
            if let Some(insn) = self.attempt(table, word, addr) {
                return Ok(Decoded { insn, size: 4 });
            }
        }
        Err(DecodeError::InvalidInstruction { addr })
    }

    /// Decode one instruction at `addr` inside a loaded image.
    pub fn decode_at(&self, image: &Image, addr: u64) -> Result<Decoded, DecodeError> {
        let code = image
            .window(addr)
            .ok_or(DecodeError::InvalidInstruction { addr })?;
        self.decode(code, addr)
    }

    /// Decode and run the alias matcher over the result.
    pub fn decode_with_alias(
        &self,
        code: &[u8],
        addr: u64,
    ) -> Result<(Decoded, Option<u32>), DecodeError> {
        let decoded = self.decode(code, addr)?;
        let alias = self.alias_offset(&decoded.insn);
        Ok((decoded, alias))
    }

    /// Offset of the first alias pattern the instruction satisfies, if any.
    pub fn alias_offset(&self, insn: &Instruction) -> Option<u32> {
        match_alias_patterns(insn, &self.aliases, &self.regs, self.mode, self.validate.as_deref())
    }

    /// The matched alias rendering string, for the formatting collaborator.
    pub fn alias(&self, insn: &Instruction) -> Option<&str> {
        self.aliases.str_at(self.alias_offset(insn)?)
    }

    /// Walk `code` decoding instruction after instruction, stopping at the
    /// first undecodable word.
    pub fn iter<'a>(&'a self, code: &'a [u8], addr: u64) -> InsnIter<'a, O> {
        InsnIter { dis: self, code, addr }
    }
}

/// Iterator over consecutive decoded instructions; see [`Disassembler::iter`].
pub struct InsnIter<'a, O> {
    dis: &'a Disassembler<O>,
    code: &'a [u8],
    addr: u64,
}

impl<O: DecodeOracle> Iterator for InsnIter<'_, O> {
    type Item = (u64, Decoded);

    fn next(&mut self) -> Option<Self::Item> {
        let decoded = self.dis.decode(self.code, self.addr).ok()?;
        let size = decoded.size as usize;
        let addr = self.addr;
        self.code = &self.code[size..];
        self.addr += size as u64;
        Some((addr, decoded))
    }
}
