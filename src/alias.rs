//! Post-decode alias matching: rewrites an instruction into a simpler
//! canonical form when its operand values fit a named pattern.
//!
//! The tables here are generated offline together with the decode tables;
//! this module only loads and evaluates them.

use serde::{Deserialize, Serialize};

use crate::features::check_required;
use crate::insn::{Instruction, Operand};
use crate::mode::ModeFlags;
use crate::registers::RegisterInfo;

/// One alias condition. Feature-kind variants consume no operand; every
/// other variant reads exactly one operand and advances the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AliasCond {
    /// Operand must be this exact immediate.
    Imm(i64),
    /// Operand must be this exact register.
    Reg(u32),
    /// Operand must be a register equal to the register in operand slot `n`.
    TiedReg(u32),
    /// Operand must be a register contained in this register class.
    RegClass(u32),
    /// Operand is judged by the injected validator; matches nothing without one.
    Custom(u32),
    /// Operand can be anything.
    Ignore,
    /// Feature must be present.
    Feature(u32),
    /// Feature must be absent.
    NegFeature(u32),
    /// Member of an or-group: feature present.
    OrFeature(u32),
    /// Member of an or-group: feature absent.
    OrNegFeature(u32),
    /// Closes an or-group and yields its accumulated result.
    EndOrFeatures,
}

/// One alias pattern: a run of conditions, the operand count it applies to,
/// and the offset of its rendering string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasPattern {
    pub num_operands: u32,
    pub cond_start: u32,
    pub num_conds: u32,
    pub asm_str_offset: u32,
}

/// Index entry mapping an opcode to its pattern range. The full index is
/// sorted ascending by opcode; `AliasSet` construction enforces this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpcodePatterns {
    pub opcode: u32,
    pub pattern_start: u32,
    pub num_patterns: u32,
}

#[derive(thiserror::Error, Debug)]
pub enum AliasLoadError {
    #[error("malformed alias table: {0}")]
    Json(#[from] serde_json::Error),
    #[error("alias index not sorted by opcode at entry {index}")]
    UnsortedIndex { index: usize },
    #[error("pattern range {start}..{end} out of bounds for opcode entry {index}")]
    PatternRange { index: usize, start: u64, end: u64 },
    #[error("condition range {start}..{end} out of bounds for pattern {index}")]
    CondRange { index: usize, start: u64, end: u64 },
    #[error("asm string offset {offset} out of bounds for pattern {index}")]
    StrOffset { index: usize, offset: u32 },
}

/// The full alias table set for one architecture: sorted opcode index,
/// patterns, conditions and the NUL-separated rendering-string blob.
/// Loaded once, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasSet {
    index: Vec<OpcodePatterns>,
    patterns: Vec<AliasPattern>,
    conds: Vec<AliasCond>,
    asm_strings: String,
}

impl AliasSet {
    /// Build a set, verifying the loader-time invariants: the index is
    /// strictly ascending by opcode and every cross-reference is in bounds.
    /// Match time relies on these without re-checking.
    pub fn new(
        index: Vec<OpcodePatterns>,
        patterns: Vec<AliasPattern>,
        conds: Vec<AliasCond>,
        asm_strings: String,
    ) -> Result<Self, AliasLoadError> {
        let set = Self { index, patterns, conds, asm_strings };
        set.validate()
    }

    pub fn from_json_str(text: &str) -> Result<Self, AliasLoadError> {
        let set: AliasSet = serde_json::from_str(text)?;
        set.validate()
    }

    fn validate(self) -> Result<Self, AliasLoadError> {
        for (i, pair) in self.index.windows(2).enumerate() {
            if pair[0].opcode >= pair[1].opcode {
                return Err(AliasLoadError::UnsortedIndex { index: i + 1 });
            }
        }
        for (i, entry) in self.index.iter().enumerate() {
            let start = entry.pattern_start as u64;
            let end = start + entry.num_patterns as u64;
            if end > self.patterns.len() as u64 {
                return Err(AliasLoadError::PatternRange { index: i, start, end });
            }
        }
        for (i, pattern) in self.patterns.iter().enumerate() {
            let start = pattern.cond_start as u64;
            let end = start + pattern.num_conds as u64;
            if end > self.conds.len() as u64 {
                return Err(AliasLoadError::CondRange { index: i, start, end });
            }
            let offset = pattern.asm_str_offset;
            if offset as usize >= self.asm_strings.len()
                || !self.asm_strings.is_char_boundary(offset as usize)
            {
                return Err(AliasLoadError::StrOffset { index: i, offset });
            }
        }
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Resolve a matched offset to the alias rendering string (up to the
    /// next NUL). Rendering itself belongs to the formatting collaborator.
    pub fn str_at(&self, offset: u32) -> Option<&str> {
        let rest = self.asm_strings.get(offset as usize..)?;
        let end = rest.find('\0').unwrap_or(rest.len());
        Some(&rest[..end])
    }
}

/// Custom alias-condition predicate, injected by the consumer. The second
/// argument is the condition's value field from the generated tables.
pub type OperandValidator = dyn Fn(&Operand, u32) -> bool + Send + Sync;

/// Find the first alias pattern the instruction satisfies and return its
/// rendering-string offset.
///
/// Opcodes without patterns resolve through a binary search of the index
/// alone. Within one opcode, patterns are tried in stored order and the
/// first fully passing one wins; the generator is expected to keep patterns
/// for one opcode mutually exclusive.
pub fn match_alias_patterns(
    insn: &Instruction,
    set: &AliasSet,
    regs: &RegisterInfo,
    mode: ModeFlags,
    validate: Option<&OperandValidator>,
) -> Option<u32> {
    let slot = set
        .index
        .binary_search_by_key(&insn.opcode(), |entry| entry.opcode)
        .ok()?;
    let entry = set.index[slot];
    let patterns =
        &set.patterns[entry.pattern_start as usize..][..entry.num_patterns as usize];

    for pattern in patterns {
        // A pattern only applies to its declared operand count; on mismatch
        // move on without evaluating any condition.
        if insn.num_operands() != pattern.num_operands as usize {
            continue;
        }
        let conds = &set.conds[pattern.cond_start as usize..][..pattern.num_conds as usize];
        let mut cursor = 0usize;
        let mut or_result = false;
        let mut pass = true;
        for cond in conds {
            pass &= match_condition(insn, cond, &mut cursor, &mut or_result, regs, mode, validate);
            if !pass {
                break;
            }
        }
        if pass {
            return Some(pattern.asm_str_offset);
        }
    }
    None
}

/// Evaluate one condition, advancing the operand cursor for consuming kinds.
///
/// Or-group members report local success and defer the real verdict to the
/// closing `EndOrFeatures`, which yields the accumulated OR and resets the
/// accumulator.
fn match_condition(
    insn: &Instruction,
    cond: &AliasCond,
    cursor: &mut usize,
    or_result: &mut bool,
    regs: &RegisterInfo,
    mode: ModeFlags,
    validate: Option<&OperandValidator>,
) -> bool {
    match *cond {
        AliasCond::Feature(id) => return check_required(mode, id, true),
        AliasCond::NegFeature(id) => return check_required(mode, id, false),
        AliasCond::OrFeature(id) => {
            *or_result |= check_required(mode, id, true);
            return true;
        }
        AliasCond::OrNegFeature(id) => {
            *or_result |= check_required(mode, id, false);
            return true;
        }
        AliasCond::EndOrFeatures => {
            let res = *or_result;
            *or_result = false;
            return res;
        }
        _ => {}
    }

    let Some(opnd) = insn.operand(*cursor) else {
        return false;
    };
    *cursor += 1;
    match *cond {
        AliasCond::Imm(value) => opnd.imm() == Some(value),
        AliasCond::Reg(reg) => opnd.reg() == Some(reg),
        AliasCond::TiedReg(slot) => {
            let tied = insn.operand(slot as usize).and_then(Operand::reg);
            opnd.reg().is_some() && opnd.reg() == tied
        }
        AliasCond::RegClass(class) => {
            opnd.reg().is_some_and(|reg| regs.class_contains(class, reg))
        }
        AliasCond::Custom(value) => validate.is_some_and(|v| v(opnd, value)),
        AliasCond::Ignore => true,
        // Feature kinds were handled above.
        AliasCond::Feature(_)
        | AliasCond::NegFeature(_)
        | AliasCond::OrFeature(_)
        | AliasCond::OrNegFeature(_)
        | AliasCond::EndOrFeatures => false,
    }
}
