use std::sync::atomic::{AtomicUsize, Ordering};

use mips_rs::alias::{
    match_alias_patterns, AliasCond, AliasLoadError, AliasPattern, AliasSet, OpcodePatterns,
};
use mips_rs::features::Feature;
use mips_rs::registers::RegisterInfo;
use mips_rs::{Instruction, ModeFlags, Operand};
use pretty_assertions::assert_eq;

const MICRO_ID: u32 = Feature::MicroMips as u32;
const MIPS64R2_ID: u32 = Feature::Mips64r2 as u32;

/// One opcode, patterns laid out back to back over a flat condition pool.
fn set_for(opcode: u32, pats: &[(u32, &[AliasCond])]) -> AliasSet {
    let mut patterns = Vec::new();
    let mut conds = Vec::new();
    let mut blob = String::new();
    for (i, (num_operands, cs)) in pats.iter().enumerate() {
        let asm_str_offset = blob.len() as u32;
        blob.push_str(&format!("alias{i}\0"));
        patterns.push(AliasPattern {
            num_operands: *num_operands,
            cond_start: conds.len() as u32,
            num_conds: cs.len() as u32,
            asm_str_offset,
        });
        conds.extend_from_slice(cs);
    }
    let index = vec![OpcodePatterns {
        opcode,
        pattern_start: 0,
        num_patterns: pats.len() as u32,
    }];
    AliasSet::new(index, patterns, conds, blob).unwrap()
}

fn insn(opcode: u32, ops: &[Operand]) -> Instruction {
    let mut insn = Instruction::new(opcode);
    for op in ops {
        insn.push(*op);
    }
    insn
}

fn regs() -> RegisterInfo {
    // class 0: r0..r7, class 1: r8..r15
    RegisterInfo::new(vec![(0..8).collect(), (8..16).collect()])
}

fn run(i: &Instruction, set: &AliasSet, mode: ModeFlags) -> Option<u32> {
    match_alias_patterns(i, set, &regs(), mode, None)
}

#[test]
fn absent_opcode_returns_nothing() {
    let set = set_for(5, &[(0, &[])]);
    assert_eq!(run(&insn(7, &[]), &set, ModeFlags::default()), None);
}

#[test]
fn operand_count_gate_skips_without_evaluating() {
    let calls = std::sync::Arc::new(AtomicUsize::new(0));
    let calls_inner = calls.clone();
    let validate = move |_op: &Operand, _v: u32| {
        calls_inner.fetch_add(1, Ordering::Relaxed);
        true
    };
    let set = set_for(4, &[(2, &[AliasCond::Custom(0), AliasCond::Custom(0)])]);
    let i = insn(4, &[Operand::Reg(1), Operand::Reg(2), Operand::Reg(3)]);
    let got = match_alias_patterns(&i, &set, &regs(), ModeFlags::default(), Some(&validate));
    assert_eq!(got, None);
    assert_eq!(calls.load(Ordering::Relaxed), 0);
}

#[test]
fn second_pattern_wins_when_first_fails() {
    use AliasCond::{Ignore, RegClass};
    let set = set_for(
        2,
        &[
            (3, &[RegClass(1), Ignore, Ignore]),
            (3, &[RegClass(0), Ignore, Ignore]),
        ],
    );
    let i = insn(2, &[Operand::Reg(2), Operand::Reg(3), Operand::Reg(0)]);
    let got = run(&i, &set, ModeFlags::default()).unwrap();
    assert_eq!(set.str_at(got), Some("alias1"));
}

#[test]
fn first_match_wins_among_satisfiable_patterns() {
    use AliasCond::Ignore;
    let set = set_for(9, &[(1, &[Ignore]), (1, &[Ignore])]);
    let i = insn(9, &[Operand::Imm(5)]);
    let got = run(&i, &set, ModeFlags::default()).unwrap();
    assert_eq!(set.str_at(got), Some("alias0"));
}

#[test]
fn cursor_resets_between_pattern_attempts() {
    use AliasCond::{Ignore, Reg};
    let set = set_for(3, &[(2, &[Ignore, Reg(9)]), (2, &[Reg(1), Reg(2)])]);
    let i = insn(3, &[Operand::Reg(1), Operand::Reg(2)]);
    let got = run(&i, &set, ModeFlags::default()).unwrap();
    assert_eq!(set.str_at(got), Some("alias1"));
}

#[test]
fn exact_imm_and_reg_conditions() {
    use AliasCond::{Imm, Reg};
    let set = set_for(6, &[(2, &[Reg(7), Imm(42)])]);
    assert!(run(&insn(6, &[Operand::Reg(7), Operand::Imm(42)]), &set, ModeFlags::default()).is_some());
    assert!(run(&insn(6, &[Operand::Reg(7), Operand::Imm(41)]), &set, ModeFlags::default()).is_none());
    assert!(run(&insn(6, &[Operand::Imm(7), Operand::Imm(42)]), &set, ModeFlags::default()).is_none());
}

#[test]
fn tied_register_condition() {
    use AliasCond::{Ignore, TiedReg};
    let set = set_for(8, &[(2, &[Ignore, TiedReg(0)])]);
    assert!(run(&insn(8, &[Operand::Reg(4), Operand::Reg(4)]), &set, ModeFlags::default()).is_some());
    assert!(run(&insn(8, &[Operand::Reg(4), Operand::Reg(5)]), &set, ModeFlags::default()).is_none());
    // Tying to a non-register operand can never hold.
    assert!(run(&insn(8, &[Operand::Imm(4), Operand::Reg(4)]), &set, ModeFlags::default()).is_none());
}

#[test]
fn custom_condition_defaults_to_no_match() {
    let set = set_for(1, &[(1, &[AliasCond::Custom(3)])]);
    let i = insn(1, &[Operand::Imm(1)]);
    assert_eq!(run(&i, &set, ModeFlags::default()), None);

    let validate = |op: &Operand, v: u32| v == 3 && op.imm() == Some(1);
    let got = match_alias_patterns(&i, &set, &regs(), ModeFlags::default(), Some(&validate));
    assert!(got.is_some());
}

#[test]
fn feature_conditions_follow_mode_flags() {
    use AliasCond::{Feature, NegFeature};
    let set = set_for(5, &[(0, &[Feature(MICRO_ID)])]);
    assert!(run(&insn(5, &[]), &set, ModeFlags::MICRO).is_some());
    assert!(run(&insn(5, &[]), &set, ModeFlags::empty()).is_none());

    let set = set_for(5, &[(0, &[NegFeature(MICRO_ID)])]);
    assert!(run(&insn(5, &[]), &set, ModeFlags::empty()).is_some());
    assert!(run(&insn(5, &[]), &set, ModeFlags::MICRO).is_none());

    // Unmodeled feature ids never reject.
    let set = set_for(5, &[(0, &[Feature(999)])]);
    assert!(run(&insn(5, &[]), &set, ModeFlags::empty()).is_some());
}

#[test]
fn or_group_passes_when_any_member_holds() {
    use AliasCond::{EndOrFeatures, OrFeature};
    let set = set_for(
        5,
        &[(0, &[OrFeature(MICRO_ID), OrFeature(MIPS64R2_ID), EndOrFeatures])],
    );
    assert!(run(&insn(5, &[]), &set, ModeFlags::MICRO).is_some());
    assert!(run(&insn(5, &[]), &set, ModeFlags::MODE_64).is_some());
    assert!(run(&insn(5, &[]), &set, ModeFlags::empty()).is_none());
}

#[test]
fn empty_or_group_fails() {
    let set = set_for(5, &[(0, &[AliasCond::EndOrFeatures])]);
    assert_eq!(run(&insn(5, &[]), &set, ModeFlags::MICRO), None);
}

#[test]
fn or_neg_feature_member() {
    use AliasCond::{EndOrFeatures, OrNegFeature};
    let set = set_for(5, &[(0, &[OrNegFeature(MICRO_ID), EndOrFeatures])]);
    assert!(run(&insn(5, &[]), &set, ModeFlags::empty()).is_some());
    assert!(run(&insn(5, &[]), &set, ModeFlags::MICRO).is_none());
}

#[test]
fn loader_rejects_unsorted_index() {
    let index = vec![
        OpcodePatterns { opcode: 9, pattern_start: 0, num_patterns: 0 },
        OpcodePatterns { opcode: 4, pattern_start: 0, num_patterns: 0 },
    ];
    let err = AliasSet::new(index, Vec::new(), Vec::new(), String::new()).unwrap_err();
    assert!(matches!(err, AliasLoadError::UnsortedIndex { index: 1 }));
}

#[test]
fn loader_rejects_out_of_range_references() {
    let index = vec![OpcodePatterns { opcode: 1, pattern_start: 0, num_patterns: 2 }];
    let patterns = vec![AliasPattern {
        num_operands: 0,
        cond_start: 0,
        num_conds: 0,
        asm_str_offset: 0,
    }];
    let err = AliasSet::new(index, patterns, Vec::new(), "x\0".into()).unwrap_err();
    assert!(matches!(err, AliasLoadError::PatternRange { index: 0, .. }));

    let index = vec![OpcodePatterns { opcode: 1, pattern_start: 0, num_patterns: 1 }];
    let patterns = vec![AliasPattern {
        num_operands: 0,
        cond_start: 0,
        num_conds: 3,
        asm_str_offset: 0,
    }];
    let err = AliasSet::new(index, patterns, vec![AliasCond::Ignore], "x\0".into()).unwrap_err();
    assert!(matches!(err, AliasLoadError::CondRange { index: 0, .. }));

    let index = vec![OpcodePatterns { opcode: 1, pattern_start: 0, num_patterns: 1 }];
    let patterns = vec![AliasPattern {
        num_operands: 0,
        cond_start: 0,
        num_conds: 0,
        asm_str_offset: 40,
    }];
    let err = AliasSet::new(index, patterns, Vec::new(), "x\0".into()).unwrap_err();
    assert!(matches!(err, AliasLoadError::StrOffset { index: 0, offset: 40 }));
}

#[test]
fn json_round_trip() {
    let set = set_for(
        2,
        &[(3, &[AliasCond::RegClass(0), AliasCond::Ignore, AliasCond::Reg(0)])],
    );
    let text = serde_json::to_string(&set).unwrap();
    let loaded = AliasSet::from_json_str(&text).unwrap();
    assert_eq!(loaded, set);

    let i = insn(2, &[Operand::Reg(1), Operand::Reg(2), Operand::Reg(0)]);
    assert_eq!(run(&i, &loaded, ModeFlags::default()), Some(0));
}

#[test]
fn str_at_resolves_to_nul() {
    let set = set_for(1, &[(0, &[]), (0, &[])]);
    assert_eq!(set.str_at(0), Some("alias0"));
    assert_eq!(set.str_at(7), Some("alias1"));
    assert_eq!(set.str_at(1000), None);
}
