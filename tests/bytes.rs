use mips_rs::bytes::{assemble16, assemble32};
use pretty_assertions::assert_eq;

#[test]
fn halfword_both_endiannesses() {
    assert_eq!(assemble16(&[0xAB, 0xCD], true), 0xABCD);
    assert_eq!(assemble16(&[0xAB, 0xCD], false), 0xCDAB);
}

#[test]
fn word_big_endian() {
    assert_eq!(assemble32(&[0x00, 0x00, 0x00, 0x01], true, false), 0x0000_0001);
    // microMIPS interleaving only applies to the little-endian stream
    assert_eq!(assemble32(&[0x00, 0x00, 0x00, 0x01], true, true), 0x0000_0001);
    assert_eq!(assemble32(&[0x12, 0x34, 0x56, 0x78], true, false), 0x1234_5678);
}

#[test]
fn word_little_endian() {
    assert_eq!(assemble32(&[0x10, 0x20, 0x30, 0x40], false, false), 0x4030_2010);
}

#[test]
fn word_little_endian_micro_swaps_halfwords() {
    // The opcode-bearing halfword comes first in stream order, so the two
    // halfwords swap relative to the plain little-endian reading.
    assert_eq!(assemble32(&[0x10, 0x20, 0x30, 0x40], false, true), 0x2010_4030);
    assert_eq!(assemble32(&[0xE8, 0x0C, 0x00, 0x00], false, true), 0x0000_0CE8);
}

#[test]
fn endianness_round_trip() {
    let word = 0x0123_4567u32;
    let be = word.to_be_bytes();
    assert_eq!(assemble32(&be, true, false), word);

    // Reversing the byte order flips the endianness the window decodes under.
    let mut le = be;
    le.reverse();
    assert_eq!(assemble32(&le, false, false), word);

    let half = 0x89ABu32;
    assert_eq!(assemble16(&[0x89, 0xAB], true), half);
    assert_eq!(assemble16(&[0xAB, 0x89], false), half);
}
