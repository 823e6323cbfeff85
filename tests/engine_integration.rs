// Integration tests for the engine module.
//
// Tests the full pipeline: MatchEngine -> instruction stream -> DiffDecoder,
// including the documented scenarios, index cap degradation, literal bytes
// that look like instruction syntax, and generated data.

use seqdelta::diff::{Instruction, InstructionIterator};
use seqdelta::engine::{self, EncodeOptions};
use seqdelta::hash::config::{IndexConfig, SEQ_LEN};
use seqdelta::hash::matching::MatchEngine;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn roundtrip_with(old: &[u8], new: &[u8], opts: &EncodeOptions) -> Vec<u8> {
    let diff = engine::encode_with_options(old, new, opts);
    let decoded = engine::decode(old, &diff).unwrap();
    assert_eq!(
        decoded,
        new,
        "roundtrip mismatch (old={}, new={}, diff={})",
        old.len(),
        new.len(),
        diff.len()
    );
    diff
}

fn roundtrip(old: &[u8], new: &[u8]) -> Vec<u8> {
    roundtrip_with(old, new, &EncodeOptions::default())
}

fn generate_data(size: usize, seed: u64) -> Vec<u8> {
    let mut state = seed;
    let mut data = Vec::with_capacity(size);
    for _ in 0..size {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        data.push((state >> 33) as u8);
    }
    data
}

fn mutate_data(old: &[u8], change_pct: f64, seed: u64) -> Vec<u8> {
    let mut new = old.to_vec();
    let mut state = seed;
    let changes = ((change_pct / 100.0) * old.len() as f64) as usize;
    for _ in 0..changes {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let pos = (state >> 33) as usize % new.len();
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        new[pos] = (state >> 33) as u8;
    }
    new
}

fn instructions(diff: &[u8]) -> Vec<Instruction<'_>> {
    InstructionIterator::new(diff)
        .collect::<Result<_, _>>()
        .unwrap()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn scenario_overlap_then_literal_tail() {
    let diff = roundtrip(b"abcdefghij", b"abcdefghijXYZ");
    assert_eq!(diff, b"C10,0A3:XYZ");
}

#[test]
fn scenario_add_only_stream() {
    assert_eq!(engine::decode(b"", b"A3:abc").unwrap(), b"abc");
    assert_eq!(engine::decode(b"unrelated old data", b"A3:abc").unwrap(), b"abc");
}

#[test]
fn scenario_copy_offset_out_of_range() {
    let old = vec![b'o'; 100];
    assert!(engine::decode(&old, b"C5,100").is_err());
    assert!(engine::apply_diff(&old, b"C5,100").is_none());
}

#[test]
fn scenario_empty_old() {
    assert_eq!(roundtrip(b"", b"hello"), b"A5:hello");
}

#[test]
fn scenario_empty_diff() {
    assert!(engine::decode(b"", b"").unwrap().is_empty());
    assert!(engine::decode(b"some old data", b"").unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Edge cases
// ---------------------------------------------------------------------------

#[test]
fn short_buffers() {
    for n in 0..=SEQ_LEN + 1 {
        let new: Vec<u8> = (0..n as u8).collect();
        roundtrip(b"", &new);
        roundtrip(&new, &new);
        roundtrip(&new, b"");
    }
}

#[test]
fn new_shorter_than_window_is_single_add() {
    let diff = roundtrip(b"abcdefghijklmnop", b"abcdefg");
    assert_eq!(diff, b"A7:abcdefg");
}

#[test]
fn literal_bytes_that_look_like_syntax() {
    let old = b"C10,0A3:XYZ\r\n prefix shared with new";
    let new = b"A99:C10,0A3:XYZ\r\n prefix shared with new\nC1,0";
    let diff = roundtrip(old, new);
    let insts = instructions(&diff);
    assert_eq!(insts[0], Instruction::Add(b"A99:"));
    assert!(matches!(insts[1], Instruction::Copy { offset: 0, .. }));
}

#[test]
fn all_byte_values() {
    let old: Vec<u8> = (0..=255u8).collect();
    let mut new: Vec<u8> = (0..=255u8).rev().collect();
    new.extend_from_slice(&old);
    roundtrip(&old, &new);
}

#[test]
fn copies_respect_minimum_length() {
    let old = generate_data(20_000, 3);
    let new = mutate_data(&old, 5.0, 9);
    let diff = roundtrip(&old, &new);
    for inst in instructions(&diff) {
        if let Instruction::Copy { len, offset } = inst {
            assert!(len >= SEQ_LEN, "short copy {len} at {offset}");
            assert!(offset + len <= old.len());
        }
    }
}

#[test]
fn literal_runs_are_maximal() {
    let old = generate_data(4096, 11);
    let new = mutate_data(&old, 10.0, 12);
    let diff = roundtrip(&old, &new);
    let insts = instructions(&diff);
    for pair in insts.windows(2) {
        assert!(
            !matches!(pair, [Instruction::Add(_), Instruction::Add(_)]),
            "adjacent ADD instructions"
        );
    }
}

#[test]
fn engine_instructions_match_serialized_diff() {
    let old = generate_data(2048, 21);
    let new = mutate_data(&old, 2.0, 22);
    let engine = MatchEngine::new(&old);
    let direct = engine.instructions(&new);
    let diff = engine::encode(&old, &new);
    assert_eq!(direct, instructions(&diff));
}

#[test]
fn relocated_blocks_are_copied() {
    let a = generate_data(1000, 1);
    let b = generate_data(1000, 2);
    let old = [a.as_slice(), b.as_slice()].concat();
    let new = [b.as_slice(), a.as_slice()].concat();
    let diff = roundtrip(&old, &new);
    assert_eq!(diff, b"C1000,1000C1000,0");
}

#[test]
fn similar_data_compresses() {
    let old = generate_data(50_000, 42);
    let new = mutate_data(&old, 0.1, 43);
    let diff = roundtrip(&old, &new);
    assert!(
        diff.len() < new.len() / 10,
        "diff={} new={}",
        diff.len(),
        new.len()
    );
}

// ---------------------------------------------------------------------------
// Index cap
// ---------------------------------------------------------------------------

#[test]
fn bucket_cap_degrades_without_corrupting() {
    // Every window of the run of 'a' is the same sequence, so they all land
    // in one bucket.  The longest match starts near the end of the run,
    // past what a small cap keeps.
    let mut old = vec![b'a'; 1000];
    old.extend_from_slice(b"XYZWVUTS");
    let new = b"aaaaaaaaXYZWVUTS";

    let unbounded = roundtrip_with(
        &old,
        new,
        &EncodeOptions {
            index: IndexConfig::unbounded(),
        },
    );
    assert_eq!(unbounded, b"C16,992");

    let capped = roundtrip_with(
        &old,
        new,
        &EncodeOptions {
            index: IndexConfig::with_cap(4),
        },
    );
    assert!(
        capped.len() > unbounded.len(),
        "capped={:?}",
        String::from_utf8_lossy(&capped)
    );
}

#[test]
fn tiny_cap_still_roundtrips() {
    let old = generate_data(10_000, 5);
    let new = mutate_data(&old, 3.0, 6);
    for cap in [0, 1, 2, 100] {
        roundtrip_with(
            &old,
            &new,
            &EncodeOptions {
                index: IndexConfig::with_cap(cap),
            },
        );
    }
}

#[test]
fn zero_cap_disables_copies() {
    let old = b"abcdefghijklmnop";
    let diff = roundtrip_with(
        old,
        old,
        &EncodeOptions {
            index: IndexConfig::with_cap(0),
        },
    );
    assert_eq!(diff, b"A16:abcdefghijklmnop");
}
