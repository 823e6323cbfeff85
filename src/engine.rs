// Diff engine: ties the sequence index to the text instruction format.
//
// Provides high-level encode/decode APIs that orchestrate:
//   - Greedy matching (hash module) to choose ADD/COPY instructions
//   - Serialization (diff module) to produce the instruction stream
//   - Replay (diff module) to rebuild the new buffer from old + diff

use std::io::Write;

use crate::diff::decoder::{DecodeError, DecodeOptions, DecodeStats, DiffDecoder};
use crate::diff::encoder::{DiffWriter, EncodeError, EncodeStats};
use crate::hash::config::IndexConfig;
use crate::hash::matching::MatchEngine;

// ---------------------------------------------------------------------------
// Encode options
// ---------------------------------------------------------------------------

/// Configuration for diff encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Sequence index tuning.
    pub index: IndexConfig,
}

// ---------------------------------------------------------------------------
// High-level encode
// ---------------------------------------------------------------------------

/// Encode the diff that turns `old` into `new`.
///
/// Encoding has no failure mode: any byte content is accepted in either
/// buffer.
pub fn encode(old: &[u8], new: &[u8]) -> Vec<u8> {
    encode_with_options(old, new, &EncodeOptions::default())
}

/// Encode with custom options.
pub fn encode_with_options(old: &[u8], new: &[u8], opts: &EncodeOptions) -> Vec<u8> {
    let engine = MatchEngine::with_config(old, opts.index);
    let mut out = Vec::with_capacity(new.len() / 2);
    engine.for_each_instruction(new, |inst| {
        // Writing to a Vec cannot fail.
        let _ = inst.write_to(&mut out);
    });
    out
}

/// Encode into `writer`, returning it with the encode counters.
pub fn encode_to<W: Write>(
    old: &[u8],
    new: &[u8],
    writer: W,
    opts: &EncodeOptions,
) -> Result<(W, EncodeStats), EncodeError> {
    let engine = MatchEngine::with_config(old, opts.index);
    let mut diff = DiffWriter::new(writer);
    engine.encode_to(new, &mut diff)?;

    let index = engine.index();
    let stats = diff.stats_mut();
    stats.old_size = old.len() as u64;
    stats.new_size = new.len() as u64;
    stats.indexed = index.len() as u64;
    stats.dropped = index.dropped();

    diff.finish()
}

// ---------------------------------------------------------------------------
// High-level decode
// ---------------------------------------------------------------------------

/// Rebuild the new buffer from `old` and `diff`.
///
/// Returns the output only if the whole diff is valid.
pub fn decode(old: &[u8], diff: &[u8]) -> Result<Vec<u8>, DecodeError> {
    DiffDecoder::new(old).decode(diff)
}

/// Decode with custom options, also returning the decode counters.
pub fn decode_with_options(
    old: &[u8],
    diff: &[u8],
    opts: DecodeOptions,
) -> Result<(Vec<u8>, DecodeStats), DecodeError> {
    let mut decoder = DiffDecoder::with_options(old, opts);
    let out = decoder.decode(diff)?;
    Ok((out, decoder.stats()))
}

/// Success/failure form of `decode`: `None` on any malformed diff.
pub fn apply_diff(old: &[u8], diff: &[u8]) -> Option<Vec<u8>> {
    decode(old, diff).ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
