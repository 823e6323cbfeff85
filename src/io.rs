// File-level I/O helpers for diff encoding/decoding.
//
// Provides `encode_file()` and `decode_file()` convenience functions.  All
// inputs are read fully into memory before processing.  Decoded output is
// written only after the whole diff has been applied successfully, so a bad
// diff never leaves a partial output file behind.  Optionally computes
// SHA-256 checksums (feature-gated behind `file-io`); these are reported in
// the stats only and never written into the diff.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::debug;
#[cfg(feature = "file-io")]
use sha2::Digest;
use thiserror::Error;

use crate::diff::decoder::{DecodeError, DecodeOptions};
use crate::diff::encoder::EncodeError;
use crate::engine::{self, EncodeOptions};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `encode_file()`.
#[derive(Debug, Clone)]
pub struct EncodeStats {
    /// Old file size in bytes.
    pub old_size: u64,
    /// New file size in bytes.
    pub new_size: u64,
    /// Diff output size in bytes.
    pub diff_size: u64,
    /// Number of ADD instructions written.
    pub adds: u64,
    /// Number of COPY instructions written.
    pub copies: u64,
    /// Old-file windows dropped from full index buckets.
    pub dropped: u64,
    /// SHA-256 of the old file (if `file-io` feature is enabled).
    pub old_sha256: Option<[u8; 32]>,
    /// SHA-256 of the new file (if `file-io` feature is enabled).
    pub new_sha256: Option<[u8; 32]>,
}

/// Statistics returned by `decode_file()`.
#[derive(Debug, Clone)]
pub struct DecodeStats {
    /// Old file size in bytes.
    pub old_size: u64,
    /// Diff file size in bytes.
    pub diff_size: u64,
    /// Reconstructed output size in bytes.
    pub output_size: u64,
    /// Number of ADD instructions applied.
    pub adds: u64,
    /// Number of COPY instructions applied.
    pub copies: u64,
    /// SHA-256 of the reconstructed output (if `file-io` feature is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file I/O operations.
#[derive(Debug, Error)]
pub enum IoError {
    /// I/O error (file open, read, write).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Diff encoding error.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
    /// Diff decoding error.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

// ---------------------------------------------------------------------------
// Default buffer size
// ---------------------------------------------------------------------------

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

#[cfg(feature = "file-io")]
fn sha256(data: &[u8]) -> Option<[u8; 32]> {
    Some(sha2::Sha256::digest(data).into())
}

#[cfg(not(feature = "file-io"))]
fn sha256(_data: &[u8]) -> Option<[u8; 32]> {
    None
}

// ---------------------------------------------------------------------------
// encode_file
// ---------------------------------------------------------------------------

/// Encode the diff from `old_path` to `new_path`, writing it to `diff_path`.
pub fn encode_file(
    old_path: &Path,
    new_path: &Path,
    diff_path: &Path,
    opts: &EncodeOptions,
) -> Result<EncodeStats, IoError> {
    let old = std::fs::read(old_path)?;
    let new = std::fs::read(new_path)?;

    let diff_file = File::create(diff_path)?;
    let writer = BufWriter::with_capacity(BUF_SIZE, diff_file);
    let (writer, stats) = engine::encode_to(&old, &new, writer, opts)?;
    writer.into_inner().map_err(|e| e.into_error())?;

    debug!(
        "{} -> {}: {} byte diff",
        old_path.display(),
        new_path.display(),
        stats.diff_size
    );

    Ok(EncodeStats {
        old_size: stats.old_size,
        new_size: stats.new_size,
        diff_size: stats.diff_size,
        adds: stats.adds,
        copies: stats.copies,
        dropped: stats.dropped,
        old_sha256: sha256(&old),
        new_sha256: sha256(&new),
    })
}

// ---------------------------------------------------------------------------
// decode_file
// ---------------------------------------------------------------------------

/// Apply the diff at `diff_path` to `old_path`, writing the result to
/// `output_path`.
///
/// The output file is only created once decoding has succeeded.
pub fn decode_file(
    old_path: &Path,
    diff_path: &Path,
    output_path: &Path,
    opts: DecodeOptions,
) -> Result<DecodeStats, IoError> {
    let old = std::fs::read(old_path)?;
    let diff = std::fs::read(diff_path)?;

    let (output, stats) = engine::decode_with_options(&old, &diff, opts)?;

    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(output_path)?);
    writer.write_all(&output)?;
    writer.flush()?;

    Ok(DecodeStats {
        old_size: old.len() as u64,
        diff_size: diff.len() as u64,
        output_size: output.len() as u64,
        adds: stats.adds,
        copies: stats.copies,
        output_sha256: sha256(&output),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
