// Diff decoder: replays an instruction stream against the old buffer.
//
// Decoding is a loop over the parser (the read-command state) with each
// instruction executed as soon as it is parsed.  The first failure aborts;
// output already produced is left in place for `decode_into` / `decode_to`
// callers and discarded by `decode`.

use std::io::Write;

use log::{debug, trace};
use thiserror::Error;

use super::instruction::Instruction;
use super::parser::InstructionIterator;

// ---------------------------------------------------------------------------
// Decoder error
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DecodeError {
    /// Writing decoded output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A byte other than 'A', 'C', '\r' or '\n' where a command was expected.
    #[error("malformed instruction: unexpected byte {byte:#04x} at position {position}")]
    MalformedInstruction { byte: u8, position: usize },

    /// A number was missing, not a digit, overflowed, or its separator was wrong.
    #[error("invalid {field} at position {position}")]
    NumericParse { field: &'static str, position: usize },

    /// An ADD declared more literal bytes than the stream holds.
    #[error(
        "truncated ADD at position {position}: needs {expected} literal bytes, {available} remain"
    )]
    TruncatedLiteral {
        expected: usize,
        available: usize,
        position: usize,
    },

    /// A COPY offset outside the old buffer.
    #[error("COPY offset {offset} outside old buffer of {old_len} bytes")]
    InvalidOffset { offset: usize, old_len: usize },

    /// A COPY running past the end of the old buffer (strict mode only).
    #[error("COPY of {len} bytes at offset {offset} runs past old buffer of {old_len} bytes")]
    CopyOutOfBounds {
        offset: usize,
        len: usize,
        old_len: usize,
    },
}

impl DecodeError {
    /// Whether the error comes from the diff itself rather than the output sink.
    pub fn is_format_error(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

// ---------------------------------------------------------------------------
// Options and stats
// ---------------------------------------------------------------------------

/// Decoder configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Reject a COPY whose range runs past the old buffer.  When false the
    /// copy is truncated to the bytes actually present.
    pub strict_copy_bounds: bool,
}

/// Counters collected while decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    pub adds: u64,
    pub copies: u64,
    /// Bytes appended by ADD instructions.
    pub literal_bytes: u64,
    /// Bytes appended by COPY instructions.
    pub copied_bytes: u64,
    /// COPY instructions cut short at the end of the old buffer.
    pub truncated_copies: u64,
    pub separators: u64,
}

impl DecodeStats {
    /// Total bytes written to the output.
    pub fn output_size(&self) -> u64 {
        self.literal_bytes + self.copied_bytes
    }
}

// ---------------------------------------------------------------------------
// DiffDecoder
// ---------------------------------------------------------------------------

/// Applies diffs against one old buffer.
pub struct DiffDecoder<'o> {
    old: &'o [u8],
    opts: DecodeOptions,
    stats: DecodeStats,
}

impl<'o> DiffDecoder<'o> {
    pub fn new(old: &'o [u8]) -> Self {
        Self::with_options(old, DecodeOptions::default())
    }

    pub fn with_options(old: &'o [u8], opts: DecodeOptions) -> Self {
        Self {
            old,
            opts,
            stats: DecodeStats::default(),
        }
    }

    /// Counters accumulated over every call on this decoder.
    pub fn stats(&self) -> DecodeStats {
        self.stats
    }

    /// Decode `diff`, returning the output only if the whole stream is valid.
    pub fn decode(&mut self, diff: &[u8]) -> Result<Vec<u8>, DecodeError> {
        let mut out = Vec::new();
        self.decode_into(diff, &mut out)?;
        Ok(out)
    }

    /// Decode `diff`, appending to `out`.  On failure `out` keeps whatever
    /// was appended before the bad instruction.
    pub fn decode_into(&mut self, diff: &[u8], out: &mut Vec<u8>) -> Result<u64, DecodeError> {
        self.decode_to(diff, out)
    }

    /// Decode `diff`, writing output to `writer` as each instruction executes.
    /// Returns the number of bytes written.
    pub fn decode_to<W: Write + ?Sized>(
        &mut self,
        diff: &[u8],
        writer: &mut W,
    ) -> Result<u64, DecodeError> {
        let mut iter = InstructionIterator::new(diff);
        let mut written = 0u64;

        let result = loop {
            let inst = match iter.next() {
                None => break Ok(()),
                Some(Ok(inst)) => inst,
                Some(Err(e)) => break Err(e),
            };
            match self.execute(&inst, writer) {
                Ok(n) => written += n as u64,
                Err(e) => break Err(e),
            }
        };
        self.stats.separators += iter.separators_skipped();

        match result {
            Ok(()) => {
                debug!(
                    "decoded {} diff bytes into {written} bytes ({} ADD, {} COPY)",
                    diff.len(),
                    self.stats.adds,
                    self.stats.copies
                );
                Ok(written)
            }
            Err(e) => {
                debug!("decode failed after {written} bytes: {e}");
                Err(e)
            }
        }
    }

    /// Execute a single instruction, returning the number of bytes written.
    pub fn execute<W: Write + ?Sized>(
        &mut self,
        inst: &Instruction<'_>,
        writer: &mut W,
    ) -> Result<usize, DecodeError> {
        match *inst {
            Instruction::Add(data) => {
                writer.write_all(data)?;
                self.stats.adds += 1;
                self.stats.literal_bytes += data.len() as u64;
                Ok(data.len())
            }
            Instruction::Copy { len, offset } => {
                let bytes = self.copy_range(offset, len)?;
                writer.write_all(bytes)?;
                self.stats.copies += 1;
                self.stats.copied_bytes += bytes.len() as u64;
                Ok(bytes.len())
            }
        }
    }

    fn copy_range(&mut self, offset: usize, len: usize) -> Result<&'o [u8], DecodeError> {
        let old = self.old;
        let old_len = old.len();
        if offset >= old_len {
            return Err(DecodeError::InvalidOffset { offset, old_len });
        }
        let end = match offset.checked_add(len) {
            Some(end) if end <= old_len => end,
            _ if self.opts.strict_copy_bounds => {
                return Err(DecodeError::CopyOutOfBounds {
                    offset,
                    len,
                    old_len,
                });
            }
            _ => {
                trace!("COPY {len} at {offset} truncated to {}", old_len - offset);
                self.stats.truncated_copies += 1;
                old_len
            }
        };
        Ok(&old[offset..end])
    }
}

// ---------------------------------------------------------------------------
// Convenience function
// ---------------------------------------------------------------------------

/// Decode a diff from memory with default options.
pub fn decode_memory(diff: &[u8], old: &[u8]) -> Result<Vec<u8>, DecodeError> {
    DiffDecoder::new(old).decode(diff)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
