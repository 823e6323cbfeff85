// Diff writer: serializes instructions to any `Write` sink.
//
// The match-finding that decides which instructions to emit lives in
// `hash::matching`; this module only deals with the output stream and
// its counters.

use std::io::Write;

use thiserror::Error;

use super::instruction::Instruction;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Encoding itself cannot fail; only the output sink can.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Counters collected while writing a diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeStats {
    /// Old buffer size in bytes.
    pub old_size: u64,
    /// New buffer size in bytes.
    pub new_size: u64,
    /// Serialized diff size in bytes.
    pub diff_size: u64,
    pub adds: u64,
    pub copies: u64,
    /// New-buffer bytes carried literally by ADD instructions.
    pub literal_bytes: u64,
    /// New-buffer bytes reproduced by COPY instructions.
    pub copied_bytes: u64,
    /// Old-buffer windows stored in the index.
    pub indexed: u64,
    /// Old-buffer windows dropped because their bucket was full.
    pub dropped: u64,
}

// ---------------------------------------------------------------------------
// DiffWriter
// ---------------------------------------------------------------------------

/// Writes instructions back to back, with no separators.
pub struct DiffWriter<W: Write> {
    writer: W,
    stats: EncodeStats,
}

impl<W: Write> DiffWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            stats: EncodeStats::default(),
        }
    }

    /// Serialize one instruction.
    pub fn write_instruction(&mut self, inst: &Instruction<'_>) -> Result<(), EncodeError> {
        inst.write_to(&mut self.writer)?;
        self.stats.diff_size += inst.serialized_len() as u64;
        match inst {
            Instruction::Add(data) => {
                self.stats.adds += 1;
                self.stats.literal_bytes += data.len() as u64;
            }
            Instruction::Copy { len, .. } => {
                self.stats.copies += 1;
                self.stats.copied_bytes += *len as u64;
            }
        }
        Ok(())
    }

    /// Counters so far.
    pub fn stats(&self) -> &EncodeStats {
        &self.stats
    }

    /// Mutable counters, for callers that know the buffer sizes.
    pub fn stats_mut(&mut self) -> &mut EncodeStats {
        &mut self.stats
    }

    /// Flush and return the sink together with the final counters.
    pub fn finish(mut self) -> Result<(W, EncodeStats), EncodeError> {
        self.writer.flush()?;
        Ok((self.writer, self.stats))
    }
}
