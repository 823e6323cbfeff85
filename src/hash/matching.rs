// Greedy match finding against the old buffer.
//
// The engine indexes every 8-byte window of the old buffer once, then walks
// the new buffer left to right:
//   1. Fewer than SEQ_LEN bytes left: emit them as one ADD and stop.
//   2. Window at the cursor is indexed: extend every candidate forward,
//      keep the best one, emit a COPY and skip past it.
//   3. Otherwise accumulate a literal run until a window matches or the
//      tail is reached, then flush it as one ADD.  The window that ended
//      the run is re-evaluated from step 1.

use std::convert::Infallible;
use std::io::Write;

use log::{debug, trace};

use super::config::{IndexConfig, SEQ_LEN};
use super::sequence::sequence_at;
use super::table::SequenceIndex;
use crate::diff::encoder::{DiffWriter, EncodeError};
use crate::diff::instruction::Instruction;

// ---------------------------------------------------------------------------
// Match result
// ---------------------------------------------------------------------------

/// Best copy source found for a position in the new buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Offset in the old buffer.
    pub offset: usize,
    /// Number of equal bytes, always `>= SEQ_LEN`.
    pub length: usize,
}

/// Number of characters in the decimal rendering of `n`.
#[inline]
pub fn digit_count(mut n: usize) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

/// Length of the common prefix of `a` and `b`.
#[inline]
pub fn forward_match(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

// ---------------------------------------------------------------------------
// Match engine
// ---------------------------------------------------------------------------

/// Owns the sequence index for one old buffer and produces instructions.
pub struct MatchEngine<'o> {
    old: &'o [u8],
    index: SequenceIndex,
}

impl<'o> MatchEngine<'o> {
    /// Index `old` with the default configuration.
    pub fn new(old: &'o [u8]) -> Self {
        Self::with_config(old, IndexConfig::default())
    }

    /// Index `old` with a custom configuration.
    pub fn with_config(old: &'o [u8], cfg: IndexConfig) -> Self {
        Self {
            old,
            index: SequenceIndex::build(old, cfg),
        }
    }

    /// The underlying index.
    pub fn index(&self) -> &SequenceIndex {
        &self.index
    }

    /// Find the best copy source for the start of `new_suffix`.
    ///
    /// Every candidate sharing the leading window is extended as far as
    /// both buffers agree.  The longest wins; ties go to the fewest decimal
    /// digits in `(length, offset)`, then to the smallest offset.
    /// Returns `None` if the leading window is not indexed.
    pub fn best_match(&self, new_suffix: &[u8]) -> Option<Match> {
        let seq = sequence_at(new_suffix, 0)?;
        let mut best: Option<(Match, usize)> = None;

        for offset in self.index.candidates(seq) {
            let length = SEQ_LEN
                + forward_match(&self.old[offset + SEQ_LEN..], &new_suffix[SEQ_LEN..]);
            let cost = digit_count(length) + digit_count(offset);
            let better = match best {
                None => true,
                Some((m, best_cost)) => {
                    length > m.length || (length == m.length && cost < best_cost)
                }
            };
            if better {
                best = Some((Match { offset, length }, cost));
            }
        }

        best.map(|(m, _)| m)
    }

    /// Compute the instruction sequence that rebuilds `new` from the old buffer.
    pub fn instructions<'n>(&self, new: &'n [u8]) -> Vec<Instruction<'n>> {
        let mut out = Vec::new();
        self.for_each_instruction(new, |inst| out.push(inst));
        out
    }

    /// Serialize the instructions for `new` into `writer`.
    pub fn encode_to<W: Write>(
        &self,
        new: &[u8],
        writer: &mut DiffWriter<W>,
    ) -> Result<(), EncodeError> {
        self.try_for_each_instruction(new, |inst| writer.write_instruction(&inst))
    }

    /// Walk `new`, handing each instruction to `emit` in output order.
    pub fn for_each_instruction<'n, F>(&self, new: &'n [u8], mut emit: F)
    where
        F: FnMut(Instruction<'n>),
    {
        let result: Result<(), Infallible> = self.try_for_each_instruction(new, |inst| {
            emit(inst);
            Ok(())
        });
        match result {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }

    /// Like `for_each_instruction`, stopping at the first error from `emit`.
    pub fn try_for_each_instruction<'n, E, F>(&self, new: &'n [u8], mut emit: F) -> Result<(), E>
    where
        F: FnMut(Instruction<'n>) -> Result<(), E>,
    {
        let mut j = 0usize;
        let (mut adds, mut copies) = (0u64, 0u64);

        while j < new.len() {
            if new.len() - j < SEQ_LEN {
                trace!("tail ADD {} at {j}", new.len() - j);
                emit(Instruction::Add(&new[j..]))?;
                adds += 1;
                break;
            }

            if let Some(m) = self.lookup(&new[j..]) {
                trace!("COPY {} from {} at {j}", m.length, m.offset);
                emit(Instruction::Copy {
                    len: m.length,
                    offset: m.offset,
                })?;
                copies += 1;
                j += m.length;
                continue;
            }

            // Literal run: grow until a window matches or the tail is reached.
            let start = j;
            loop {
                j += 1;
                if new.len() - j < SEQ_LEN {
                    j = new.len();
                    break;
                }
                if self.window_indexed(new, j) {
                    break;
                }
            }
            trace!("ADD {} at {start}", j - start);
            emit(Instruction::Add(&new[start..j]))?;
            adds += 1;
        }

        debug!(
            "encoded {} new bytes against {} old bytes: {adds} ADD, {copies} COPY",
            new.len(),
            self.old.len()
        );
        Ok(())
    }

    #[inline]
    fn window_indexed(&self, new: &[u8], pos: usize) -> bool {
        sequence_at(new, pos).is_some_and(|seq| self.index.contains(seq))
    }

    #[inline]
    fn lookup(&self, new_suffix: &[u8]) -> Option<Match> {
        let seq = sequence_at(new_suffix, 0)?;
        if !self.index.contains(seq) {
            return None;
        }
        self.best_match(new_suffix)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
