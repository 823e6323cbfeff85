// Instruction stream parser.
//
// Grammar:
//   Diff        := Instruction* EOF
//   Instruction := 'A' Number ':' Byte{Number}
//                | 'C' Number ',' Number
//                | '\r' | '\n'                (skipped)
//   Number      := ASCII digit+               (no sign, fits in usize)
//
// The iterator yields one `Instruction` per ADD/COPY and stops after the
// first error.

use super::decoder::DecodeError;
use super::instruction::{ADD_SEP, ADD_TAG, COPY_SEP, COPY_TAG, Instruction};

/// Iterates over the instructions of a serialized diff.
pub struct InstructionIterator<'a> {
    diff: &'a [u8],
    pos: usize,
    separators: u64,
    failed: bool,
}

impl<'a> InstructionIterator<'a> {
    pub fn new(diff: &'a [u8]) -> Self {
        Self {
            diff,
            pos: 0,
            separators: 0,
            failed: false,
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of `\r` / `\n` separators skipped so far.
    pub fn separators_skipped(&self) -> u64 {
        self.separators
    }

    #[inline]
    fn next_byte(&mut self) -> Option<u8> {
        let b = *self.diff.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    fn expect(&mut self, want: u8, field: &'static str) -> Result<(), DecodeError> {
        let position = self.pos;
        match self.next_byte() {
            Some(b) if b == want => Ok(()),
            _ => Err(DecodeError::NumericParse { field, position }),
        }
    }

    /// Parse an unsigned decimal number.  The first byte must be a digit;
    /// parsing stops at the first non-digit.
    fn number(&mut self, field: &'static str) -> Result<usize, DecodeError> {
        let position = self.pos;
        let err = || DecodeError::NumericParse { field, position };

        let digits = self.diff[self.pos..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits == 0 {
            return Err(err());
        }

        let mut n: usize = 0;
        for &b in &self.diff[self.pos..self.pos + digits] {
            n = n
                .checked_mul(10)
                .and_then(|n| n.checked_add(usize::from(b - b'0')))
                .ok_or_else(err)?;
        }
        self.pos += digits;
        Ok(n)
    }

    fn parse_add(&mut self, tag_pos: usize) -> Result<Instruction<'a>, DecodeError> {
        let len = self.number("ADD length")?;
        self.expect(ADD_SEP, "ADD ':' separator")?;
        let available = self.diff.len() - self.pos;
        if len > available {
            return Err(DecodeError::TruncatedLiteral {
                expected: len,
                available,
                position: tag_pos,
            });
        }
        let diff = self.diff;
        let data = &diff[self.pos..self.pos + len];
        self.pos += len;
        Ok(Instruction::Add(data))
    }

    fn parse_copy(&mut self) -> Result<Instruction<'a>, DecodeError> {
        let len = self.number("COPY length")?;
        self.expect(COPY_SEP, "COPY ',' separator")?;
        let offset = self.number("COPY offset")?;
        Ok(Instruction::Copy { len, offset })
    }

    fn read_command(&mut self) -> Option<Result<Instruction<'a>, DecodeError>> {
        loop {
            let tag_pos = self.pos;
            let tag = self.next_byte()?;
            return Some(match tag {
                ADD_TAG => self.parse_add(tag_pos),
                COPY_TAG => self.parse_copy(),
                b'\r' | b'\n' => {
                    self.separators += 1;
                    continue;
                }
                byte => Err(DecodeError::MalformedInstruction {
                    byte,
                    position: tag_pos,
                }),
            });
        }
    }
}

impl<'a> Iterator for InstructionIterator<'a> {
    type Item = Result<Instruction<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.read_command()?;
        if item.is_err() {
            self.failed = true;
        }
        Some(item)
    }
}
