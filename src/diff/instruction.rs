// ADD / COPY instructions and their text serialization.
//
//   ADD  -> 'A' <len> ':' <len literal bytes>
//   COPY -> 'C' <len> ',' <offset>
//
// Numbers are unsigned decimal.  Literal bytes are written verbatim; they
// are length-delimited, so any byte value (including 'A', 'C', digits and
// newlines) is safe inside an ADD.

use std::fmt;
use std::io::{self, Write};

use crate::hash::matching::digit_count;

pub const ADD_TAG: u8 = b'A';
pub const COPY_TAG: u8 = b'C';
pub const ADD_SEP: u8 = b':';
pub const COPY_SEP: u8 = b',';

/// A single diff instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction<'a> {
    /// Append these literal bytes.
    Add(&'a [u8]),
    /// Append `len` bytes of the old buffer starting at `offset`.
    Copy { len: usize, offset: usize },
}

impl Instruction<'_> {
    /// Number of bytes this instruction contributes to the output.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Self::Add(data) => data.len(),
            Self::Copy { len, .. } => *len,
        }
    }

    /// Whether this instruction contributes no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the serialized form in bytes.
    pub fn serialized_len(&self) -> usize {
        match self {
            Self::Add(data) => 2 + digit_count(data.len()) + data.len(),
            Self::Copy { len, offset } => 2 + digit_count(*len) + digit_count(*offset),
        }
    }

    /// Serialize to `w`.
    pub fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        match self {
            Self::Add(data) => {
                write!(w, "A{}:", data.len())?;
                w.write_all(data)
            }
            Self::Copy { len, offset } => write!(w, "C{len},{offset}"),
        }
    }

    /// Serialize into a fresh buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_len());
        // Writing to a Vec cannot fail.
        let _ = self.write_to(&mut out);
        out
    }
}

/// Human-readable listing form; literal bytes are shown escaped.
impl fmt::Display for Instruction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add(data) => {
                write!(f, "ADD  {:6} \"", data.len())?;
                for &b in data.iter() {
                    write!(f, "{}", std::ascii::escape_default(b))?;
                }
                write!(f, "\"")
            }
            Self::Copy { len, offset } => write!(f, "COPY {len:6} @{offset}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_add() {
        assert_eq!(Instruction::Add(b"XYZ").to_bytes(), b"A3:XYZ");
        assert_eq!(Instruction::Add(b"").to_bytes(), b"A0:");
    }

    #[test]
    fn serialize_copy() {
        assert_eq!(Instruction::Copy { len: 10, offset: 0 }.to_bytes(), b"C10,0");
        assert_eq!(
            Instruction::Copy { len: 123, offset: 45678 }.to_bytes(),
            b"C123,45678"
        );
    }

    #[test]
    fn add_literal_is_verbatim() {
        let inst = Instruction::Add(b"C5,1\nA2:");
        assert_eq!(inst.to_bytes(), b"A8:C5,1\nA2:");
    }

    #[test]
    fn serialized_len_matches_output() {
        for inst in [
            Instruction::Add(b""),
            Instruction::Add(b"hello world"),
            Instruction::Copy { len: 8, offset: 0 },
            Instruction::Copy { len: 100_000, offset: 99_999 },
        ] {
            assert_eq!(inst.serialized_len(), inst.to_bytes().len(), "{inst:?}");
        }
    }

    #[test]
    fn len_counts_output_bytes() {
        assert_eq!(Instruction::Add(b"abc").len(), 3);
        assert_eq!(Instruction::Copy { len: 42, offset: 7 }.len(), 42);
        assert!(Instruction::Add(b"").is_empty());
    }

    #[test]
    fn display_escapes_literals() {
        let s = Instruction::Add(b"a\nb").to_string();
        assert_eq!(s, "ADD       3 \"a\\nb\"");
        assert_eq!(
            Instruction::Copy { len: 10, offset: 4 }.to_string(),
            "COPY     10 @4"
        );
    }
}
