// Fixed-length byte sequences used as index keys.
//
// A sequence is an 8-byte window read from either buffer.  Hashing is a
// plain multiplicative hash of the window read as a little-endian u64, so
// every call is self-contained and no hasher state is shared.

use super::config::SEQ_LEN;

/// An N-byte window used as a lookup key.
pub type Sequence = [u8; SEQ_LEN];

/// Golden-ratio multiplier (Fibonacci hashing).
const HASH_MULTIPLIER: u64 = 0x9E37_79B9_7F4A_7C15;

/// Return the sequence starting at `pos`, or `None` if fewer than
/// `SEQ_LEN` bytes remain.
#[inline]
pub fn sequence_at(buf: &[u8], pos: usize) -> Option<&Sequence> {
    let end = pos.checked_add(SEQ_LEN)?;
    buf.get(pos..end)?.try_into().ok()
}

/// Hash a sequence.  The high bits are the well-mixed ones; callers select
/// a bucket with a right shift rather than a modulus.
#[inline(always)]
pub fn hash_sequence(seq: &Sequence) -> u64 {
    u64::from_le_bytes(*seq).wrapping_mul(HASH_MULTIPLIER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_at_bounds() {
        let buf = b"0123456789";
        assert_eq!(sequence_at(buf, 0), Some(b"01234567"));
        assert_eq!(sequence_at(buf, 2), Some(b"23456789"));
        assert!(sequence_at(buf, 3).is_none());
        assert!(sequence_at(b"", 0).is_none());
        assert!(sequence_at(buf, usize::MAX).is_none());
    }

    #[test]
    fn hash_is_deterministic() {
        let a = *b"abcdefgh";
        let b = *b"abcdefgi";
        assert_eq!(hash_sequence(&a), hash_sequence(&a));
        assert_ne!(hash_sequence(&a), hash_sequence(&b));
    }
}
