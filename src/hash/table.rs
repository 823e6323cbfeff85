// Sequence index over the old buffer.
//
// Buckets are selected by the top `bits` of the sequence hash.  Each bucket
// is a list of (sequence, offset) entries in insertion order, which is
// ascending offset order when the old buffer is scanned left to right.
// A bucket never holds more than `bucket_cap` entries; extra insertions are
// counted in `dropped` and otherwise ignored.

use log::debug;

use super::config::{IndexConfig, SEQ_LEN, bucket_bits};
use super::sequence::{Sequence, hash_sequence, sequence_at};

#[derive(Debug, Clone, Copy)]
struct Entry {
    seq: Sequence,
    offset: usize,
}

/// Fixed-length-sequence to offset index.
pub struct SequenceIndex {
    buckets: Vec<Vec<Entry>>,
    /// `64 - bits`: shift that turns a hash into a bucket number.
    shift: u32,
    cap: Option<usize>,
    len: usize,
    dropped: u64,
}

impl SequenceIndex {
    /// Create an empty index sized for `slots` expected entries.
    pub fn new(slots: usize, cfg: IndexConfig) -> Self {
        let bits = bucket_bits(slots);
        Self {
            buckets: vec![Vec::new(); 1 << bits],
            shift: 64 - bits,
            cap: cfg.bucket_cap,
            len: 0,
            dropped: 0,
        }
    }

    /// Index every `SEQ_LEN`-byte window of `old`, offsets `0..=old.len() - SEQ_LEN`.
    pub fn build(old: &[u8], cfg: IndexConfig) -> Self {
        let windows = (old.len() + 1).saturating_sub(SEQ_LEN);
        let mut index = Self::new(windows, cfg);
        for offset in 0..windows {
            if let Some(seq) = sequence_at(old, offset) {
                index.insert(seq, offset);
            }
        }
        debug!(
            "indexed {} of {} windows over {} buckets ({} dropped)",
            index.len,
            windows,
            index.buckets.len(),
            index.dropped
        );
        index
    }

    #[inline(always)]
    fn bucket(&self, seq: &Sequence) -> usize {
        (hash_sequence(seq) >> self.shift) as usize
    }

    /// Append `(seq, offset)` to its bucket unless the bucket is full.
    pub fn insert(&mut self, seq: &Sequence, offset: usize) {
        let cap = self.cap;
        let bucket = self.bucket(seq);
        let entries = &mut self.buckets[bucket];
        if cap.is_some_and(|cap| entries.len() >= cap) {
            self.dropped += 1;
            return;
        }
        entries.push(Entry { seq: *seq, offset });
        self.len += 1;
    }

    /// Whether `seq` occurs at any indexed offset.
    pub fn contains(&self, seq: &Sequence) -> bool {
        self.buckets[self.bucket(seq)]
            .iter()
            .any(|e| e.seq == *seq)
    }

    /// Indexed offsets of `seq`, in ascending order.
    pub fn candidates<'a>(&'a self, seq: &'a Sequence) -> impl Iterator<Item = usize> + 'a {
        self.buckets[self.bucket(seq)]
            .iter()
            .filter(move |e| e.seq == *seq)
            .map(|e| e.offset)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of insertions discarded because their bucket was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Bucket count.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}
