// Index tuning.
//
// The sequence length is fixed; bucket sizing and the per-bucket cap are
// configurable through `IndexConfig`.

/// Length of an indexed sequence, and therefore the minimum COPY length.
pub const SEQ_LEN: usize = 8;

/// Default number of entries a bucket may hold before insertions are dropped.
pub const DEFAULT_BUCKET_CAP: usize = 100;

/// Smallest bucket table ever allocated (must be a power of two).
pub const MIN_BUCKETS: usize = 64;

/// Configuration for the sequence index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    /// Maximum entries per bucket.  `None` lets buckets grow without bound.
    ///
    /// Entries past the cap are dropped, keeping the earliest offsets.
    /// Dropping only costs match quality, never correctness.
    pub bucket_cap: Option<usize>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            bucket_cap: Some(DEFAULT_BUCKET_CAP),
        }
    }
}

impl IndexConfig {
    /// Configuration with no per-bucket cap.
    pub fn unbounded() -> Self {
        Self { bucket_cap: None }
    }

    /// Configuration with the given per-bucket cap.
    pub fn with_cap(cap: usize) -> Self {
        Self {
            bucket_cap: Some(cap),
        }
    }
}

/// Number of hash bits for an index over `slots` expected entries.
///
/// The table has `1 << bits` buckets: the next power of two at or above
/// `max(slots, MIN_BUCKETS)`.
pub fn bucket_bits(slots: usize) -> u32 {
    let size = slots.max(MIN_BUCKETS).next_power_of_two();
    size.trailing_zeros()
}
