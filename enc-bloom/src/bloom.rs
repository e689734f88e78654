//! Plaintext Bloom filter.
//!
//! `k` indices per element come from double hashing over two keyed FNV-1a
//! digests: `idx_j = (h1 + j * h2) mod L`.

use crate::errors::{EncBloomError, Result};

use fnv::FnvHasher;

use serde::{Deserialize, Serialize};

use std::hash::Hasher;

const WORD_BITS: usize = 64;
const SECOND_HASH_KEY: u64 = 0x9e37_79b9_7f4a_7c15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloomFilter {
    length: usize,
    hash_count: usize,
    words: Vec<u64>,
}

impl BloomFilter {
    /// Empty filter of `length` bits with `hash_count` hash functions.
    ///
    /// Degenerate dimensions are representable here; the encrypted builder rejects them.
    pub fn new(length: usize, hash_count: usize) -> Self {
        Self {
            length,
            hash_count,
            words: vec![0; length.div_ceil(WORD_BITS)],
        }
    }

    /// Sizes the filter for `capacity` elements at the target false-positive rate:
    /// `L = ceil(-n ln(eps) / ln(2)^2)`, `k = ceil(ln(2) L / n)`.
    pub fn with_rate(capacity: usize, false_positive_rate: f64) -> Result<Self> {
        if capacity == 0 {
            return Err(EncBloomError::Dimension(
                "Filter capacity must be positive".into(),
            ));
        }
        if !(false_positive_rate > 0.0 && false_positive_rate < 1.0) {
            return Err(EncBloomError::InvalidParameters(format!(
                "False-positive rate must lie in (0, 1), got {}",
                false_positive_rate
            )));
        }

        let n = capacity as f64;
        let ln2 = std::f64::consts::LN_2;
        let length = (-n * false_positive_rate.ln() / (ln2 * ln2)).ceil() as usize;
        let hash_count = (ln2 * length as f64 / n).ceil().max(1.0) as usize;

        Ok(Self::new(length, hash_count))
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn hash_count(&self) -> usize {
        self.hash_count
    }

    /// The bit at `index`. Out-of-range indices read as unset.
    pub fn bit(&self, index: usize) -> bool {
        if index >= self.length {
            return false;
        }
        (self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1
    }

    fn set(&mut self, index: usize) {
        self.words[index / WORD_BITS] |= 1 << (index % WORD_BITS);
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// The `k` indices in `[0, L)` for `element`. Indices may repeat.
    pub fn hash_indices(&self, element: &[u8]) -> Vec<usize> {
        if self.length == 0 {
            return Vec::new();
        }

        let mut first = FnvHasher::default();
        first.write(element);
        let h1 = first.finish();

        let mut second = FnvHasher::with_key(SECOND_HASH_KEY);
        second.write(element);
        // an odd step never degenerates to a single index when L is a power of two
        let h2 = second.finish() | 1;

        let length = self.length as u64;
        (0..self.hash_count as u64)
            .map(|j| (h1.wrapping_add(j.wrapping_mul(h2)) % length) as usize)
            .collect()
    }

    pub fn insert(&mut self, element: &[u8]) {
        for index in self.hash_indices(element) {
            self.set(index);
        }
    }

    /// Plaintext membership test; false positives possible, false negatives not.
    pub fn contains(&self, element: &[u8]) -> bool {
        self.length > 0 && self.hash_indices(element).into_iter().all(|i| self.bit(i))
    }
}
