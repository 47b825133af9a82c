//! Append-only Bloom filter safe for concurrent reads and inserts.
//!
//! Bits live in `AtomicU64` words and are only ever set, so readers never
//! block writers and a bit once observed set stays set. Bit positions come
//! from SHA-256 via double hashing (`h1 + i * h2`).

use std::sync::atomic::{AtomicU64, Ordering};

use sha2::{Digest, Sha256};

/// A set answering "definitely absent" or "maybe present".
pub trait MembershipFilter: Send + Sync + std::fmt::Debug + 'static {
    /// `false` means the item was never inserted.
    fn contains(&self, item: &str) -> bool;

    /// Add an item. Returns `true` if any bit changed; re-inserting is a no-op.
    fn insert(&self, item: &str) -> bool;
}

/// Fixed-size Bloom filter sized for an expected population.
#[derive(Debug)]
pub struct BloomFilter {
    words: Box<[AtomicU64]>,
    num_bits: u64,
    num_hashes: u32,
}

impl BloomFilter {
    /// Size the filter so `expected_items` insertions keep the false-positive
    /// rate near `false_positive_rate`.
    pub fn new(expected_items: u64, false_positive_rate: f64) -> Self {
        let n = expected_items.max(1) as f64;
        let p = false_positive_rate.clamp(1e-9, 0.5);
        let ln2 = std::f64::consts::LN_2;

        let num_bits = (-(n * p.ln()) / (ln2 * ln2)).ceil().max(64.0) as u64;
        let num_hashes = ((num_bits as f64 / n) * ln2).round().clamp(1.0, 32.0) as u32;
        let num_words = num_bits.div_ceil(64) as usize;

        let words = (0..num_words)
            .map(|_| AtomicU64::new(0))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            words,
            num_bits,
            num_hashes,
        }
    }

    /// Number of bits in the filter.
    pub fn num_bits(&self) -> u64 {
        self.num_bits
    }

    /// Number of hash functions per item.
    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    /// Number of bits currently set.
    pub fn set_bits(&self) -> u64 {
        self.words
            .iter()
            .map(|w| u64::from(w.load(Ordering::Relaxed).count_ones()))
            .sum()
    }

    fn positions(&self, item: &str) -> impl Iterator<Item = u64> + '_ {
        let digest = Sha256::digest(item.as_bytes());
        let mut lo = [0u8; 8];
        let mut hi = [0u8; 8];
        lo.copy_from_slice(&digest[..8]);
        hi.copy_from_slice(&digest[8..16]);
        let h1 = u64::from_le_bytes(lo);
        // odd stride so successive probes never collapse onto one bit
        let h2 = u64::from_le_bytes(hi) | 1;

        (0..u64::from(self.num_hashes))
            .map(move |i| h1.wrapping_add(i.wrapping_mul(h2)) % self.num_bits)
    }

    fn locate(bit: u64) -> (usize, u64) {
        ((bit / 64) as usize, 1u64 << (bit % 64))
    }
}

impl MembershipFilter for BloomFilter {
    fn contains(&self, item: &str) -> bool {
        self.positions(item).all(|bit| {
            let (word, mask) = Self::locate(bit);
            self.words[word].load(Ordering::Acquire) & mask != 0
        })
    }

    fn insert(&self, item: &str) -> bool {
        let mut changed = false;
        for bit in self.positions(item) {
            let (word, mask) = Self::locate(bit);
            let previous = self.words[word].fetch_or(mask, Ordering::AcqRel);
            changed |= previous & mask == 0;
        }
        changed
    }
}
