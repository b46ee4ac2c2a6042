//! Lower-triangular adjacency bit strings.

use std::{cmp::Ordering, fmt};

use crate::error::{GraphletError, Result};

const WORD_BITS: usize = 64;

/// Number of signature bits for an undirected loop-free graph of `order`.
#[must_use]
pub const fn bits_per_graph(order: usize) -> usize {
    order * order.saturating_sub(1) / 2
}

/// Bit index of the unordered pair `{u, v}` with `u != v`.
#[must_use]
pub const fn pair_index(u: usize, v: usize) -> usize {
    let (high, low) = if u > v { (u, v) } else { (v, u) };
    high * (high - 1) / 2 + low
}

/// Adjacency pattern of a small undirected graph.
///
/// Bit `u(u-1)/2 + v` is set when `u > v` are adjacent. Words are stored
/// least significant first and two signatures order as unsigned integers:
/// the highest differing bit decides.
///
/// # Examples
/// ```
/// use graphlets_core::Signature;
///
/// let mut path = Signature::empty(3);
/// path.set(0); // {1, 0}
/// path.set(2); // {2, 1}
/// assert_eq!(path.as_u64(), Some(0b101));
/// assert_eq!(path.to_string(), "5");
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Signature {
    order: usize,
    words: Vec<u64>,
}

impl Signature {
    /// All-zero pattern (the edgeless graph) of `order` vertices.
    #[must_use]
    pub fn empty(order: usize) -> Self {
        let words = bits_per_graph(order).div_ceil(WORD_BITS);
        Self {
            order,
            words: vec![0; words],
        }
    }

    /// Pattern from its packed 64-bit form.
    ///
    /// # Errors
    /// Returns [`GraphletError::SignatureTooWide`] when `order` needs more
    /// than 64 bits and [`GraphletError::InvalidParameter`] when `bits` sets
    /// positions beyond the pattern length.
    pub fn from_u64(order: usize, bits: u64) -> Result<Self> {
        let len = bits_per_graph(order);
        if len > WORD_BITS {
            return Err(GraphletError::SignatureTooWide {
                order,
                bits: len,
                max_bits: WORD_BITS,
            });
        }
        if len < WORD_BITS && bits >> len != 0 {
            return Err(GraphletError::InvalidParameter {
                name: "bits",
                reason: "pattern sets bits beyond the pair count",
            });
        }
        let mut signature = Self::empty(order);
        if let Some(word) = signature.words.first_mut() {
            *word = bits;
        }
        Ok(signature)
    }

    /// Number of vertices of the encoded graph.
    #[must_use]
    pub const fn order(&self) -> usize {
        self.order
    }

    /// Number of bits in the pattern.
    #[must_use]
    pub const fn bit_len(&self) -> usize {
        bits_per_graph(self.order)
    }

    /// Reads bit `index`; out-of-range bits read as unset.
    #[must_use]
    pub fn get(&self, index: usize) -> bool {
        self.words
            .get(index / WORD_BITS)
            .is_some_and(|word| word >> (index % WORD_BITS) & 1 == 1)
    }

    /// Sets bit `index`. Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize) {
        if index < self.bit_len() {
            if let Some(word) = self.words.get_mut(index / WORD_BITS) {
                *word |= 1 << (index % WORD_BITS);
            }
        }
    }

    /// Packed form, available while the pattern fits in 64 bits.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        (self.bit_len() <= WORD_BITS).then(|| self.words.first().copied().unwrap_or(0))
    }

    /// Number of edges encoded.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Raw words, least significant first.
    #[must_use]
    pub fn words(&self) -> &[u64] {
        &self.words
    }
}

impl Ord for Signature {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order.cmp(&other.order).then_with(|| {
            self.words
                .iter()
                .rev()
                .cmp(other.words.iter().rev())
        })
    }
}

impl PartialOrd for Signature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(bits) = self.as_u64() {
            return write!(f, "{bits}");
        }
        f.write_str("0x")?;
        for (position, word) in self.words.iter().rev().enumerate() {
            if position == 0 {
                write!(f, "{word:x}")?;
            } else {
                write!(f, "{word:016x}")?;
            }
        }
        Ok(())
    }
}
