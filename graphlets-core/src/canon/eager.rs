use std::{collections::HashMap, sync::Arc};

use tracing::{debug, instrument};

use super::{
    Canonicalizer, check_order,
    permutation::{bit_map, for_each_permutation, permute_bits},
    signature::{Signature, bits_per_graph},
};
use crate::{
    error::{GraphletError, Result},
    small_graph::SmallGraph,
};

/// Largest order the eager table is built for.
///
/// Order 8 already has 2^28 labeled patterns, beyond a reasonable table.
pub const MAX_EAGER_ORDER: usize = 7;

/// Canonicalizer backed by a table of every connected labeled pattern.
///
/// Construction scans all `2^(n(n-1)/2)` patterns in increasing order, skips
/// disconnected ones, and maps every relabeling of a not-yet-seen pattern to
/// it. Lookups are then a single hash probe.
///
/// # Examples
/// ```
/// use graphlets_core::{Canonicalizer, EagerCanonicalizer, SmallGraph};
///
/// let canon = EagerCanonicalizer::new(4).expect("order 4 is supported");
/// assert_eq!(canon.class_count(), 6);
/// let path = SmallGraph::from_edges(4, [(0, 1), (1, 2), (2, 3)]).expect("edges");
/// let shuffled = SmallGraph::from_edges(4, [(2, 0), (0, 3), (3, 1)]).expect("edges");
/// assert_eq!(canon.signature(&path)?, canon.signature(&shuffled)?);
/// # Ok::<(), graphlets_core::GraphletError>(())
/// ```
#[derive(Clone, Debug)]
pub struct EagerCanonicalizer {
    order: usize,
    table: HashMap<u64, u64>,
    representatives: Vec<u64>,
}

impl EagerCanonicalizer {
    /// Builds the table for graphs of `order` vertices.
    ///
    /// # Errors
    /// Returns [`GraphletError::InvalidSize`] when `order` is zero or above
    /// [`MAX_EAGER_ORDER`].
    #[instrument(name = "canon.eager.build", err)]
    pub fn new(order: usize) -> Result<Self> {
        if order == 0 || order > MAX_EAGER_ORDER {
            return Err(GraphletError::InvalidSize {
                size: order,
                min: 1,
                max: MAX_EAGER_ORDER,
            });
        }
        let bits = bits_per_graph(order);
        let mut maps = Vec::new();
        for_each_permutation(order, |permutation| maps.push(bit_map(order, permutation)));

        let mut table = HashMap::new();
        let mut representatives = Vec::new();
        let last = if bits == 0 { 0 } else { u64::MAX >> (64 - bits) };
        for pattern in 0..=last {
            if table.contains_key(&pattern) || !is_connected_pattern(order, pattern)? {
                continue;
            }
            representatives.push(pattern);
            for map in &maps {
                table.entry(permute_bits(pattern, map)).or_insert(pattern);
            }
        }
        debug!(
            classes = representatives.len(),
            patterns = table.len(),
            "eager canonicalization table built"
        );
        Ok(Self {
            order,
            table,
            representatives,
        })
    }

    /// Number of isomorphism classes of connected graphs of this order.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.representatives.len()
    }

    /// Class representatives in discovery order.
    #[must_use]
    pub fn representatives(&self) -> &[u64] {
        &self.representatives
    }

    /// Representative of the class containing the packed `pattern`.
    ///
    /// # Errors
    /// Returns [`GraphletError::DisconnectedPattern`] when the pattern is not
    /// in the table.
    pub fn lookup(&self, pattern: u64) -> Result<u64> {
        self.table
            .get(&pattern)
            .copied()
            .ok_or_else(|| GraphletError::DisconnectedPattern {
                pattern: Arc::from(pattern.to_string()),
                order: self.order,
            })
    }
}

fn is_connected_pattern(order: usize, pattern: u64) -> Result<bool> {
    let signature = Signature::from_u64(order, pattern)?;
    Ok(SmallGraph::from_pattern(&signature)?.is_connected())
}

impl Canonicalizer for EagerCanonicalizer {
    fn order(&self) -> usize {
        self.order
    }

    fn canonical_pattern(&self, pattern: &Signature) -> Result<Signature> {
        check_order(self.order, pattern.order())?;
        let packed = pattern.as_u64().ok_or(GraphletError::SignatureTooWide {
            order: self.order,
            bits: pattern.bit_len(),
            max_bits: 64,
        })?;
        Signature::from_u64(self.order, self.lookup(packed)?)
    }
}
