use dashmap::DashMap;

use super::{
    Canonicalizer, check_order,
    permutation::{for_each_permutation, permute_edges},
    signature::Signature,
};
use crate::{error::Result, small_graph::SmallGraph};

/// Canonicalizer that searches relabelings on demand.
///
/// The first query for a class tries all `n!` relabelings, keeps the smallest
/// pattern, and records it for every visited variant. Concurrent first
/// queries may repeat that work; the first inserted answer wins.
///
/// # Examples
/// ```
/// use graphlets_core::{Canonicalizer, LazyCanonicalizer, SmallGraph};
///
/// let canon = LazyCanonicalizer::new(3);
/// let left = SmallGraph::from_edges(3, [(0, 1), (1, 2)]).expect("edges");
/// let right = SmallGraph::from_edges(3, [(0, 2), (2, 1)]).expect("edges");
/// assert_eq!(canon.long_signature(&left)?, canon.long_signature(&right)?);
/// assert_eq!(canon.long_signature(&left)?, 0b011);
/// # Ok::<(), graphlets_core::GraphletError>(())
/// ```
#[derive(Debug, Default)]
pub struct LazyCanonicalizer {
    order: usize,
    memo: DashMap<Signature, Signature>,
}

impl LazyCanonicalizer {
    /// Creates an empty memo for graphs of `order` vertices.
    #[must_use]
    pub fn new(order: usize) -> Self {
        Self {
            order,
            memo: DashMap::new(),
        }
    }

    /// Number of memoized patterns.
    #[must_use]
    pub fn memoized(&self) -> usize {
        self.memo.len()
    }

    fn search(&self, pattern: &Signature) -> Result<Signature> {
        let edges = SmallGraph::from_pattern(pattern)?.edges();
        let mut variants = Vec::new();
        for_each_permutation(self.order, |permutation| {
            variants.push(permute_edges(self.order, &edges, permutation));
        });
        let minimum = variants
            .iter()
            .min()
            .cloned()
            .unwrap_or_else(|| pattern.clone());
        for variant in variants {
            self.memo.entry(variant).or_insert_with(|| minimum.clone());
        }
        Ok(self
            .memo
            .get(pattern)
            .map_or(minimum, |winner| winner.value().clone()))
    }
}

impl Canonicalizer for LazyCanonicalizer {
    fn order(&self) -> usize {
        self.order
    }

    fn canonical_pattern(&self, pattern: &Signature) -> Result<Signature> {
        check_order(self.order, pattern.order())?;
        if let Some(hit) = self.memo.get(pattern) {
            return Ok(hit.value().clone());
        }
        self.search(pattern)
    }
}
