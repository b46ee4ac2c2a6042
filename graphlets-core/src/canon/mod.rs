//! Canonical signatures identifying the isomorphism class of small graphs.
//!
//! Two strategies implement [`Canonicalizer`]:
//!
//! - [`EagerCanonicalizer`] precomputes a table over every connected labeled
//!   pattern of a fixed order.
//! - [`LazyCanonicalizer`] searches relabelings on first use and memoizes the
//!   answer for every variant it visited.
//!
//! Both pick the numerically smallest pattern of a class. The eager table
//! reaches that pattern first because it scans patterns in increasing order,
//! so the two agree on every input.

mod eager;
mod lazy;
pub(crate) mod permutation;
mod signature;

pub use self::{
    eager::{EagerCanonicalizer, MAX_EAGER_ORDER},
    lazy::LazyCanonicalizer,
    signature::{Signature, bits_per_graph, pair_index},
};

use crate::{
    error::{GraphletError, Result},
    small_graph::SmallGraph,
};

/// Maps graphs of a fixed order to a representative of their isomorphism class.
///
/// Implementations are deterministic, invariant under relabeling, and safe to
/// share between threads.
pub trait Canonicalizer: Send + Sync {
    /// Order of the graphs this instance classifies.
    fn order(&self) -> usize;

    /// Representative pattern of the class containing `pattern`.
    ///
    /// # Errors
    /// Returns [`GraphletError::OrderMismatch`] when the pattern has a different
    /// order; implementations may reject further inputs.
    fn canonical_pattern(&self, pattern: &Signature) -> Result<Signature>;

    /// Canonical signature of `graph`.
    ///
    /// # Errors
    /// Propagates the errors of [`Self::canonical_pattern`].
    fn signature(&self, graph: &SmallGraph) -> Result<Signature> {
        check_order(self.order(), graph.order())?;
        self.canonical_pattern(&graph.pattern())
    }

    /// Canonical signature packed into 64 bits.
    ///
    /// # Errors
    /// Returns [`GraphletError::SignatureTooWide`] when the order needs more
    /// than 64 bits, otherwise propagates [`Self::signature`] errors.
    fn long_signature(&self, graph: &SmallGraph) -> Result<u64> {
        let bits = bits_per_graph(graph.order());
        let too_wide = GraphletError::SignatureTooWide {
            order: graph.order(),
            bits,
            max_bits: 64,
        };
        if bits > 64 {
            return Err(too_wide);
        }
        self.signature(graph)?.as_u64().ok_or(too_wide)
    }
}

pub(crate) const fn check_order(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(GraphletError::OrderMismatch { expected, actual })
    }
}

#[cfg(test)]
mod tests;
