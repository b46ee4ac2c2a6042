//! Synthetic host graphs for tests, benchmarks, and demos.
//!
//! Every generator returns a symmetric loop-free [`AdjacencyGraph`].

use std::collections::BTreeSet;

use rand::{Rng, SeedableRng, rngs::SmallRng};

use super::AdjacencyGraph;
use crate::error::{GraphletError, Result};

/// Cycle `0 - 1 - ... - (n-1) - 0`. Cycles need at least three vertices.
///
/// # Errors
/// Returns [`GraphletError::InvalidParameter`] when `n < 3`.
pub fn cycle(n: usize) -> Result<AdjacencyGraph> {
    if n < 3 {
        return Err(GraphletError::InvalidParameter {
            name: "n",
            reason: "a cycle needs at least three vertices",
        });
    }
    AdjacencyGraph::from_edges(n, (0..n).map(|vertex| (vertex, (vertex + 1) % n)))
}

/// Path `0 - 1 - ... - (n-1)`.
///
/// # Errors
/// Never fails for valid sizes; the result type mirrors the other generators.
pub fn path(n: usize) -> Result<AdjacencyGraph> {
    AdjacencyGraph::from_edges(n, (1..n).map(|vertex| (vertex - 1, vertex)))
}

/// Complete graph on `n` vertices.
///
/// # Errors
/// Never fails for valid sizes; the result type mirrors the other generators.
pub fn clique(n: usize) -> Result<AdjacencyGraph> {
    AdjacencyGraph::from_edges(
        n,
        (0..n).flat_map(|left| (left + 1..n).map(move |right| (left, right))),
    )
}

/// Star with centre `0` and `leaves` leaves `1..=leaves`.
///
/// # Errors
/// Never fails for valid sizes; the result type mirrors the other generators.
pub fn star(leaves: usize) -> Result<AdjacencyGraph> {
    AdjacencyGraph::from_edges(leaves + 1, (1..=leaves).map(|leaf| (0, leaf)))
}

/// Random recursive tree: vertex `i > 0` attaches to a uniform earlier vertex.
///
/// # Errors
/// Never fails for valid sizes; the result type mirrors the other generators.
pub fn random_tree(n: usize, seed: u64) -> Result<AdjacencyGraph> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let edges: Vec<(usize, usize)> = (1..n)
        .map(|vertex| (rng.gen_range(0..vertex), vertex))
        .collect();
    AdjacencyGraph::from_edges(n, edges)
}

/// Erdős–Rényi `G(n, m)` graph with exactly `edges` distinct edges.
///
/// # Errors
/// Returns [`GraphletError::InvalidParameter`] when `edges` exceeds the
/// number of vertex pairs.
pub fn erdos_renyi(n: usize, edges: usize, seed: u64) -> Result<AdjacencyGraph> {
    let pairs = n.saturating_mul(n.saturating_sub(1)) / 2;
    if edges > pairs {
        return Err(GraphletError::InvalidParameter {
            name: "edges",
            reason: "more edges requested than vertex pairs exist",
        });
    }
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut chosen = BTreeSet::new();
    while chosen.len() < edges {
        let left = rng.gen_range(0..n);
        let right = rng.gen_range(0..n);
        if left != right {
            chosen.insert((left.min(right), left.max(right)));
        }
    }
    AdjacencyGraph::from_edges(n, chosen)
}
