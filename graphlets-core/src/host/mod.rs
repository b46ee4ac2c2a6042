//! Host graphs that graphlets are discovered in.
//!
//! The [`HostGraph`] trait is the contract every algorithm in the crate
//! consumes. [`AdjacencyGraph`] is the in-memory compressed-sparse-row
//! implementation produced by the loaders and the [`generators`].

pub mod generators;

use std::sync::Arc;

use crate::error::{GraphletError, Result};

/// Read-only access to an immutable directed graph over vertices `0..n`.
///
/// Undirected graphlets are built from symmetric, loop-free host graphs.
/// Implementations must make [`HostGraph::copy`] cheap: workers take one copy
/// each and traverse it concurrently.
pub trait HostGraph: Send + Sync {
    /// Number of vertices.
    fn num_vertices(&self) -> usize;

    /// Number of arcs.
    fn num_arcs(&self) -> usize;

    /// Number of successors of `vertex`.
    fn out_degree(&self, vertex: usize) -> usize;

    /// Lazily yields the successors of `vertex` in a single pass.
    fn successors(&self, vertex: usize) -> impl Iterator<Item = usize> + '_;

    /// Returns `true` when the arc `from -> to` exists.
    fn has_arc(&self, from: usize, to: usize) -> bool {
        self.successors(from).any(|succ| succ == to)
    }

    /// Whether arbitrary vertices can be visited in any order.
    fn supports_random_access(&self) -> bool {
        true
    }

    /// Returns an independent handle sharing the underlying data.
    #[must_use]
    fn copy(&self) -> Self
    where
        Self: Sized;

    /// Largest out-degree over all vertices.
    fn max_degree(&self) -> usize {
        (0..self.num_vertices())
            .map(|vertex| self.out_degree(vertex))
            .max()
            .unwrap_or(0)
    }
}

/// Compressed-sparse-row graph with sorted successor lists.
///
/// # Examples
/// ```
/// use graphlets_core::{AdjacencyGraph, HostGraph};
///
/// let graph = AdjacencyGraph::from_edges(3, [(0, 1), (1, 2)]).expect("valid edges");
/// assert_eq!(graph.num_arcs(), 4);
/// assert!(graph.has_arc(2, 1));
/// assert_eq!(graph.successors(1).collect::<Vec<_>>(), vec![0, 2]);
/// ```
#[derive(Clone, Debug)]
pub struct AdjacencyGraph {
    offsets: Arc<[usize]>,
    targets: Arc<[usize]>,
    max_degree: usize,
}

impl AdjacencyGraph {
    /// Builds a symmetric loop-free graph from undirected edges.
    ///
    /// Self-loops are dropped and parallel edges merged.
    ///
    /// # Errors
    /// Returns [`GraphletError::VertexOutOfRange`] when an endpoint is not
    /// below `num_vertices`.
    pub fn from_edges(
        num_vertices: usize,
        edges: impl IntoIterator<Item = (usize, usize)>,
    ) -> Result<Self> {
        let mut arcs = Vec::new();
        for (left, right) in edges {
            check_vertex(left, num_vertices)?;
            check_vertex(right, num_vertices)?;
            if left != right {
                arcs.push((left, right));
                arcs.push((right, left));
            }
        }
        Ok(Self::from_sorted_arcs(num_vertices, arcs))
    }

    /// Builds a directed graph from arcs exactly as given, minus duplicates.
    ///
    /// # Errors
    /// Returns [`GraphletError::VertexOutOfRange`] when an endpoint is not
    /// below `num_vertices`.
    pub fn from_arcs(
        num_vertices: usize,
        arcs: impl IntoIterator<Item = (usize, usize)>,
    ) -> Result<Self> {
        let mut collected = Vec::new();
        for (from, to) in arcs {
            check_vertex(from, num_vertices)?;
            check_vertex(to, num_vertices)?;
            collected.push((from, to));
        }
        Ok(Self::from_sorted_arcs(num_vertices, collected))
    }

    fn from_sorted_arcs(num_vertices: usize, mut arcs: Vec<(usize, usize)>) -> Self {
        arcs.sort_unstable();
        arcs.dedup();
        let mut offsets = vec![0_usize; num_vertices + 1];
        for &(from, _) in &arcs {
            offsets[from + 1] += 1;
        }
        let mut max_degree = 0;
        for vertex in 0..num_vertices {
            max_degree = max_degree.max(offsets[vertex + 1]);
            offsets[vertex + 1] += offsets[vertex];
        }
        let targets: Vec<usize> = arcs.into_iter().map(|(_, to)| to).collect();
        Self {
            offsets: offsets.into(),
            targets: targets.into(),
            max_degree,
        }
    }

    fn neighbours(&self, vertex: usize) -> &[usize] {
        let start = self.offsets.get(vertex).copied().unwrap_or(0);
        let end = self.offsets.get(vertex + 1).copied().unwrap_or(start);
        self.targets.get(start..end).unwrap_or(&[])
    }

    /// Returns `true` when every arc has its reverse and no vertex loops.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        (0..self.num_vertices()).all(|vertex| {
            self.neighbours(vertex)
                .iter()
                .all(|&succ| succ != vertex && self.has_arc(succ, vertex))
        })
    }
}

impl HostGraph for AdjacencyGraph {
    fn num_vertices(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    fn num_arcs(&self) -> usize {
        self.targets.len()
    }

    fn out_degree(&self, vertex: usize) -> usize {
        self.neighbours(vertex).len()
    }

    fn successors(&self, vertex: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbours(vertex).iter().copied()
    }

    fn has_arc(&self, from: usize, to: usize) -> bool {
        self.neighbours(from).binary_search(&to).is_ok()
    }

    fn copy(&self) -> Self {
        self.clone()
    }

    fn max_degree(&self) -> usize {
        self.max_degree
    }
}

/// Adapter that hides random access, modelling sequential-only graph formats.
#[derive(Clone, Debug)]
pub struct SequentialGraph<G> {
    inner: G,
}

impl<G: HostGraph> SequentialGraph<G> {
    /// Wraps `inner`, reporting no random access.
    #[must_use]
    pub const fn new(inner: G) -> Self {
        Self { inner }
    }
}

impl<G: HostGraph> HostGraph for SequentialGraph<G> {
    fn num_vertices(&self) -> usize {
        self.inner.num_vertices()
    }

    fn num_arcs(&self) -> usize {
        self.inner.num_arcs()
    }

    fn out_degree(&self, vertex: usize) -> usize {
        self.inner.out_degree(vertex)
    }

    fn successors(&self, vertex: usize) -> impl Iterator<Item = usize> + '_ {
        self.inner.successors(vertex)
    }

    fn has_arc(&self, from: usize, to: usize) -> bool {
        self.inner.has_arc(from, to)
    }

    fn supports_random_access(&self) -> bool {
        false
    }

    fn copy(&self) -> Self {
        Self {
            inner: self.inner.copy(),
        }
    }

    fn max_degree(&self) -> usize {
        self.inner.max_degree()
    }
}

pub(crate) const fn check_vertex(vertex: usize, vertices: usize) -> Result<()> {
    if vertex < vertices {
        Ok(())
    } else {
        Err(GraphletError::VertexOutOfRange { vertex, vertices })
    }
}

#[cfg(test)]
mod tests;
