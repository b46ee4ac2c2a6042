//! Benchmark parameter types and their Criterion labels.

use std::fmt;

/// A synthetic Erdős–Rényi host.
#[derive(Clone, Copy, Debug)]
pub struct HostParams {
    /// Number of vertices.
    pub vertices: usize,
    /// Number of distinct undirected edges.
    pub edges: usize,
    /// Generator seed.
    pub seed: u64,
}

impl HostParams {
    /// Host with `vertices` vertices and `edges` edges drawn from `seed`.
    #[must_use]
    pub const fn new(vertices: usize, edges: usize, seed: u64) -> Self {
        Self {
            vertices,
            edges,
            seed,
        }
    }
}

impl fmt::Display for HostParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},m={}", self.vertices, self.edges)
    }
}

/// A host plus a graphlet size.
#[derive(Clone, Copy, Debug)]
pub struct GraphletBenchParams {
    /// Host to run on.
    pub host: HostParams,
    /// Graphlet size.
    pub size: usize,
}

impl fmt::Display for GraphletBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},k={}", self.host, self.size)
    }
}
