//! Materialized adjacency of a graphlet, relabeled to `0..order`.

use crate::{
    canon::{Signature, pair_index},
    error::{GraphletError, Result},
};

/// Largest order a [`SmallGraph`] can hold.
pub const MAX_ORDER: usize = 64;

/// Undirected loop-free graph on at most [`MAX_ORDER`] vertices.
///
/// Each row is a bitmask of neighbours.
///
/// # Examples
/// ```
/// use graphlets_core::SmallGraph;
///
/// let triangle = SmallGraph::from_edges(3, [(0, 1), (1, 2), (2, 0)]).expect("valid edges");
/// assert!(triangle.is_connected());
/// assert_eq!(triangle.edge_count(), 3);
/// assert_eq!(triangle.pattern().as_u64(), Some(0b111));
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SmallGraph {
    rows: Vec<u64>,
}

impl SmallGraph {
    /// Edgeless graph of `order` vertices.
    ///
    /// # Errors
    /// Returns [`GraphletError::InvalidSize`] when `order` exceeds
    /// [`MAX_ORDER`].
    pub fn new(order: usize) -> Result<Self> {
        if order > MAX_ORDER {
            return Err(GraphletError::InvalidSize {
                size: order,
                min: 0,
                max: MAX_ORDER,
            });
        }
        Ok(Self {
            rows: vec![0; order],
        })
    }

    /// Graph with the given undirected edges. Loops are ignored.
    ///
    /// # Errors
    /// Returns [`GraphletError::InvalidSize`] for oversized orders and
    /// [`GraphletError::VertexOutOfRange`] for endpoints outside `0..order`.
    pub fn from_edges(order: usize, edges: impl IntoIterator<Item = (usize, usize)>) -> Result<Self> {
        let mut graph = Self::new(order)?;
        for (u, v) in edges {
            for vertex in [u, v] {
                if vertex >= order {
                    return Err(GraphletError::VertexOutOfRange {
                        vertex,
                        vertices: order,
                    });
                }
            }
            graph.add_edge(u, v);
        }
        Ok(graph)
    }

    /// Decodes a pattern produced by [`Self::pattern`].
    ///
    /// # Errors
    /// Returns [`GraphletError::InvalidSize`] when the pattern's order exceeds
    /// [`MAX_ORDER`].
    pub fn from_pattern(pattern: &Signature) -> Result<Self> {
        let order = pattern.order();
        let mut graph = Self::new(order)?;
        for u in 1..order {
            for v in 0..u {
                if pattern.get(pair_index(u, v)) {
                    graph.add_edge(u, v);
                }
            }
        }
        Ok(graph)
    }

    /// Number of vertices.
    #[must_use]
    pub fn order(&self) -> usize {
        self.rows.len()
    }

    /// Adds the undirected edge `{u, v}`; loops and unknown vertices are ignored.
    pub fn add_edge(&mut self, u: usize, v: usize) {
        if u == v || u >= self.order() || v >= self.order() {
            return;
        }
        self.rows[u] |= 1 << v;
        self.rows[v] |= 1 << u;
    }

    /// Whether `u` and `v` are adjacent.
    #[must_use]
    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        v < MAX_ORDER && self.rows.get(u).is_some_and(|row| row >> v & 1 == 1)
    }

    /// Number of neighbours of `u`.
    #[must_use]
    pub fn degree(&self, u: usize) -> usize {
        self.rows.get(u).map_or(0, |row| row.count_ones() as usize)
    }

    /// Neighbours of `u` in increasing order.
    pub fn neighbours(&self, u: usize) -> impl Iterator<Item = usize> + '_ {
        let row = self.rows.get(u).copied().unwrap_or(0);
        (0..self.order()).filter(move |&v| row >> v & 1 == 1)
    }

    /// Number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.rows.iter().map(|row| row.count_ones() as usize).sum::<usize>() / 2
    }

    /// Undirected edges `(u, v)` with `u > v`.
    #[must_use]
    pub fn edges(&self) -> Vec<(usize, usize)> {
        (1..self.order())
            .flat_map(|u| (0..u).filter(move |&v| self.has_edge(u, v)).map(move |v| (u, v)))
            .collect()
    }

    /// Whether every vertex is reachable from vertex `0`.
    ///
    /// The empty graph is not connected; a single vertex is.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        let order = self.order();
        if order == 0 {
            return false;
        }
        let all = if order == MAX_ORDER {
            u64::MAX
        } else {
            (1_u64 << order) - 1
        };
        let mut reached = 1_u64;
        let mut frontier = 1_u64;
        while frontier != 0 {
            let mut next = 0_u64;
            let mut pending = frontier;
            while pending != 0 {
                let vertex = pending.trailing_zeros() as usize;
                pending &= pending - 1;
                next |= self.rows[vertex];
            }
            frontier = next & !reached;
            reached |= frontier;
        }
        reached == all
    }

    /// Whether the graph is a tree (connected with `order - 1` edges).
    #[must_use]
    pub fn is_tree(&self) -> bool {
        self.is_connected() && self.edge_count() + 1 == self.order()
    }

    /// Lower-triangular adjacency pattern.
    #[must_use]
    pub fn pattern(&self) -> Signature {
        let mut signature = Signature::empty(self.order());
        for (u, v) in self.edges() {
            signature.set(pair_index(u, v));
        }
        signature
    }

    /// Copy with vertex `i` renamed to `permutation[i]`.
    ///
    /// # Errors
    /// Returns [`GraphletError::OrderMismatch`] when the permutation length
    /// differs from the order, and [`GraphletError::VertexOutOfRange`] when it
    /// names an unknown vertex.
    pub fn relabeled(&self, permutation: &[usize]) -> Result<Self> {
        if permutation.len() != self.order() {
            return Err(GraphletError::OrderMismatch {
                expected: self.order(),
                actual: permutation.len(),
            });
        }
        let edges: Vec<(usize, usize)> = self
            .edges()
            .into_iter()
            .map(|(u, v)| (permutation[u], permutation[v]))
            .collect();
        Self::from_edges(self.order(), edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case::empty(0, vec![], false)]
    #[case::single(1, vec![], true)]
    #[case::pair(2, vec![(0, 1)], true)]
    #[case::split(4, vec![(0, 1), (2, 3)], false)]
    #[case::path(4, vec![(0, 1), (1, 2), (2, 3)], true)]
    fn connectivity_matches_structure(
        #[case] order: usize,
        #[case] edges: Vec<(usize, usize)>,
        #[case] connected: bool,
    ) {
        let graph = SmallGraph::from_edges(order, edges).expect("valid edges");
        assert_eq!(graph.is_connected(), connected);
    }

    #[test]
    fn order_sixty_four_connectivity_uses_full_mask() {
        let graph =
            SmallGraph::from_edges(64, (1..64).map(|v| (v - 1, v))).expect("valid path edges");
        assert!(graph.is_connected());
        assert!(graph.is_tree());
    }

    #[test]
    fn rejects_orders_above_sixty_four() {
        let err = SmallGraph::new(65).expect_err("65 vertices do not fit");
        assert!(matches!(err, GraphletError::InvalidSize { size: 65, .. }));
    }

    #[test]
    fn pattern_round_trips_through_from_pattern() {
        let graph = SmallGraph::from_edges(5, [(0, 4), (4, 2), (2, 1), (3, 1)]).expect("edges");
        let decoded = SmallGraph::from_pattern(&graph.pattern()).expect("pattern decodes");
        assert_eq!(decoded, graph);
        assert!(graph.is_tree());
    }

    #[test]
    fn relabeling_preserves_degrees() {
        let star = SmallGraph::from_edges(4, [(0, 1), (0, 2), (0, 3)]).expect("edges");
        let moved = star.relabeled(&[3, 0, 1, 2]).expect("valid permutation");
        assert_eq!(moved.degree(3), 3);
        assert_eq!(moved.neighbours(3).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(star.relabeled(&[0, 1]).is_err());
    }
}
