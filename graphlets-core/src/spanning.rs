//! Spanning-tree counts via Kirchhoff's matrix-tree theorem.

use nalgebra::DMatrix;

use crate::small_graph::SmallGraph;

/// Number of spanning trees of `graph`.
///
/// Graphs of order zero or one have exactly one (empty) spanning tree;
/// disconnected graphs have none. The count is the determinant of the
/// Laplacian with its last row and column removed, rounded to the nearest
/// integer.
///
/// # Examples
/// ```
/// use graphlets_core::{SmallGraph, spanning_tree_count};
///
/// let k4 = SmallGraph::from_edges(4, [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)])
///     .expect("valid edges");
/// assert_eq!(spanning_tree_count(&k4), 16);
/// ```
#[must_use]
pub fn spanning_tree_count(graph: &SmallGraph) -> u64 {
    let order = graph.order();
    if order <= 1 {
        return 1;
    }
    let minor = order - 1;
    let laplacian = DMatrix::from_fn(minor, minor, |row, col| {
        if row == col {
            graph.degree(row) as f64
        } else if graph.has_edge(row, col) {
            -1.0
        } else {
            0.0
        }
    });
    let determinant = laplacian.lu().determinant();
    if determinant < 0.5 {
        return 0;
    }
    // Saturating float cast; graphlet tree counts stay far below u64::MAX.
    determinant.round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn clique(order: usize) -> SmallGraph {
        let edges = (0..order).flat_map(|u| (0..u).map(move |v| (u, v)));
        SmallGraph::from_edges(order, edges).expect("valid clique")
    }

    #[rstest]
    #[case(2, 1)]
    #[case(3, 3)]
    #[case(4, 16)]
    #[case(5, 125)]
    #[case(6, 1_296)]
    fn cliques_follow_cayley(#[case] order: usize, #[case] expected: u64) {
        assert_eq!(spanning_tree_count(&clique(order)), expected);
    }

    #[test]
    fn cycle_has_one_tree_per_edge() {
        let cycle = SmallGraph::from_edges(6, (0..6).map(|v| (v, (v + 1) % 6))).expect("cycle");
        assert_eq!(spanning_tree_count(&cycle), 6);
    }

    #[test]
    fn trees_have_exactly_one() {
        let star = SmallGraph::from_edges(5, [(0, 1), (0, 2), (0, 3), (0, 4)]).expect("star");
        assert!(star.is_tree());
        assert_eq!(spanning_tree_count(&star), 1);
    }

    #[rstest]
    #[case::empty(SmallGraph::new(0).expect("order 0"), 1)]
    #[case::single(SmallGraph::new(1).expect("order 1"), 1)]
    #[case::disconnected(SmallGraph::from_edges(4, [(0, 1), (2, 3)]).expect("edges"), 0)]
    fn degenerate_orders(#[case] graph: SmallGraph, #[case] expected: u64) {
        assert_eq!(spanning_tree_count(&graph), expected);
    }
}
