//! Unit tests for the CSR host graph and the generators.

use rstest::rstest;

use super::{AdjacencyGraph, HostGraph, SequentialGraph, generators};
use crate::error::GraphletError;

#[test]
fn from_edges_symmetrizes_and_drops_loops() {
    let graph =
        AdjacencyGraph::from_edges(4, [(0, 1), (1, 0), (2, 2), (2, 3)]).expect("valid edges");
    assert_eq!(graph.num_vertices(), 4);
    assert_eq!(graph.num_arcs(), 4);
    assert!(graph.is_symmetric());
    assert_eq!(graph.out_degree(2), 1);
    assert!(!graph.has_arc(2, 2));
}

#[test]
fn from_edges_rejects_unknown_vertices() {
    let err = AdjacencyGraph::from_edges(2, [(0, 5)]).expect_err("vertex 5 is out of range");
    assert_eq!(
        err,
        GraphletError::VertexOutOfRange {
            vertex: 5,
            vertices: 2
        }
    );
}

#[test]
fn from_arcs_keeps_direction() {
    let graph = AdjacencyGraph::from_arcs(3, [(0, 1), (0, 1), (1, 2)]).expect("valid arcs");
    assert_eq!(graph.num_arcs(), 2);
    assert!(graph.has_arc(0, 1));
    assert!(!graph.has_arc(1, 0));
    assert!(!graph.is_symmetric());
}

#[rstest]
#[case::cycle(generators::cycle(10), 10, 20, 2)]
#[case::path(generators::path(5), 5, 8, 2)]
#[case::clique(generators::clique(5), 5, 20, 4)]
#[case::star(generators::star(6), 7, 12, 6)]
fn generators_produce_expected_shapes(
    #[case] graph: crate::Result<AdjacencyGraph>,
    #[case] vertices: usize,
    #[case] arcs: usize,
    #[case] max_degree: usize,
) {
    let graph = graph.expect("generator must succeed");
    assert_eq!(graph.num_vertices(), vertices);
    assert_eq!(graph.num_arcs(), arcs);
    assert_eq!(graph.max_degree(), max_degree);
    assert!(graph.is_symmetric());
}

#[test]
fn erdos_renyi_has_requested_edge_count() {
    let graph = generators::erdos_renyi(50, 120, 9).expect("valid parameters");
    assert_eq!(graph.num_arcs(), 240);
    assert!(graph.is_symmetric());
    let again = generators::erdos_renyi(50, 120, 9).expect("valid parameters");
    for vertex in 0..50 {
        assert!(graph.successors(vertex).eq(again.successors(vertex)));
    }
}

#[test]
fn erdos_renyi_rejects_too_many_edges() {
    let err = generators::erdos_renyi(4, 7, 0).expect_err("K4 has six edges");
    assert!(matches!(err, GraphletError::InvalidParameter { name: "edges", .. }));
}

#[test]
fn random_tree_is_connected_with_n_minus_one_edges() {
    let graph = generators::random_tree(30, 3).expect("tree must build");
    assert_eq!(graph.num_arcs(), 58);
    let reached = crate::bfs::capped_bfs(&graph, 0, usize::MAX);
    assert_eq!(reached.len(), 30);
}

#[test]
fn sequential_graph_hides_random_access() {
    let graph = SequentialGraph::new(generators::cycle(4).expect("cycle"));
    assert!(!graph.supports_random_access());
    assert_eq!(graph.copy().num_arcs(), 8);
    assert_eq!(graph.max_degree(), 2);
}
