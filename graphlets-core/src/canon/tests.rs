//! Tests for eager and lazy canonicalization.

use proptest::{prelude::*, sample::subsequence};
use rstest::rstest;

use super::{
    Canonicalizer, EagerCanonicalizer, LazyCanonicalizer, Signature, permutation::for_each_permutation,
};
use crate::{error::GraphletError, small_graph::SmallGraph};

#[rstest]
#[case(1, 1)]
#[case(2, 1)]
#[case(3, 2)]
#[case(4, 6)]
#[case(5, 21)]
#[case(6, 112)]
#[case(7, 853)]
fn eager_class_counts_match_connected_graph_counts(#[case] order: usize, #[case] classes: usize) {
    let canon = EagerCanonicalizer::new(order).expect("order is supported");
    assert_eq!(canon.class_count(), classes);
}

#[rstest]
#[case(3)]
#[case(4)]
#[case(5)]
fn eager_and_lazy_agree_on_every_connected_pattern(#[case] order: usize) {
    let eager = EagerCanonicalizer::new(order).expect("order is supported");
    let lazy = LazyCanonicalizer::new(order);
    let bits = super::bits_per_graph(order);
    for packed in 0..(1_u64 << bits) {
        let pattern = Signature::from_u64(order, packed).expect("pattern fits");
        let graph = SmallGraph::from_pattern(&pattern).expect("pattern decodes");
        if !graph.is_connected() {
            continue;
        }
        assert_eq!(
            eager.canonical_pattern(&pattern).expect("connected pattern"),
            lazy.canonical_pattern(&pattern).expect("lazy never fails"),
            "pattern {packed:#b}"
        );
    }
}

#[test]
fn representatives_are_minimal_within_their_class() {
    let eager = EagerCanonicalizer::new(4).expect("order 4 is supported");
    for &representative in eager.representatives() {
        assert_eq!(eager.lookup(representative).expect("known"), representative);
    }
    let mut sorted = eager.representatives().to_vec();
    sorted.sort_unstable();
    assert_eq!(sorted, eager.representatives());
}

#[test]
fn eager_rejects_disconnected_patterns() {
    let eager = EagerCanonicalizer::new(3).expect("order 3 is supported");
    let lonely_edge = Signature::from_u64(3, 0b001).expect("fits");
    let err = eager
        .canonical_pattern(&lonely_edge)
        .expect_err("an edge plus an isolated vertex is disconnected");
    assert!(matches!(err, GraphletError::DisconnectedPattern { order: 3, .. }));
}

#[rstest]
#[case(0)]
#[case(8)]
fn eager_rejects_unsupported_orders(#[case] order: usize) {
    let err = EagerCanonicalizer::new(order).expect_err("order is unsupported");
    assert!(matches!(err, GraphletError::InvalidSize { .. }));
}

#[test]
fn order_mismatch_is_reported() {
    let lazy = LazyCanonicalizer::new(4);
    let triangle = SmallGraph::from_edges(3, [(0, 1), (1, 2), (0, 2)]).expect("edges");
    let err = lazy.signature(&triangle).expect_err("order differs");
    assert_eq!(
        err,
        GraphletError::OrderMismatch {
            expected: 4,
            actual: 3
        }
    );
}

#[test]
fn long_signature_rejects_orders_above_eleven() {
    let lazy = LazyCanonicalizer::new(12);
    let path = SmallGraph::from_edges(12, (1..12).map(|v| (v - 1, v))).expect("edges");
    let err = lazy.long_signature(&path).expect_err("66 bits do not fit");
    assert!(matches!(err, GraphletError::SignatureTooWide { bits: 66, .. }));
}

#[test]
fn lazy_memoizes_every_visited_variant() {
    let lazy = LazyCanonicalizer::new(3);
    let path = SmallGraph::from_edges(3, [(0, 1), (1, 2)]).expect("edges");
    lazy.signature(&path).expect("path canonicalizes");
    assert_eq!(lazy.memoized(), 3);
    let triangle = SmallGraph::from_edges(3, [(0, 1), (1, 2), (0, 2)]).expect("edges");
    lazy.signature(&triangle).expect("triangle canonicalizes");
    assert_eq!(lazy.memoized(), 4);
}

#[test]
fn lazy_is_consistent_under_concurrent_first_queries() {
    let lazy = LazyCanonicalizer::new(5);
    let cycle = SmallGraph::from_edges(5, [(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]).expect("edges");
    let results: Vec<Signature> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| lazy.signature(&cycle).expect("cycle canonicalizes")))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("worker must not panic"))
            .collect()
    });
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
}

fn small_graph_strategy() -> impl Strategy<Value = SmallGraph> {
    (2_usize..=5).prop_flat_map(|order| {
        let pairs: Vec<(usize, usize)> = (1..order)
            .flat_map(|u| (0..u).map(move |v| (u, v)))
            .collect();
        let count = pairs.len();
        subsequence(pairs, 0..=count).prop_map(move |edges| {
            SmallGraph::from_edges(order, edges).expect("generated edges are valid")
        })
    })
}

proptest! {
    #[test]
    fn lazy_signature_is_invariant_under_relabeling(graph in small_graph_strategy()) {
        let lazy = LazyCanonicalizer::new(graph.order());
        let expected = lazy.signature(&graph).expect("canonicalizes");
        let mut failures = Vec::new();
        for_each_permutation(graph.order(), |permutation| {
            let moved = graph.relabeled(permutation).expect("valid permutation");
            let fresh = LazyCanonicalizer::new(graph.order());
            if fresh.signature(&moved).ok() != Some(expected.clone()) {
                failures.push(permutation.to_vec());
            }
        });
        prop_assert!(failures.is_empty(), "relabelings changed the class: {:?}", failures);
    }

    #[test]
    fn canonical_pattern_preserves_edge_count(graph in small_graph_strategy()) {
        let lazy = LazyCanonicalizer::new(graph.order());
        let canonical = lazy.signature(&graph).expect("canonicalizes");
        prop_assert_eq!(canonical.edge_count(), graph.edge_count());
    }
}
