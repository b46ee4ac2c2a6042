//! Counting and sampling tests for both treelet flavors.

use std::{collections::BTreeSet, num::NonZeroUsize};

use rand::{SeedableRng, rngs::SmallRng};
use rstest::rstest;

use super::{ColorCoding, ColorCodingEngine, ColoredColorCoding, OccurrenceSampler, SetColoredColorCoding};
use crate::{
    AdjacencyGraph, Graphlet, SequentialGraph,
    error::GraphletError,
    host::{HostGraph, generators},
    spanning::spanning_tree_count,
    treelet::Treelet,
};

fn threads(count: usize) -> NonZeroUsize {
    NonZeroUsize::new(count).expect("non-zero thread count")
}

fn filled<T: Treelet>(host: AdjacencyGraph, size: usize, colors: Vec<u8>, workers: usize) -> ColorCoding<AdjacencyGraph, T> {
    let mut engine = ColorCoding::<_, T>::new(host, size).expect("valid engine");
    engine.with_coloring(colors).expect("valid coloring");
    engine.run(threads(workers)).expect("fill succeeds");
    engine
}

#[test]
fn rejects_hosts_without_random_access() {
    let host = SequentialGraph::new(generators::path(4).expect("path"));
    let err = ColoredColorCoding::new(host, 3).expect_err("sequential hosts are unsupported");
    assert_eq!(err, GraphletError::RandomAccessUnsupported);
}

#[rstest]
#[case(0)]
#[case(33)]
fn rejects_unsupported_sizes(#[case] size: usize) {
    let host = generators::path(4).expect("path");
    let err = SetColoredColorCoding::new(host, size).expect_err("size is unsupported");
    assert!(matches!(err, GraphletError::InvalidSize { .. }));
}

#[test]
fn stages_must_run_in_order() {
    let host = generators::cycle(5).expect("cycle");
    let mut engine = ColoredColorCoding::new(host, 3).expect("valid engine");
    let err = engine.run(threads(1)).expect_err("no coloring yet");
    assert!(matches!(err, GraphletError::NotReady { stage: "color", .. }));

    engine.color(&mut SmallRng::seed_from_u64(1));
    let err = engine.build_structures().expect_err("no tables yet");
    assert!(matches!(err, GraphletError::NotReady { stage: "run", .. }));

    engine.run(threads(1)).expect("fill succeeds");
    let err = engine.new_sampler(3, 0).expect_err("no structures yet");
    assert!(matches!(err, GraphletError::NotReady { stage: "build_structures", .. }));
}

#[rstest]
#[case::short(vec![0, 1, 2])]
#[case::out_of_palette(vec![0, 1, 2, 3])]
fn rejects_mismatched_colorings(#[case] colors: Vec<u8>) {
    let host = generators::path(4).expect("path");
    let mut engine = ColoredColorCoding::new(host, 3).expect("valid engine");
    let err = engine.with_coloring(colors).expect_err("coloring does not fit");
    assert!(matches!(err, GraphletError::InvalidColoring { .. }));
    assert!(engine.colors().is_none());
}

#[test]
fn random_coloring_stays_in_palette() {
    let host = generators::erdos_renyi(50, 100, 2).expect("valid parameters");
    let mut engine = SetColoredColorCoding::new(host, 4).expect("valid engine");
    engine.color(&mut SmallRng::seed_from_u64(9));
    let colors = engine.colors().expect("colored");
    assert_eq!(colors.len(), 50);
    assert!(colors.iter().all(|&color| color < 4));
}

#[test]
fn colorful_path_is_counted_once_per_root() {
    let host = generators::path(3).expect("path");
    let colored = filled::<crate::ColoredTreelet>(host.copy(), 3, vec![0, 1, 2], 1);
    let set_colored = filled::<crate::SetColoredTreelet>(host, 3, vec![0, 1, 2], 1);
    for vertex in 0..3 {
        assert_eq!(colored.root_weight(3, vertex), 1);
        assert_eq!(set_colored.root_weight(3, vertex), 1);
    }
    let stats = set_colored.slice_stats(3).expect("slice 3 is filled");
    assert_eq!(stats.total, 3);
    assert_eq!(stats.max_types_per_root, 1);
}

#[test]
fn triangle_has_three_rooted_spanning_trees_per_vertex() {
    let host = generators::clique(3).expect("triangle");
    let colored = filled::<crate::ColoredTreelet>(host.copy(), 3, vec![0, 1, 2], 1);
    let set_colored = filled::<crate::SetColoredTreelet>(host, 3, vec![0, 1, 2], 1);
    for vertex in 0..3 {
        assert_eq!(colored.root_weight(3, vertex), 3);
        assert_eq!(set_colored.root_weight(3, vertex), 3);
    }
    assert_eq!(colored.slice_stats(3).expect("filled").max_types_per_root, 3);
    assert_eq!(set_colored.slice_stats(3).expect("filled").max_types_per_root, 2);
}

#[test]
fn repeated_colors_are_never_colorful() {
    let host = generators::path(3).expect("path");
    let engine = filled::<crate::ColoredTreelet>(host, 3, vec![0, 1, 0], 1);
    assert_eq!(engine.slice_stats(3).expect("filled").total, 0);
}

#[rstest]
#[case(3)]
#[case(4)]
#[case(5)]
fn flavors_agree_on_colorful_tree_totals(#[case] size: usize) {
    let host = generators::erdos_renyi(30, 70, 4).expect("valid parameters");
    let mut rng = SmallRng::seed_from_u64(21);
    let mut colored = ColoredColorCoding::new(host.copy(), size).expect("valid engine");
    colored.color(&mut rng);
    let colors = colored.colors().expect("colored").to_vec();
    colored.run(threads(1)).expect("fill succeeds");
    let set_colored = filled::<crate::SetColoredTreelet>(host, size, colors, 1);
    for vertex in 0..30 {
        assert_eq!(
            colored.root_weight(size, vertex),
            set_colored.root_weight(size, vertex),
            "vertex {vertex}"
        );
    }
}

#[test]
fn parallel_fill_matches_sequential_fill() {
    let host = generators::erdos_renyi(60, 150, 8).expect("valid parameters");
    let mut rng = SmallRng::seed_from_u64(5);
    let mut sequential = SetColoredColorCoding::new(host.copy(), 4).expect("valid engine");
    sequential.color(&mut rng);
    let colors = sequential.colors().expect("colored").to_vec();
    sequential.run(threads(1)).expect("fill succeeds");
    let parallel = filled::<crate::SetColoredTreelet>(host, 4, colors, 4);
    for size in 1..=4 {
        assert_eq!(sequential.slice_stats(size), parallel.slice_stats(size));
        for vertex in 0..60 {
            assert_eq!(
                sequential.root_weight(size, vertex),
                parallel.root_weight(size, vertex)
            );
        }
    }
}

fn assert_valid_samples<E: ColorCodingEngine>(engine: &E, size: usize) {
    let mut sampler = engine.new_sampler(size, 99).expect("occurrences exist");
    for _ in 0..200 {
        let occurrence = sampler.sample().expect("sample");
        assert_eq!(occurrence.len(), size);
        let distinct: BTreeSet<usize> = occurrence.iter().copied().collect();
        assert_eq!(distinct.len(), size);
        let graphlet =
            Graphlet::from_vertices(sampler.graph().copy(), occurrence).expect("host vertices");
        assert!(graphlet.is_connected());
        let small = graphlet.to_small_graph().expect("fits");
        let trees = spanning_tree_count(&small);
        assert!(trees >= 1);
        assert_eq!(trees == 1, small.is_tree());
    }
}

#[rstest]
#[case(3)]
#[case(4)]
#[case(5)]
fn samples_are_connected_colorful_occurrences(#[case] size: usize) {
    let host = generators::erdos_renyi(40, 120, 13).expect("valid parameters");
    let mut rng = SmallRng::seed_from_u64(17);

    let mut colored = ColoredColorCoding::new(host.copy(), size).expect("valid engine");
    ColorCodingEngine::color(&mut colored, &mut rng);
    ColorCodingEngine::run(&mut colored, threads(2)).expect("fill succeeds");
    ColorCodingEngine::build_structures(&mut colored).expect("structures");
    assert_valid_samples(&colored, size);

    let mut set_colored = SetColoredColorCoding::new(host, size).expect("valid engine");
    set_colored.color(&mut rng);
    set_colored.run(threads(2)).expect("fill succeeds");
    set_colored.build_structures().expect("structures");
    assert_valid_samples(&set_colored, size);
}

#[test]
fn sampled_vertices_carry_distinct_colors() {
    let host = generators::clique(8).expect("clique");
    let colors = vec![0, 1, 2, 3, 0, 1, 2, 3];
    let mut engine = filled::<crate::ColoredTreelet>(host, 4, colors.clone(), 2);
    engine.build_structures_for(4).expect("structures");
    let mut sampler = engine.new_sampler(4, 3).expect("occurrences exist");
    for _ in 0..100 {
        let occurrence = sampler.sample_occurrence().expect("sample");
        let palette: BTreeSet<u8> = occurrence.iter().map(|&vertex| colors[vertex]).collect();
        assert_eq!(palette.len(), 4);
    }
}

#[test]
fn empty_top_slice_reports_no_occurrence() {
    let host = generators::path(3).expect("path");
    let mut engine = filled::<crate::SetColoredTreelet>(host, 3, vec![0, 0, 0], 1);
    engine.build_structures().expect("structures build even when empty");
    let err = engine.new_sampler(3, 1).expect_err("no colorful occurrence");
    assert_eq!(err, GraphletError::NoColorfulOccurrence { size: 3 });
}
