//! Merge, interning, and split behaviour of both treelet flavors.

use std::collections::BTreeSet;

use rstest::rstest;

use super::{ColorSet, ColoredTreelet, SetColoredTreelet, Treelet, TreeletCache, TreeletRef};
use crate::error::GraphletError;

#[test]
fn color_sets_track_membership() {
    let set = ColorSet::singleton(3).union(ColorSet::singleton(5));
    assert_eq!(set.len(), 2);
    assert!(set.contains(3) && set.contains(5) && !set.contains(4));
    assert!(set.is_disjoint(ColorSet::singleton(4)));
    assert!(!set.is_disjoint(ColorSet::singleton(5)));
    assert!(ColorSet::singleton(40).is_empty());
}

#[rstest]
#[case(0)]
#[case(33)]
fn rejects_palettes_outside_range(#[case] colors: usize) {
    let err = TreeletCache::<ColoredTreelet>::new(colors).expect_err("palette is invalid");
    assert!(matches!(err, GraphletError::InvalidSize { .. }));
}

#[test]
fn singleton_lookup_checks_palette() {
    let cache = TreeletCache::<SetColoredTreelet>::new(3).expect("palette");
    assert_eq!(cache.palette(), 3);
    assert_eq!(cache.len(), 3);
    let err = cache.singleton(5).expect_err("color 5 is outside the palette");
    assert!(matches!(err, GraphletError::InvalidColoring { .. }));
}

#[test]
fn colored_children_follow_increasing_root_color() {
    let cache = TreeletCache::<ColoredTreelet>::new(3).expect("palette");
    let [c0, c1, c2] = [0, 1, 2].map(|color| cache.singleton(color).expect("in palette"));
    let with_one = cache.merge_treelets(&c0, &c1).expect("disjoint colors");
    let with_two = cache.merge_treelets(&c0, &c2).expect("disjoint colors");

    let star = cache.merge_treelets(&with_one, &c2).expect("2 > 1");
    assert_eq!(star.size(), 3);
    assert_eq!(star.root_color(), 0);
    assert_eq!(star.multiplicity(), 1);
    assert!(!with_two.is_mergeable(&c1));
    let err = cache
        .merge_treelets(&with_two, &c1)
        .expect_err("1 < 2 breaks the child order");
    assert!(matches!(err, GraphletError::InvalidParameter { .. }));
}

#[test]
fn overlapping_colors_never_merge() {
    let cache = TreeletCache::<ColoredTreelet>::new(2).expect("palette");
    let c0 = cache.singleton(0).expect("in palette");
    assert!(!c0.is_mergeable(&c0));
    assert!(cache.merge_treelets(&c0, &c0).is_err());
}

#[test]
fn set_colored_twins_merge_in_any_order() {
    let cache = TreeletCache::<SetColoredTreelet>::new(3).expect("palette");
    let [c0, c1, c2] = [0, 1, 2].map(|color| cache.singleton(color).expect("in palette"));

    let left = cache.merge_treelets(&c0, &c1).expect("disjoint");
    let right = cache.merge_treelets(&c0, &c2).expect("disjoint");
    assert_ne!(left, right);

    let via_left = cache.merge_treelets(&left, &c2).expect("equal shapes may follow");
    let via_right = cache.merge_treelets(&right, &c1).expect("equal shapes may follow");
    assert_eq!(via_left, via_right);
    assert_eq!(via_left.id(), via_right.id());
    assert_eq!(via_left.multiplicity(), 2);
    assert_eq!(left.multiplicity(), 1);

    let splits = cache.split_treelet(&via_left);
    assert_eq!(splits.len(), 2);
    assert!(splits.contains(&(left.clone(), c2.clone())));
    assert!(splits.contains(&(right, c1)));
    assert!(cache.split_treelet(&c0).is_empty());
}

#[test]
fn set_colored_children_do_not_shrink() {
    let cache = TreeletCache::<SetColoredTreelet>::new(4).expect("palette");
    let [c0, c1, c2, c3] = [0, 1, 2, 3].map(|color| cache.singleton(color).expect("in palette"));
    let edge = cache.merge_treelets(&c1, &c2).expect("disjoint");

    let root_then_edge = cache.merge_treelets(&c0, &c3).expect("disjoint");
    let grown = cache
        .merge_treelets(&root_then_edge, &edge)
        .expect("larger child after a smaller one");
    assert_eq!(grown.size(), 4);
    assert_eq!(grown.multiplicity(), 1);

    let root_edge = cache.merge_treelets(&c0, &edge).expect("disjoint");
    assert!(!root_edge.is_mergeable(&c3));
}

#[test]
fn set_colored_cherry_and_rooted_path_stay_distinct() {
    let cache = TreeletCache::<SetColoredTreelet>::new(3).expect("palette");
    let [c0, c1, c2] = [0, 1, 2].map(|color| cache.singleton(color).expect("in palette"));

    let root_leaf = cache.merge_treelets(&c0, &c1).expect("disjoint");
    let cherry = cache.merge_treelets(&root_leaf, &c2).expect("equal shapes may follow");
    let tail = cache.merge_treelets(&c1, &c2).expect("disjoint");
    let rooted_path = cache.merge_treelets(&c0, &tail).expect("disjoint");

    assert_ne!(cherry, rooted_path);
    assert_ne!(cherry.shape(), rooted_path.shape());
    assert_eq!(cherry.colors(), rooted_path.colors());
    assert_eq!(cherry.multiplicity(), 2);
    assert_eq!(rooted_path.multiplicity(), 1);
    assert_eq!(cache.split_treelet(&rooted_path), vec![(c0, tail)]);
}

#[test]
fn rooted_trees_on_four_vertices_have_distinct_shapes() {
    let cache = TreeletCache::<SetColoredTreelet>::new(4).expect("palette");
    let [c0, c1, c2, c3] = [0, 1, 2, 3].map(|color| cache.singleton(color).expect("in palette"));
    let pair = |master: &TreeletRef<SetColoredTreelet>, other: &TreeletRef<SetColoredTreelet>| {
        cache.merge_treelets(master, other).expect("mergeable")
    };

    let star = pair(&pair(&pair(&c0, &c1), &c2), &c3);
    let leaf_then_edge = pair(&pair(&c0, &c1), &pair(&c2, &c3));
    let path = pair(&c0, &pair(&c1, &pair(&c2, &c3)));
    let cherry_below = pair(&c0, &pair(&pair(&c1, &c2), &c3));
    let shapes = BTreeSet::from([
        star.shape(),
        leaf_then_edge.shape(),
        path.shape(),
        cherry_below.shape(),
    ]);
    assert_eq!(shapes.len(), 4);
    assert!(shapes.iter().all(|shape| shape.size() == 4));
}

#[test]
fn repeated_merges_return_the_interned_handle() {
    let cache = TreeletCache::<ColoredTreelet>::new(4).expect("palette");
    let c0 = cache.singleton(0).expect("in palette");
    let c3 = cache.singleton(3).expect("in palette");
    let first = cache.merge_treelets(&c0, &c3).expect("disjoint");
    let before = cache.len();
    let second = cache.merge_treelets(&c0, &c3).expect("disjoint");
    assert_eq!(first, second);
    assert_eq!(cache.len(), before);
    assert_eq!(cache.split_treelet(&first), vec![(c0, c3)]);
}

#[test]
fn concurrent_merges_agree_on_one_handle() {
    let cache = TreeletCache::<SetColoredTreelet>::new(6).expect("palette");
    let ids: Vec<Vec<u32>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    let root = cache.singleton(0).expect("in palette");
                    (1..6)
                        .map(|color| {
                            let leaf = cache.singleton(color).expect("in palette");
                            cache.merge_treelets(&root, &leaf).expect("disjoint").id()
                        })
                        .collect::<Vec<u32>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("worker must not panic"))
            .collect()
    });
    assert!(ids.windows(2).all(|pair| pair[0] == pair[1]));
    for (index, id) in ids[0].iter().enumerate() {
        let leaf = cache.singleton(u8::try_from(index + 1).expect("small")).expect("in palette");
        let root = cache.singleton(0).expect("in palette");
        let merged = cache.merge_treelets(&root, &leaf).expect("disjoint");
        assert_eq!(merged.id(), *id);
        assert_eq!(cache.split_treelet(&merged).len(), 1);
    }
}
