//! Vertex relabelings of small patterns.

use super::signature::{Signature, pair_index};

/// Advances `values` to the next lexicographic permutation.
///
/// Returns `false`, leaving `values` sorted ascending, after the last one.
pub(crate) fn next_permutation(values: &mut [usize]) -> bool {
    let Some(pivot) = values.windows(2).rposition(|pair| pair[0] < pair[1]) else {
        values.reverse();
        return false;
    };
    let pivot_value = values[pivot];
    let Some(successor) = values.iter().rposition(|&value| value > pivot_value) else {
        return false;
    };
    values.swap(pivot, successor);
    values[pivot + 1..].reverse();
    true
}

/// Calls `visit` once with every permutation of `0..order`, identity first.
pub(crate) fn for_each_permutation(order: usize, mut visit: impl FnMut(&[usize])) {
    let mut permutation: Vec<usize> = (0..order).collect();
    loop {
        visit(&permutation);
        if !next_permutation(&mut permutation) {
            break;
        }
    }
}

/// Pattern of the graph with edges `edges` after renaming `i` to `permutation[i]`.
pub(crate) fn permute_edges(
    order: usize,
    edges: &[(usize, usize)],
    permutation: &[usize],
) -> Signature {
    let mut relabeled = Signature::empty(order);
    for &(u, v) in edges {
        relabeled.set(pair_index(permutation[u], permutation[v]));
    }
    relabeled
}

/// For one permutation, where each pattern bit moves to.
pub(crate) fn bit_map(order: usize, permutation: &[usize]) -> Vec<u8> {
    let mut map = Vec::with_capacity(super::bits_per_graph(order));
    for u in 1..order {
        for v in 0..u {
            // pair_index is below 64 for every order the packed path serves.
            map.push(pair_index(permutation[u], permutation[v]) as u8);
        }
    }
    map
}

/// Applies a [`bit_map`] to a packed pattern.
pub(crate) fn permute_bits(pattern: u64, map: &[u8]) -> u64 {
    let mut pending = pattern;
    let mut relabeled = 0_u64;
    while pending != 0 {
        let bit = pending.trailing_zeros() as usize;
        pending &= pending - 1;
        if let Some(&target) = map.get(bit) {
            relabeled |= 1 << target;
        }
    }
    relabeled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visits_every_permutation_once() {
        let mut seen = Vec::new();
        for_each_permutation(4, |permutation| seen.push(permutation.to_vec()));
        assert_eq!(seen.len(), 24);
        assert_eq!(seen.first(), Some(&vec![0, 1, 2, 3]));
        assert_eq!(seen.last(), Some(&vec![3, 2, 1, 0]));
        let mut sorted = seen.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted, seen);
    }

    #[test]
    fn trivial_orders_have_one_permutation() {
        for order in 0..2 {
            let mut calls = 0;
            for_each_permutation(order, |_| calls += 1);
            assert_eq!(calls, 1);
        }
    }

    #[test]
    fn packed_and_wide_relabelings_agree() {
        let edges = [(1, 0), (2, 1), (3, 1)];
        let mut pattern = Signature::empty(4);
        for &(u, v) in &edges {
            pattern.set(pair_index(u, v));
        }
        let packed = pattern.as_u64().expect("six bits fit");
        for_each_permutation(4, |permutation| {
            let wide = permute_edges(4, &edges, permutation);
            let narrow = permute_bits(packed, &bit_map(4, permutation));
            assert_eq!(wide.as_u64(), Some(narrow));
        });
    }
}
