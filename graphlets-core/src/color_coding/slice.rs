//! Dynamic-programming slices: colorful treelet counts per root vertex.

use std::collections::BTreeMap;

use rayon::ThreadPool;

use crate::{
    error::Result,
    host::HostGraph,
    treelet::{Treelet, TreeletCache, TreeletRef},
    workers::WorkCursor,
};

/// Counts keyed by treelet; ordered by interning id so that a single-worker
/// fill interns treelets in a reproducible order.
pub(super) type Counts<T> = BTreeMap<TreeletRef<T>, u128>;

/// Summary of one filled slice.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SliceStats {
    /// Treelet size of the slice.
    pub size: usize,
    /// Largest number of distinct treelets counted at a single root.
    pub max_types_per_root: usize,
    /// Largest single count.
    pub max_count: u128,
    /// Sum of all counts over all roots.
    pub total: u128,
}

/// Counts of every treelet of one size, indexed by root vertex.
#[derive(Debug)]
pub(super) struct Slice<T: Treelet> {
    size: usize,
    counts: Vec<Counts<T>>,
}

impl<T: Treelet> Slice<T> {
    pub(super) fn count(&self, vertex: usize, treelet: &TreeletRef<T>) -> u128 {
        self.counts
            .get(vertex)
            .and_then(|counts| counts.get(treelet))
            .copied()
            .unwrap_or(0)
    }

    pub(super) fn at(&self, vertex: usize) -> Option<&Counts<T>> {
        self.counts.get(vertex)
    }

    pub(super) fn vertices(&self) -> usize {
        self.counts.len()
    }

    pub(super) fn root_weight(&self, vertex: usize) -> u128 {
        self.at(vertex).map_or(0, |counts| {
            counts
                .values()
                .fold(0_u128, |acc, &count| acc.saturating_add(count))
        })
    }

    pub(super) fn stats(&self) -> SliceStats {
        let mut stats = SliceStats {
            size: self.size,
            ..SliceStats::default()
        };
        for counts in &self.counts {
            stats.max_types_per_root = stats.max_types_per_root.max(counts.len());
            for &count in counts.values() {
                stats.max_count = stats.max_count.max(count);
                stats.total = stats.total.saturating_add(count);
            }
        }
        stats
    }
}

/// Everything a slice fill reads; earlier slices are final.
pub(super) struct FillContext<'a, G, T: Treelet> {
    pub(super) graph: &'a G,
    pub(super) colors: &'a [u8],
    pub(super) cache: &'a TreeletCache<T>,
    pub(super) lower: &'a [Slice<T>],
}

impl<G: HostGraph, T: Treelet> FillContext<'_, G, T> {
    /// Fills the slice of treelets with `size` vertices.
    ///
    /// Workers claim root vertices from a shared cursor and read the host
    /// through their own graph copy.
    pub(super) fn fill(&self, size: usize, pool: &ThreadPool) -> Result<Slice<T>> {
        let vertices = self.graph.num_vertices();
        let cursor = WorkCursor::new(vertices);
        let claimed = pool.broadcast(|_| -> Result<Vec<(usize, Counts<T>)>> {
            let graph = self.graph.copy();
            let mut local = Vec::new();
            while let Some(vertex) = cursor.claim() {
                local.push((vertex, self.fill_vertex(&graph, vertex, size)?));
            }
            Ok(local)
        });

        let mut counts: Vec<Counts<T>> = (0..vertices).map(|_| BTreeMap::new()).collect();
        for batch in claimed {
            for (vertex, vertex_counts) in batch? {
                counts[vertex] = vertex_counts;
            }
        }
        Ok(Slice { size, counts })
    }

    fn fill_vertex(&self, graph: &G, vertex: usize, size: usize) -> Result<Counts<T>> {
        if size == 1 {
            let singleton = self.cache.singleton(self.colors[vertex])?;
            return Ok(BTreeMap::from([(singleton, 1)]));
        }
        let mut counts = Counts::<T>::new();
        for neighbour in graph.successors(vertex) {
            for master_size in 1..size {
                let other_size = size - master_size;
                let (Some(masters), Some(others)) = (
                    self.lower[master_size - 1].at(vertex),
                    self.lower[other_size - 1].at(neighbour),
                ) else {
                    continue;
                };
                for (master, &master_count) in masters {
                    for (other, &other_count) in others {
                        if !master.is_mergeable(other) {
                            continue;
                        }
                        let merged = self.cache.merge_treelets(master, other)?;
                        let slot = counts.entry(merged).or_insert(0);
                        *slot = slot.saturating_add(master_count.saturating_mul(other_count));
                    }
                }
            }
        }
        // Interchangeable last children were attached in every order.
        for (treelet, count) in &mut counts {
            *count /= u128::from(treelet.multiplicity().max(1));
        }
        Ok(counts)
    }
}
