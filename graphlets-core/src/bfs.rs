//! Breadth-first search over host graphs.
//!
//! [`capped_bfs`] seeds walk states; [`parallel_visit`] runs one capped search
//! per source over a worker pool.

use std::{
    collections::{HashSet, VecDeque},
    num::NonZeroUsize,
};

use tracing::{debug, instrument};

use crate::{
    error::Result,
    host::{HostGraph, check_vertex},
    workers::{WorkCursor, build_pool},
};

/// Vertices reached from `source` in visit order, stopping after `cap`.
///
/// The source itself is the first entry. A `cap` of zero yields nothing.
#[must_use]
pub fn capped_bfs<G: HostGraph>(graph: &G, source: usize, cap: usize) -> Vec<usize> {
    let mut reached = Vec::new();
    if cap == 0 || source >= graph.num_vertices() {
        return reached;
    }
    let mut seen = HashSet::from([source]);
    let mut queue = VecDeque::from([source]);
    reached.push(source);
    while let Some(vertex) = queue.pop_front() {
        for succ in graph.successors(vertex) {
            if reached.len() == cap {
                return reached;
            }
            if seen.insert(succ) {
                reached.push(succ);
                queue.push_back(succ);
            }
        }
    }
    reached
}

/// Summary of one capped search launched by [`parallel_visit`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VisitSummary {
    /// Vertex the search started from.
    pub source: usize,
    /// Number of vertices reached, including the source.
    pub reached: usize,
    /// Largest hop distance among reached vertices.
    pub eccentricity: usize,
}

fn visit_one<G: HostGraph>(graph: &G, source: usize, cap: usize) -> VisitSummary {
    let mut distance = vec![usize::MAX; graph.num_vertices()];
    let mut queue = VecDeque::from([source]);
    distance[source] = 0;
    let mut reached = 1;
    let mut eccentricity = 0;
    'search: while let Some(vertex) = queue.pop_front() {
        let next = distance[vertex] + 1;
        for succ in graph.successors(vertex) {
            if reached >= cap {
                break 'search;
            }
            if distance[succ] == usize::MAX {
                distance[succ] = next;
                eccentricity = eccentricity.max(next);
                reached += 1;
                queue.push_back(succ);
            }
        }
    }
    VisitSummary {
        source,
        reached,
        eccentricity,
    }
}

/// Runs a capped BFS from every vertex in `sources` on `threads` workers.
///
/// Workers claim sources from a shared cursor and traverse their own copy of
/// the graph. Results come back in the order of `sources`.
///
/// # Errors
/// Returns [`crate::GraphletError::VertexOutOfRange`] for an unknown source and
/// [`crate::GraphletError::ThreadPool`] when the pool cannot be built.
#[instrument(
    name = "bfs.parallel_visit",
    err,
    skip(graph, sources, threads),
    fields(sources = sources.len(), threads = threads.get()),
)]
pub fn parallel_visit<G: HostGraph>(
    graph: &G,
    sources: &[usize],
    cap: usize,
    threads: NonZeroUsize,
) -> Result<Vec<VisitSummary>> {
    let vertices = graph.num_vertices();
    for &source in sources {
        check_vertex(source, vertices)?;
    }
    let pool = build_pool(threads)?;
    let cursor = WorkCursor::new(sources.len());
    let per_worker = pool.broadcast(|_| {
        let local_graph = graph.copy();
        let mut local = Vec::new();
        while let Some(index) = cursor.claim() {
            if let Some(&source) = sources.get(index) {
                local.push((index, visit_one(&local_graph, source, cap.max(1))));
            }
        }
        local
    });
    let mut merged: Vec<(usize, VisitSummary)> = per_worker.into_iter().flatten().collect();
    merged.sort_unstable_by_key(|(index, _)| *index);
    debug!(visits = merged.len(), "parallel visit completed");
    Ok(merged.into_iter().map(|(_, summary)| summary).collect())
}
