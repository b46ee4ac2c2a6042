//! Live induced-subgraph views over a host graph.
//!
//! A [`Graphlet`] owns a cheap copy of the host graph plus its vertex set and
//! supports one-vertex mutations. The frontier (non-member neighbours) is
//! cached and dropped on every mutation.

use std::{
    cell::OnceCell,
    collections::{BTreeMap, BTreeSet, VecDeque},
    fmt,
};

use crate::{
    error::Result,
    host::{HostGraph, check_vertex},
    small_graph::SmallGraph,
};

/// Connected-or-not vertex subset of a host graph.
///
/// # Examples
/// ```
/// use graphlets_core::{Graphlet, generators};
///
/// let host = generators::path(5).expect("path");
/// let mut graphlet = Graphlet::from_vertices(host, [1, 2, 3])?;
/// assert!(graphlet.is_connected());
/// assert_eq!(graphlet.frontier().iter().copied().collect::<Vec<_>>(), vec![0, 4]);
/// assert_eq!(graphlet.removable_vertices(), vec![1, 3]);
/// graphlet.remove(2);
/// assert!(!graphlet.is_connected());
/// # Ok::<(), graphlets_core::GraphletError>(())
/// ```
#[derive(Clone)]
pub struct Graphlet<G> {
    graph: G,
    vertices: BTreeSet<usize>,
    frontier: OnceCell<BTreeSet<usize>>,
}

impl<G: HostGraph> Graphlet<G> {
    /// Empty graphlet over `graph`.
    #[must_use]
    pub const fn new(graph: G) -> Self {
        Self {
            graph,
            vertices: BTreeSet::new(),
            frontier: OnceCell::new(),
        }
    }

    /// Graphlet holding `vertices`.
    ///
    /// # Errors
    /// Returns [`crate::GraphletError::VertexOutOfRange`] for unknown vertices.
    pub fn from_vertices(graph: G, vertices: impl IntoIterator<Item = usize>) -> Result<Self> {
        let mut graphlet = Self::new(graph);
        for vertex in vertices {
            graphlet.add(vertex)?;
        }
        Ok(graphlet)
    }

    /// Adds `vertex`; returns `false` when it was already a member.
    ///
    /// # Errors
    /// Returns [`crate::GraphletError::VertexOutOfRange`] for unknown vertices.
    pub fn add(&mut self, vertex: usize) -> Result<bool> {
        check_vertex(vertex, self.graph.num_vertices())?;
        let inserted = self.vertices.insert(vertex);
        if inserted {
            self.frontier.take();
        }
        Ok(inserted)
    }

    /// Removes `vertex`; returns `false` when it was not a member.
    pub fn remove(&mut self, vertex: usize) -> bool {
        let removed = self.vertices.remove(&vertex);
        if removed {
            self.frontier.take();
        }
        removed
    }

    /// Replaces `out` with `into` in one step.
    ///
    /// # Errors
    /// Returns [`crate::GraphletError::VertexOutOfRange`] when `into` is unknown.
    pub fn swap(&mut self, out: usize, into: usize) -> Result<()> {
        check_vertex(into, self.graph.num_vertices())?;
        self.remove(out);
        self.add(into)?;
        Ok(())
    }

    /// Host graph this graphlet lives in.
    pub const fn graph(&self) -> &G {
        &self.graph
    }

    /// Number of member vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the graphlet has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Whether `vertex` is a member.
    #[must_use]
    pub fn contains(&self, vertex: usize) -> bool {
        self.vertices.contains(&vertex)
    }

    /// Member vertices in increasing order.
    pub fn vertices(&self) -> impl Iterator<Item = usize> + '_ {
        self.vertices.iter().copied()
    }

    /// Member vertex set.
    #[must_use]
    pub const fn vertex_set(&self) -> &BTreeSet<usize> {
        &self.vertices
    }

    /// Host vertices adjacent to a member but not members themselves.
    pub fn frontier(&self) -> &BTreeSet<usize> {
        self.frontier.get_or_init(|| {
            self.vertices
                .iter()
                .flat_map(|&vertex| self.graph.successors(vertex))
                .filter(|succ| !self.vertices.contains(succ))
                .collect()
        })
    }

    /// Whether the members induce a connected subgraph.
    ///
    /// The empty graphlet is not connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.components_without(None).len() == 1
    }

    /// Members whose removal leaves the rest connected.
    #[must_use]
    pub fn removable_vertices(&self) -> Vec<usize> {
        self.vertices
            .iter()
            .copied()
            .filter(|&vertex| self.components_without(Some(vertex)).len() == 1)
            .collect()
    }

    /// Connected components of the members minus `excluded`.
    #[must_use]
    pub fn components_without(&self, excluded: Option<usize>) -> Vec<BTreeSet<usize>> {
        let mut unvisited: BTreeSet<usize> = self
            .vertices
            .iter()
            .copied()
            .filter(|&vertex| Some(vertex) != excluded)
            .collect();
        let mut components = Vec::new();
        while let Some(start) = unvisited.pop_first() {
            let mut component = BTreeSet::from([start]);
            let mut queue = VecDeque::from([start]);
            while let Some(vertex) = queue.pop_front() {
                for succ in self.graph.successors(vertex) {
                    if unvisited.remove(&succ) {
                        component.insert(succ);
                        queue.push_back(succ);
                    }
                }
            }
            components.push(component);
        }
        components
    }

    /// Non-members that can replace `vertex` while keeping the graphlet
    /// connected.
    ///
    /// A replacement must be adjacent to every component left after removing
    /// `vertex`, so cut vertices may still have replacements. Non-members and
    /// single-vertex graphlets have none.
    #[must_use]
    pub fn replacements_for(&self, vertex: usize) -> BTreeSet<usize> {
        if !self.contains(vertex) {
            return BTreeSet::new();
        }
        let mut components = self.components_without(Some(vertex)).into_iter();
        let Some(first) = components.next() else {
            return BTreeSet::new();
        };
        let mut candidates = self.outside_neighbours(&first, vertex);
        for component in components {
            if candidates.is_empty() {
                break;
            }
            let reachable = self.outside_neighbours(&component, vertex);
            candidates.retain(|candidate| reachable.contains(candidate));
        }
        candidates
    }

    fn outside_neighbours(&self, component: &BTreeSet<usize>, removed: usize) -> BTreeSet<usize> {
        component
            .iter()
            .flat_map(|&member| self.graph.successors(member))
            .filter(|&succ| succ != removed && !self.vertices.contains(&succ))
            .collect()
    }

    /// For each removable member, the non-members that can replace it.
    ///
    /// Members without any replacement are omitted.
    #[must_use]
    pub fn switchable_vertices(&self) -> BTreeMap<usize, BTreeSet<usize>> {
        self.removable_vertices()
            .into_iter()
            .filter_map(|vertex| {
                let replacements = self.replacements_for(vertex);
                (!replacements.is_empty()).then_some((vertex, replacements))
            })
            .collect()
    }

    /// Induced subgraph relabeled to `0..len` in increasing vertex order.
    ///
    /// # Errors
    /// Returns [`crate::GraphletError::InvalidSize`] when the graphlet has
    /// more than [`crate::small_graph::MAX_ORDER`] members.
    pub fn to_small_graph(&self) -> Result<SmallGraph> {
        let members: Vec<usize> = self.vertices.iter().copied().collect();
        let mut small = SmallGraph::new(members.len())?;
        for (left_index, &left) in members.iter().enumerate() {
            for (right_index, &right) in members.iter().enumerate().skip(left_index + 1) {
                if self.graph.has_arc(left, right) || self.graph.has_arc(right, left) {
                    small.add_edge(left_index, right_index);
                }
            }
        }
        Ok(small)
    }
}

impl<G> PartialEq for Graphlet<G> {
    fn eq(&self, other: &Self) -> bool {
        self.vertices == other.vertices
    }
}

impl<G> Eq for Graphlet<G> {}

impl<G> fmt::Debug for Graphlet<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graphlet")
            .field("vertices", &self.vertices)
            .finish_non_exhaustive()
    }
}

impl<G> fmt::Display for Graphlet<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for vertex in &self.vertices {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{vertex}")?;
            first = false;
        }
        Ok(())
    }
}
