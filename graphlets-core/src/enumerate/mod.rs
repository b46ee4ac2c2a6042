//! Exhaustive enumeration of connected induced subgraphs of a fixed size.
//!
//! The search keeps an explicit stack of frames, so depth is bounded by the
//! motif size rather than the host graph. Every frame owns the vertex it
//! added, its extension candidates, and the vertices it forbade; popping a
//! frame undoes exactly those changes to the shared state.

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::{
    cancel::CancellationToken,
    error::{GraphletError, Result},
    graphlet::Graphlet,
    host::{HostGraph, check_vertex},
};

/// Where the enumeration roots its searches.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EnumerationMode {
    /// Root a search at every host vertex in turn.
    Global,
    /// Only motifs containing this vertex.
    Anchored(usize),
}

#[derive(Debug)]
struct Frame {
    vertex: usize,
    candidates: Vec<usize>,
    cursor: usize,
    forbidden_here: Vec<usize>,
    expanded: bool,
}

impl Frame {
    const fn new(vertex: usize, candidates: Vec<usize>) -> Self {
        Self {
            vertex,
            candidates,
            cursor: 0,
            forbidden_here: Vec::new(),
            expanded: false,
        }
    }
}

/// Yields every connected induced subgraph of `size` vertices exactly once.
///
/// # Examples
/// ```
/// use graphlets_core::{SubgraphEnumerator, generators};
///
/// let host = generators::cycle(10).expect("cycle");
/// let motifs: Vec<_> = SubgraphEnumerator::global(host, 3)?.collect();
/// assert_eq!(motifs.len(), 10);
/// assert!(motifs.iter().all(|motif| motif.is_connected()));
/// # Ok::<(), graphlets_core::GraphletError>(())
/// ```
pub struct SubgraphEnumerator<G> {
    graph: G,
    size: usize,
    mode: EnumerationMode,
    next_root: usize,
    stack: Vec<Frame>,
    motif: Vec<usize>,
    forbidden: Vec<bool>,
    emitted: u64,
    cancel: Option<CancellationToken>,
    cancelled: bool,
}

impl<G: HostGraph> SubgraphEnumerator<G> {
    /// Enumerates motifs rooted at every host vertex.
    ///
    /// # Errors
    /// Returns [`GraphletError::InvalidSize`] when `size` is zero.
    pub fn global(graph: G, size: usize) -> Result<Self> {
        Self::new(graph, size, EnumerationMode::Global)
    }

    /// Enumerates only motifs containing `vertex`.
    ///
    /// # Errors
    /// Returns [`GraphletError::InvalidSize`] when `size` is zero and
    /// [`GraphletError::VertexOutOfRange`] for unknown vertices.
    pub fn anchored(graph: G, vertex: usize, size: usize) -> Result<Self> {
        Self::new(graph, size, EnumerationMode::Anchored(vertex))
    }

    /// Creates an enumerator in the given mode.
    ///
    /// # Errors
    /// See [`Self::global`] and [`Self::anchored`].
    #[instrument(name = "enumerate.new", err, skip(graph), fields(vertices = graph.num_vertices()))]
    pub fn new(graph: G, size: usize, mode: EnumerationMode) -> Result<Self> {
        if size == 0 {
            return Err(GraphletError::InvalidSize {
                size,
                min: 1,
                max: usize::MAX,
            });
        }
        let vertices = graph.num_vertices();
        let mut enumerator = Self {
            graph,
            size,
            mode,
            next_root: 0,
            stack: Vec::with_capacity(size),
            motif: Vec::with_capacity(size),
            forbidden: vec![false; vertices],
            emitted: 0,
            cancel: None,
            cancelled: false,
        };
        if let EnumerationMode::Anchored(root) = mode {
            check_vertex(root, vertices)?;
            enumerator.push_root(root);
        }
        Ok(enumerator)
    }

    /// Stops the enumeration once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Motif size.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Number of motifs produced so far.
    #[must_use]
    pub const fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Whether iteration ended because of a cancellation request.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    fn push_root(&mut self, root: usize) {
        self.forbidden[root] = true;
        self.stack.push(Frame::new(root, Vec::new()));
    }

    fn advance_root(&mut self) -> bool {
        if self.mode != EnumerationMode::Global || self.next_root >= self.graph.num_vertices() {
            return false;
        }
        let root = self.next_root;
        self.next_root += 1;
        // Roots stay forbidden so later roots never rediscover their motifs.
        self.push_root(root);
        true
    }

    fn observe_cancellation(&mut self) -> bool {
        if self
            .cancel
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
        {
            if !self.cancelled {
                debug!(emitted = self.emitted, "enumeration cancelled");
            }
            self.cancelled = true;
            self.stack.clear();
            self.motif.clear();
        }
        self.cancelled
    }

    /// Produces the next motif, or `None` when every root is exhausted.
    pub fn next_graphlet(&mut self) -> Option<Graphlet<G>> {
        loop {
            if self.observe_cancellation() {
                return None;
            }
            let Some(frame) = self.stack.last_mut() else {
                if self.advance_root() {
                    continue;
                }
                return None;
            };

            if !frame.expanded {
                frame.expanded = true;
                self.motif.push(frame.vertex);
                if self.motif.len() == self.size {
                    let motif =
                        Graphlet::from_vertices(self.graph.copy(), self.motif.iter().copied());
                    self.motif.pop();
                    self.stack.pop();
                    self.emitted += 1;
                    // Motif members come from the host graph, so the build cannot fail.
                    return motif.ok();
                }
                let mut known: HashSet<usize> = frame.candidates.iter().copied().collect();
                for succ in self.graph.successors(frame.vertex) {
                    if !self.forbidden[succ] && known.insert(succ) {
                        frame.candidates.push(succ);
                    }
                }
            }

            if let Some(&candidate) = frame.candidates.get(frame.cursor) {
                frame.cursor += 1;
                self.forbidden[candidate] = true;
                frame.forbidden_here.push(candidate);
                let remaining = frame.candidates[frame.cursor..].to_vec();
                self.stack.push(Frame::new(candidate, remaining));
            } else {
                for vertex in frame.forbidden_here.drain(..) {
                    self.forbidden[vertex] = false;
                }
                self.motif.pop();
                self.stack.pop();
            }
        }
    }
}

impl<G: HostGraph> Iterator for SubgraphEnumerator<G> {
    type Item = Graphlet<G>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_graphlet()
    }
}
