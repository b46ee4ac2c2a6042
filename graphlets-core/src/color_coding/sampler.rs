//! Uniform sampling of colorful occurrences from filled slices.

use rand::{SeedableRng, rngs::SmallRng};

use super::ColorCoding;
use crate::{
    distribution::EnumeratedDistribution,
    error::{GraphletError, Result},
    host::HostGraph,
    treelet::{Treelet, TreeletRef},
};

/// Draws motif occurrences as host vertex lists.
pub trait OccurrenceSampler {
    /// Host graph the occurrences live in.
    type Graph: HostGraph;

    /// Draws one occurrence.
    ///
    /// # Errors
    /// Fails when the tables hold no occurrence to draw.
    fn sample(&mut self) -> Result<Vec<usize>>;

    /// This sampler's own host-graph copy.
    fn graph(&self) -> &Self::Graph;
}

/// Sampler over the tables of a [`ColorCoding`] engine.
///
/// Each sampler owns its RNG and host-graph copy; the engine's tables are
/// only read.
#[derive(Debug)]
pub struct ColorCodingSampler<'a, G, T: Treelet> {
    engine: &'a ColorCoding<G, T>,
    roots: &'a EnumeratedDistribution<usize>,
    treelets: &'a [Option<EnumeratedDistribution<TreeletRef<T>>>],
    graph: G,
    size: usize,
    rng: SmallRng,
}

impl<'a, G: HostGraph, T: Treelet> ColorCodingSampler<'a, G, T> {
    pub(super) fn new(
        engine: &'a ColorCoding<G, T>,
        roots: &'a EnumeratedDistribution<usize>,
        treelets: &'a [Option<EnumeratedDistribution<TreeletRef<T>>>],
        size: usize,
        seed: u64,
    ) -> Self {
        Self {
            engine,
            roots,
            treelets,
            graph: engine.graph().copy(),
            size,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Occurrence size.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Samples a root, then a treelet rooted there, then an occurrence of it.
    ///
    /// Vertices are listed in treelet preorder.
    ///
    /// # Errors
    /// Returns [`GraphletError::NoColorfulOccurrence`] when the drawn root
    /// has no treelet to expand.
    pub fn sample_occurrence(&mut self) -> Result<Vec<usize>> {
        let root = *self.roots.sample(&mut self.rng);
        let treelet = self
            .treelets
            .get(root)
            .and_then(Option::as_ref)
            .ok_or(GraphletError::NoColorfulOccurrence { size: self.size })?
            .sample(&mut self.rng)
            .clone();
        let mut vertices = Vec::with_capacity(self.size);
        self.expand(root, &treelet, &mut vertices)?;
        Ok(vertices)
    }

    /// Picks one split of `treelet` and one neighbour of `root`, weighted by
    /// how many occurrences each choice leads to, and recurses on both halves.
    fn expand(
        &mut self,
        root: usize,
        treelet: &TreeletRef<T>,
        vertices: &mut Vec<usize>,
    ) -> Result<()> {
        if treelet.size() == 1 {
            vertices.push(root);
            return Ok(());
        }
        let splits = self.engine.cache().split_treelet(treelet);
        let mut choices = Vec::new();
        for (index, (master, other)) in splits.iter().enumerate() {
            let master_count = self.engine.count(root, master);
            if master_count == 0 {
                continue;
            }
            for neighbour in self.graph.successors(root) {
                let weight = master_count.saturating_mul(self.engine.count(neighbour, other));
                if weight > 0 {
                    choices.push(((neighbour, index), weight as f64));
                }
            }
        }
        let choice = EnumeratedDistribution::new(choices).map_err(|_| {
            GraphletError::NoColorfulOccurrence {
                size: treelet.size(),
            }
        })?;
        let &(neighbour, index) = choice.sample(&mut self.rng);
        let (master, other) = &splits[index];
        self.expand(root, master, vertices)?;
        self.expand(neighbour, other, vertices)
    }
}

impl<G: HostGraph, T: Treelet> OccurrenceSampler for ColorCodingSampler<'_, G, T> {
    type Graph = G;

    fn sample(&mut self) -> Result<Vec<usize>> {
        self.sample_occurrence()
    }

    fn graph(&self) -> &G {
        &self.graph
    }
}
