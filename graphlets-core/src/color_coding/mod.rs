//! Color coding: count colorful treelets bottom-up, then sample occurrences.
//!
//! The engine runs in stages that must happen in order:
//!
//! 1. [`ColorCoding::color`] assigns every host vertex one of `k` colors.
//! 2. [`ColorCoding::run`] fills slices `1..=k` on a worker pool. Slice `s`
//!    reads only slices below `s`, so each slice is a join barrier.
//! 3. [`ColorCoding::build_structures`] turns counts into sampling
//!    distributions.
//! 4. [`ColorCoding::new_sampler`] hands out independent samplers, each owning
//!    its RNG and host-graph copy.

mod sampler;
mod slice;

use std::{num::NonZeroUsize, sync::Arc};

use rand::{Rng, RngCore};
use tracing::{debug, info, instrument};

pub use self::{
    sampler::{ColorCodingSampler, OccurrenceSampler},
    slice::SliceStats,
};
use self::slice::{FillContext, Slice};
use crate::{
    distribution::EnumeratedDistribution,
    error::{GraphletError, Result},
    host::HostGraph,
    treelet::{ColoredTreelet, SetColoredTreelet, Treelet, TreeletCache, TreeletRef},
    workers::build_pool,
};

/// Stage-ordered operations shared by every color-coding flavor.
pub trait ColorCodingEngine: Send + Sync {
    /// Host graph the engine counts in.
    type Graph: HostGraph;
    /// Occurrence sampler borrowing the engine's tables.
    type Sampler<'a>: OccurrenceSampler<Graph = Self::Graph> + Send
    where
        Self: 'a;

    /// Motif size and palette size.
    fn size(&self) -> usize;

    /// Draws a fresh uniform coloring, discarding any previous tables.
    fn color(&mut self, rng: &mut dyn RngCore);

    /// Fills every slice.
    ///
    /// # Errors
    /// Fails when the host has not been colored or the pool cannot be built.
    fn run(&mut self, threads: NonZeroUsize) -> Result<()>;

    /// Builds sampling distributions for every slice.
    ///
    /// # Errors
    /// Fails when [`Self::run`] has not completed.
    fn build_structures(&mut self) -> Result<()>;

    /// Statistics of the filled slice of `size`, if it exists.
    fn slice_stats(&self, size: usize) -> Option<SliceStats>;

    /// Sampler for occurrences of `size` vertices seeded with `seed`.
    ///
    /// # Errors
    /// Fails when the structures for `size` are missing or hold no colorful
    /// occurrence.
    fn new_sampler(&self, size: usize, seed: u64) -> Result<Self::Sampler<'_>>;
}

/// Sampling structures of one slice.
#[derive(Debug)]
struct SliceStructures<T: Treelet> {
    roots: Option<EnumeratedDistribution<usize>>,
    treelets: Vec<Option<EnumeratedDistribution<TreeletRef<T>>>>,
}

/// Color-coding engine over host graph `G` with treelet flavor `T`.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
///
/// use graphlets_core::{ColoredColorCoding, OccurrenceSampler, generators};
///
/// let host = generators::clique(6).expect("clique");
/// let mut engine = ColoredColorCoding::new(host, 3)?;
/// engine.with_coloring(vec![0, 1, 2, 0, 1, 2])?;
/// engine.run(NonZeroUsize::MIN)?;
/// engine.build_structures()?;
/// let mut sampler = engine.new_sampler(3, 7)?;
/// let occurrence = sampler.sample()?;
/// assert_eq!(occurrence.len(), 3);
/// # Ok::<(), graphlets_core::GraphletError>(())
/// ```
#[derive(Debug)]
pub struct ColorCoding<G, T: Treelet> {
    graph: G,
    size: usize,
    colors: Option<Vec<u8>>,
    cache: Arc<TreeletCache<T>>,
    slices: Vec<Slice<T>>,
    structures: Vec<Option<SliceStructures<T>>>,
}

/// Engine keyed by colored treelets.
pub type ColoredColorCoding<G> = ColorCoding<G, ColoredTreelet>;

/// Engine keyed by shape and color set.
pub type SetColoredColorCoding<G> = ColorCoding<G, SetColoredTreelet>;

impl<G: HostGraph, T: Treelet> ColorCoding<G, T> {
    /// Engine for motifs of `size` vertices.
    ///
    /// # Errors
    /// Returns [`GraphletError::RandomAccessUnsupported`] when the host cannot
    /// be copied for concurrent readers, and [`GraphletError::InvalidSize`]
    /// unless `size` lies in `1..=MAX_COLORS`.
    pub fn new(graph: G, size: usize) -> Result<Self> {
        if !graph.supports_random_access() {
            return Err(GraphletError::RandomAccessUnsupported);
        }
        let cache = Arc::new(TreeletCache::new(size)?);
        Ok(Self {
            graph,
            size,
            colors: None,
            cache,
            slices: Vec::new(),
            structures: (0..size).map(|_| None).collect(),
        })
    }

    /// Motif size.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Host graph.
    pub const fn graph(&self) -> &G {
        &self.graph
    }

    /// Current coloring, if any.
    #[must_use]
    pub fn colors(&self) -> Option<&[u8]> {
        self.colors.as_deref()
    }

    /// Treelet cache shared by the slices and samplers.
    #[must_use]
    pub const fn cache(&self) -> &Arc<TreeletCache<T>> {
        &self.cache
    }

    /// Colors every vertex independently and uniformly with `0..size`.
    pub fn color(&mut self, rng: &mut dyn RngCore) {
        let palette = u8::try_from(self.size).unwrap_or(u8::MAX);
        let colors = (0..self.graph.num_vertices())
            .map(|_| rng.gen_range(0..palette))
            .collect();
        self.install_coloring(colors);
    }

    /// Installs a caller-chosen coloring.
    ///
    /// # Errors
    /// Returns [`GraphletError::InvalidColoring`] when the coloring does not
    /// cover every vertex or uses a color outside `0..size`.
    pub fn with_coloring(&mut self, colors: Vec<u8>) -> Result<()> {
        let vertices = self.graph.num_vertices();
        if colors.len() != vertices {
            return Err(GraphletError::InvalidColoring {
                reason: format!("{} colors for {vertices} vertices", colors.len()).into(),
            });
        }
        if let Some((vertex, color)) = colors
            .iter()
            .enumerate()
            .find(|&(_, &color)| usize::from(color) >= self.size)
        {
            return Err(GraphletError::InvalidColoring {
                reason: format!("vertex {vertex} has color {color} outside 0..{}", self.size).into(),
            });
        }
        self.install_coloring(colors);
        Ok(())
    }

    fn install_coloring(&mut self, colors: Vec<u8>) {
        self.colors = Some(colors);
        self.slices.clear();
        self.structures = (0..self.size).map(|_| None).collect();
    }

    /// Fills slices `1..=size` on `threads` workers.
    ///
    /// # Errors
    /// Returns [`GraphletError::NotReady`] before the host is colored and
    /// [`GraphletError::ThreadPool`] when the pool cannot be built.
    #[instrument(
        name = "color_coding.run",
        err,
        skip(self),
        fields(size = self.size, vertices = self.graph.num_vertices())
    )]
    pub fn run(&mut self, threads: NonZeroUsize) -> Result<()> {
        let colors = self.colors.as_deref().ok_or(GraphletError::NotReady {
            operation: "run",
            stage: "color",
        })?;
        let pool = build_pool(threads)?;
        let mut slices: Vec<Slice<T>> = Vec::with_capacity(self.size);
        for size in 1..=self.size {
            let context = FillContext {
                graph: &self.graph,
                colors,
                cache: &self.cache,
                lower: &slices,
            };
            let slice = context.fill(size, &pool)?;
            let stats = slice.stats();
            info!(
                size,
                max_types_per_root = stats.max_types_per_root,
                max_count = %stats.max_count,
                total = %stats.total,
                "slice filled"
            );
            slices.push(slice);
        }
        debug!(treelets = self.cache.len(), "treelet cache size");
        self.slices = slices;
        self.structures = (0..self.size).map(|_| None).collect();
        Ok(())
    }

    /// Statistics of the filled slice of `size`, if it exists.
    #[must_use]
    pub fn slice_stats(&self, size: usize) -> Option<SliceStats> {
        size.checked_sub(1)
            .and_then(|index| self.slices.get(index))
            .map(Slice::stats)
    }

    /// Number of colorful occurrences of `treelet` rooted at `vertex`.
    #[must_use]
    pub fn count(&self, vertex: usize, treelet: &TreeletRef<T>) -> u128 {
        treelet
            .size()
            .checked_sub(1)
            .and_then(|index| self.slices.get(index))
            .map_or(0, |slice| slice.count(vertex, treelet))
    }

    /// Total count of treelets of `size` rooted at `vertex`.
    #[must_use]
    pub fn root_weight(&self, size: usize, vertex: usize) -> u128 {
        size.checked_sub(1)
            .and_then(|index| self.slices.get(index))
            .map_or(0, |slice| slice.root_weight(vertex))
    }

    /// Builds sampling structures for every slice.
    ///
    /// # Errors
    /// See [`Self::build_structures_for`].
    pub fn build_structures(&mut self) -> Result<()> {
        for size in 1..=self.size {
            self.build_structures_for(size)?;
        }
        Ok(())
    }

    /// Builds the root distribution and per-root treelet distributions of
    /// the slice of `size`.
    ///
    /// # Errors
    /// Returns [`GraphletError::InvalidSize`] for sizes outside `1..=size` and
    /// [`GraphletError::NotReady`] before [`Self::run`].
    #[instrument(name = "color_coding.build_structures", err, skip(self))]
    pub fn build_structures_for(&mut self, size: usize) -> Result<()> {
        if size == 0 || size > self.size {
            return Err(GraphletError::InvalidSize {
                size,
                min: 1,
                max: self.size,
            });
        }
        let slice = self.slices.get(size - 1).ok_or(GraphletError::NotReady {
            operation: "build_structures",
            stage: "run",
        })?;
        let mut treelets = Vec::with_capacity(slice.vertices());
        let mut root_weights = Vec::with_capacity(slice.vertices());
        for vertex in 0..slice.vertices() {
            let entries: Vec<(TreeletRef<T>, f64)> = slice
                .at(vertex)
                .map(|counts| {
                    counts
                        .iter()
                        .filter(|&(_, &count)| count > 0)
                        .map(|(treelet, &count)| (treelet.clone(), count as f64))
                        .collect()
                })
                .unwrap_or_default();
            let weight: f64 = entries.iter().map(|(_, weight)| weight).sum();
            root_weights.push((vertex, weight));
            treelets.push(if entries.is_empty() {
                None
            } else {
                Some(EnumeratedDistribution::new(entries)?)
            });
        }
        let roots = if root_weights.iter().any(|&(_, weight)| weight > 0.0) {
            Some(EnumeratedDistribution::new(root_weights)?)
        } else {
            None
        };
        self.structures[size - 1] = Some(SliceStructures { roots, treelets });
        Ok(())
    }

    /// Sampler of occurrences with `size` vertices.
    ///
    /// # Errors
    /// Returns [`GraphletError::NotReady`] before the structures of `size`
    /// exist and [`GraphletError::NoColorfulOccurrence`] when the slice is
    /// empty.
    pub fn new_sampler(&self, size: usize, seed: u64) -> Result<ColorCodingSampler<'_, G, T>> {
        let structures = size
            .checked_sub(1)
            .and_then(|index| self.structures.get(index))
            .and_then(Option::as_ref)
            .ok_or(GraphletError::NotReady {
                operation: "new_sampler",
                stage: "build_structures",
            })?;
        let roots = structures
            .roots
            .as_ref()
            .ok_or(GraphletError::NoColorfulOccurrence { size })?;
        Ok(ColorCodingSampler::new(
            self,
            roots,
            &structures.treelets,
            size,
            seed,
        ))
    }
}

impl<G: HostGraph, T: Treelet> ColorCodingEngine for ColorCoding<G, T> {
    type Graph = G;
    type Sampler<'a>
        = ColorCodingSampler<'a, G, T>
    where
        Self: 'a;

    fn size(&self) -> usize {
        self.size
    }

    fn color(&mut self, rng: &mut dyn RngCore) {
        Self::color(self, rng);
    }

    fn run(&mut self, threads: NonZeroUsize) -> Result<()> {
        Self::run(self, threads)
    }

    fn build_structures(&mut self) -> Result<()> {
        Self::build_structures(self)
    }

    fn slice_stats(&self, size: usize) -> Option<SliceStats> {
        Self::slice_stats(self, size)
    }

    fn new_sampler(&self, size: usize, seed: u64) -> Result<Self::Sampler<'_>> {
        Self::new_sampler(self, size, seed)
    }
}

#[cfg(test)]
mod tests;
