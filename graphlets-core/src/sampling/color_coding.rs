//! Color-coding sampling with spanning-tree rejection.
//!
//! Color coding draws colorful occurrences with probability proportional to
//! their number of spanning trees. Accepting each draw with probability one
//! over that number makes accepted samples uniform over occurrences.

use std::{
    num::NonZeroUsize,
    sync::atomic::{AtomicU64, Ordering},
};

use dashmap::DashMap;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use tracing::{debug, info, instrument};

use super::{CanonicalizerKind, SignatureHistogram, record_rejections, record_samples};
use crate::{
    canon::{Canonicalizer, Signature},
    color_coding::{
        ColorCodingEngine, ColoredColorCoding, OccurrenceSampler, SetColoredColorCoding,
        SliceStats,
    },
    error::{GraphletError, Result},
    graphlet::Graphlet,
    host::HostGraph,
    rng::{mix_worker_seed, worker_rng},
    spanning::spanning_tree_count,
    treelet::MAX_COLORS,
    workers::{build_pool, default_threads},
};

/// Treelet representation used by the counting tables.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TreeletFlavor {
    /// Children ordered by root color.
    Colored,
    /// Children ordered by shape, keyed by color set.
    #[default]
    SetColored,
}

/// Configures a [`ColorCodingPipeline`].
#[derive(Clone, Debug)]
pub struct ColorCodingOptions {
    size: usize,
    samples: u64,
    threads: NonZeroUsize,
    flavor: TreeletFlavor,
    seed: u64,
    canonicalizer: CanonicalizerKind,
}

impl ColorCodingOptions {
    /// Options drawing `samples` accepted occurrences of `size` vertices.
    #[must_use]
    pub fn new(size: usize, samples: u64) -> Self {
        Self {
            size,
            samples,
            threads: default_threads(),
            flavor: TreeletFlavor::default(),
            seed: 0,
            canonicalizer: CanonicalizerKind::default(),
        }
    }

    /// Worker count for the fill and the sampling.
    #[must_use]
    pub const fn with_threads(mut self, threads: NonZeroUsize) -> Self {
        self.threads = threads;
        self
    }

    /// Treelet flavor.
    #[must_use]
    pub const fn with_flavor(mut self, flavor: TreeletFlavor) -> Self {
        self.flavor = flavor;
        self
    }

    /// Seed for the coloring and every worker's generators.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Canonicalization strategy.
    #[must_use]
    pub const fn with_canonicalizer(mut self, kind: CanonicalizerKind) -> Self {
        self.canonicalizer = kind;
        self
    }

    /// Validates the options.
    ///
    /// # Errors
    /// Returns [`GraphletError::InvalidSize`] unless `2 <= size <= 32` and the
    /// canonicalizer supports it.
    pub fn build(self) -> Result<ColorCodingPipeline> {
        if !(2..=MAX_COLORS).contains(&self.size) {
            return Err(GraphletError::InvalidSize {
                size: self.size,
                min: 2,
                max: MAX_COLORS,
            });
        }
        self.canonicalizer.check(self.size)?;
        let canonicalizer = self.canonicalizer.build(self.size)?;
        Ok(ColorCodingPipeline {
            options: self,
            canonicalizer,
        })
    }
}

/// Outcome of a color-coding run.
#[derive(Clone, Debug, Default)]
pub struct ColorCodingReport {
    /// Accepted samples per class.
    pub histogram: SignatureHistogram,
    /// Samples kept.
    pub accepted: u64,
    /// Draws discarded by the spanning-tree test.
    pub rejected: u64,
    /// Statistics of every filled slice, smallest first.
    pub slices: Vec<SliceStats>,
}

#[derive(Default)]
struct WorkerTally {
    histogram: SignatureHistogram,
    accepted: u64,
    rejected: u64,
}

/// Validated color-coding sampler.
pub struct ColorCodingPipeline {
    options: ColorCodingOptions,
    canonicalizer: Box<dyn Canonicalizer>,
}

impl std::fmt::Debug for ColorCodingPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorCodingPipeline")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl ColorCodingPipeline {
    /// Colors `graph`, fills the tables, and draws the requested samples.
    ///
    /// # Errors
    /// Returns [`GraphletError::RandomAccessUnsupported`] for sequential
    /// hosts, [`GraphletError::NoColorfulOccurrence`] when the coloring
    /// admits no occurrence, and propagates pool errors.
    #[instrument(
        name = "sampling.color_coding",
        err,
        skip(self, graph),
        fields(
            size = self.options.size,
            threads = self.options.threads.get(),
            vertices = graph.num_vertices(),
        )
    )]
    pub fn run<G: HostGraph>(&self, graph: G) -> Result<ColorCodingReport> {
        match self.options.flavor {
            TreeletFlavor::Colored => {
                self.run_engine(ColoredColorCoding::new(graph, self.options.size)?)
            }
            TreeletFlavor::SetColored => {
                self.run_engine(SetColoredColorCoding::new(graph, self.options.size)?)
            }
        }
    }

    fn run_engine<E: ColorCodingEngine>(&self, mut engine: E) -> Result<ColorCodingReport> {
        let ColorCodingOptions {
            size,
            samples,
            threads,
            seed,
            ..
        } = self.options;
        engine.color(&mut SmallRng::seed_from_u64(seed));
        engine.run(threads)?;
        engine.build_structures()?;

        let pool = build_pool(threads)?;
        let claimed = AtomicU64::new(0);
        let trees: DashMap<Signature, u64> = DashMap::new();
        let canonicalizer: &dyn Canonicalizer = self.canonicalizer.as_ref();
        let engine = &engine;
        let tallies = pool.broadcast(|context| -> Result<WorkerTally> {
            let mut sampler = engine.new_sampler(size, mix_worker_seed(seed, context.index()))?;
            let mut coin = worker_rng(!seed, context.index());
            let mut tally = WorkerTally::default();
            while claimed.fetch_add(1, Ordering::Relaxed) < samples {
                loop {
                    let occurrence = sampler.sample()?;
                    let graphlet = Graphlet::from_vertices(sampler.graph().copy(), occurrence)?;
                    let small = graphlet.to_small_graph()?;
                    let signature = canonicalizer.signature(&small)?;
                    let spanning = *trees
                        .entry(signature.clone())
                        .or_insert_with(|| spanning_tree_count(&small))
                        .value();
                    if spanning > 0 && coin.r#gen::<f64>() * spanning as f64 <= 1.0 {
                        tally.histogram.add(signature);
                        tally.accepted += 1;
                        break;
                    }
                    tally.rejected += 1;
                }
            }
            Ok(tally)
        });

        let mut report = ColorCodingReport {
            slices: (1..=size).filter_map(|slice| engine.slice_stats(slice)).collect(),
            ..ColorCodingReport::default()
        };
        for tally in tallies {
            let tally = tally?;
            report.histogram.merge(tally.histogram);
            report.accepted += tally.accepted;
            report.rejected += tally.rejected;
        }
        debug!(classes = trees.len(), "spanning-tree memo size");
        record_samples("color_coding", report.accepted);
        record_rejections(report.rejected);
        info!(
            accepted = report.accepted,
            rejected = report.rejected,
            classes = report.histogram.len(),
            "color-coding sampling finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    use crate::{SequentialGraph, host::generators};

    fn options(size: usize, samples: u64, flavor: TreeletFlavor) -> ColorCodingOptions {
        ColorCodingOptions::new(size, samples)
            .with_flavor(flavor)
            .with_threads(NonZeroUsize::new(2).expect("non-zero"))
            .with_seed(7)
    }

    #[rstest]
    #[case(TreeletFlavor::Colored)]
    #[case(TreeletFlavor::SetColored)]
    fn clique_samples_are_all_cliques(#[case] flavor: TreeletFlavor) {
        let pipeline = options(3, 50, flavor).build().expect("valid options");
        let report = pipeline
            .run(generators::clique(9).expect("clique"))
            .expect("sampling succeeds");
        assert_eq!(report.accepted, 50);
        assert_eq!(report.histogram.total(), 50);
        assert_eq!(report.histogram.len(), 1);
        let (signature, _) = report.histogram.sorted()[0];
        assert_eq!(signature.edge_count(), 3);
        // Triangles have three spanning trees, so most draws are rejected.
        assert!(report.rejected > 0);
        assert_eq!(report.slices.len(), 3);
    }

    #[test]
    fn trees_are_never_rejected() {
        let pipeline = options(4, 40, TreeletFlavor::SetColored)
            .build()
            .expect("valid options");
        let report = pipeline
            .run(generators::random_tree(60, 3).expect("tree"))
            .expect("sampling succeeds");
        assert_eq!(report.accepted, 40);
        assert_eq!(report.rejected, 0);
    }

    #[test]
    fn same_seed_gives_same_histogram_on_one_thread() {
        let build = || {
            ColorCodingOptions::new(4, 30)
                .with_threads(NonZeroUsize::MIN)
                .with_seed(11)
                .build()
                .expect("valid options")
        };
        let host = generators::erdos_renyi(40, 120, 2).expect("valid parameters");
        let first = build().run(host.copy()).expect("sampling succeeds");
        let second = build().run(host).expect("sampling succeeds");
        assert_eq!(first.histogram, second.histogram);
        assert_eq!(first.rejected, second.rejected);
    }

    #[rstest]
    #[case(1)]
    #[case(33)]
    fn sizes_outside_palette_are_rejected(#[case] size: usize) {
        let err = ColorCodingOptions::new(size, 1)
            .build()
            .expect_err("size is unsupported");
        assert!(matches!(err, GraphletError::InvalidSize { .. }));
    }

    #[test]
    fn sequential_hosts_are_rejected() {
        let pipeline = options(3, 1, TreeletFlavor::Colored)
            .build()
            .expect("valid options");
        let host = SequentialGraph::new(generators::clique(4).expect("clique"));
        assert_eq!(
            pipeline.run(host).expect_err("no random access"),
            GraphletError::RandomAccessUnsupported
        );
    }
}
