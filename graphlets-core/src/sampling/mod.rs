//! End-to-end pipelines that turn a host graph into a signature histogram.
//!
//! Each pipeline is configured through an options builder validated by
//! `build()`:
//!
//! - [`ExhaustiveOptions`] enumerates every motif and canonicalizes batches
//!   on a worker pool.
//! - [`ColorCodingOptions`] samples colorful occurrences and accepts each with
//!   probability one over its spanning-tree count.
//! - [`WalkSamplerOptions`] runs independent random walks, records walk
//!   histories, and replays them.

mod color_coding;
mod exhaustive;
mod histogram;
mod random_walk;

use std::num::NonZeroUsize;

pub use self::{
    color_coding::{ColorCodingOptions, ColorCodingPipeline, ColorCodingReport, TreeletFlavor},
    exhaustive::{ExhaustiveOptions, ExhaustivePipeline, ExhaustiveReport},
    histogram::SignatureHistogram,
    random_walk::{WalkPipeline, WalkPolicy, WalkReport, WalkSamplerOptions},
};
use crate::{
    canon::{Canonicalizer, EagerCanonicalizer, LazyCanonicalizer, MAX_EAGER_ORDER},
    error::{GraphletError, Result},
    graphlet::Graphlet,
    host::HostGraph,
};

/// Motifs canonicalized per batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 1_000_000;

/// Which canonicalization strategy a pipeline uses.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CanonicalizerKind {
    /// Precomputed table; orders up to [`MAX_EAGER_ORDER`].
    Eager,
    /// On-demand search with memoization.
    #[default]
    Lazy,
}

impl CanonicalizerKind {
    /// Builds a canonicalizer of this kind for graphs of `order` vertices.
    ///
    /// # Errors
    /// Returns [`GraphletError::InvalidSize`] when the eager table does not
    /// support `order`.
    pub fn build(self, order: usize) -> Result<Box<dyn Canonicalizer>> {
        Ok(match self {
            Self::Eager => Box::new(EagerCanonicalizer::new(order)?),
            Self::Lazy => Box::new(LazyCanonicalizer::new(order)),
        })
    }

    pub(crate) fn check(self, order: usize) -> Result<()> {
        if self == Self::Eager && !(1..=MAX_EAGER_ORDER).contains(&order) {
            return Err(GraphletError::InvalidSize {
                size: order,
                min: 1,
                max: MAX_EAGER_ORDER,
            });
        }
        Ok(())
    }
}

fn classify<G: HostGraph>(
    graphlet: &Graphlet<G>,
    canonicalizer: &dyn Canonicalizer,
) -> Result<crate::canon::Signature> {
    canonicalizer.signature(&graphlet.to_small_graph()?)
}

fn non_zero(name: &'static str, value: usize) -> Result<NonZeroUsize> {
    NonZeroUsize::new(value).ok_or(GraphletError::InvalidParameter {
        name,
        reason: "must be positive",
    })
}

#[cfg(feature = "metrics")]
fn record_samples(pipeline: &'static str, count: u64) {
    metrics::counter!("graphlets_samples_total", "pipeline" => pipeline).increment(count);
}

#[cfg(not(feature = "metrics"))]
fn record_samples(_pipeline: &'static str, _count: u64) {}

#[cfg(feature = "metrics")]
fn record_rejections(count: u64) {
    metrics::counter!("graphlets_color_coding_rejections_total").increment(count);
}

#[cfg(not(feature = "metrics"))]
fn record_rejections(_count: u64) {}
