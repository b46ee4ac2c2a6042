//! Exhaustive motif census: enumerate, batch, canonicalize in parallel.

use std::num::NonZeroUsize;

use rayon::prelude::*;
use tracing::{debug, info, instrument};

use super::{
    CanonicalizerKind, DEFAULT_BATCH_SIZE, SignatureHistogram, classify, non_zero,
    record_samples,
};
use crate::{
    canon::Canonicalizer,
    cancel::CancellationToken,
    enumerate::SubgraphEnumerator,
    error::{GraphletError, Result},
    graphlet::Graphlet,
    host::HostGraph,
    workers::{build_pool, default_threads},
};

/// Configures an [`ExhaustivePipeline`].
///
/// # Examples
/// ```
/// use graphlets_core::{ExhaustiveOptions, generators};
///
/// let pipeline = ExhaustiveOptions::new(3).with_batch_size(4).build()?;
/// let report = pipeline.run(generators::clique(5)?)?;
/// assert_eq!(report.motifs, 10);
/// assert_eq!(report.histogram.len(), 1);
/// # Ok::<(), graphlets_core::GraphletError>(())
/// ```
#[derive(Clone, Debug)]
pub struct ExhaustiveOptions {
    size: usize,
    threads: NonZeroUsize,
    batch_size: usize,
    limit: Option<u64>,
    canonicalizer: CanonicalizerKind,
    cancel: Option<CancellationToken>,
}

impl ExhaustiveOptions {
    /// Options for motifs of `size` vertices with default settings.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            size,
            threads: default_threads(),
            batch_size: DEFAULT_BATCH_SIZE,
            limit: None,
            canonicalizer: CanonicalizerKind::default(),
            cancel: None,
        }
    }

    /// Worker count for canonicalization.
    #[must_use]
    pub const fn with_threads(mut self, threads: NonZeroUsize) -> Self {
        self.threads = threads;
        self
    }

    /// Motifs handed to the workers at a time.
    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Stops after `limit` motifs.
    #[must_use]
    pub const fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Canonicalization strategy.
    #[must_use]
    pub const fn with_canonicalizer(mut self, kind: CanonicalizerKind) -> Self {
        self.canonicalizer = kind;
        self
    }

    /// Aborts the census once `token` is cancelled.
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

    /// Validates the options and prepares the canonicalizer.
    ///
    /// # Errors
    /// Returns [`GraphletError::InvalidSize`] for a zero size or one the
    /// eager table does not support, and [`GraphletError::InvalidParameter`]
    /// for a zero batch size.
    pub fn build(self) -> Result<ExhaustivePipeline> {
        if self.size == 0 {
            return Err(GraphletError::InvalidSize {
                size: 0,
                min: 1,
                max: usize::MAX,
            });
        }
        self.canonicalizer.check(self.size)?;
        let batch_size = non_zero("batch_size", self.batch_size)?;
        let canonicalizer = self.canonicalizer.build(self.size)?;
        Ok(ExhaustivePipeline {
            options: self,
            batch_size,
            canonicalizer,
        })
    }
}

/// Outcome of an exhaustive census.
#[derive(Clone, Debug, Default)]
pub struct ExhaustiveReport {
    /// Occurrences per class.
    pub histogram: SignatureHistogram,
    /// Motifs enumerated.
    pub motifs: u64,
}

/// Validated exhaustive census.
pub struct ExhaustivePipeline {
    options: ExhaustiveOptions,
    batch_size: NonZeroUsize,
    canonicalizer: Box<dyn Canonicalizer>,
}

impl std::fmt::Debug for ExhaustivePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExhaustivePipeline")
            .field("options", &self.options)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl ExhaustivePipeline {
    /// Counts every connected induced motif of `graph`.
    ///
    /// # Errors
    /// Returns [`GraphletError::Cancelled`] when the token fires, and
    /// propagates pool and canonicalization errors.
    #[instrument(
        name = "sampling.exhaustive",
        err,
        skip(self, graph),
        fields(
            size = self.options.size,
            threads = self.options.threads.get(),
            vertices = graph.num_vertices(),
        )
    )]
    pub fn run<G: HostGraph>(&self, graph: G) -> Result<ExhaustiveReport> {
        let pool = build_pool(self.options.threads)?;
        let mut enumerator = SubgraphEnumerator::global(graph, self.options.size)?;
        if let Some(token) = &self.options.cancel {
            enumerator = enumerator.with_cancellation(token.clone());
        }
        let canonicalizer: &dyn Canonicalizer = self.canonicalizer.as_ref();
        let mut report = ExhaustiveReport::default();
        loop {
            let remaining = self
                .options
                .limit
                .map_or(u64::MAX, |limit| limit.saturating_sub(report.motifs));
            let take = usize::try_from(remaining)
                .unwrap_or(usize::MAX)
                .min(self.batch_size.get());
            if take == 0 {
                break;
            }
            let batch: Vec<Graphlet<G>> = enumerator.by_ref().take(take).collect();
            if batch.is_empty() {
                break;
            }
            report.motifs += batch.len() as u64;
            let partial = pool.install(|| {
                batch
                    .into_par_iter()
                    .map(|motif| classify(&motif, canonicalizer))
                    .try_fold(SignatureHistogram::new, |mut histogram, signature| {
                        histogram.add(signature?);
                        Ok::<_, GraphletError>(histogram)
                    })
                    .try_reduce(SignatureHistogram::new, |mut left, right| {
                        left.merge(right);
                        Ok(left)
                    })
            })?;
            report.histogram.merge(partial);
            debug!(motifs = report.motifs, "batch canonicalized");
        }
        if enumerator.is_cancelled() {
            return Err(GraphletError::Cancelled);
        }
        record_samples("exhaustive", report.motifs);
        info!(
            motifs = report.motifs,
            classes = report.histogram.len(),
            "exhaustive census finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    use crate::host::generators;

    #[rstest]
    #[case::lazy(CanonicalizerKind::Lazy)]
    #[case::eager(CanonicalizerKind::Eager)]
    fn cycle_census_finds_only_paths(#[case] kind: CanonicalizerKind) {
        let pipeline = ExhaustiveOptions::new(3)
            .with_canonicalizer(kind)
            .with_threads(NonZeroUsize::new(3).expect("non-zero"))
            .with_batch_size(3)
            .build()
            .expect("valid options");
        let report = pipeline
            .run(generators::cycle(10).expect("cycle"))
            .expect("census succeeds");
        assert_eq!(report.motifs, 10);
        let sorted = report.histogram.sorted();
        assert_eq!(sorted.len(), 1);
        assert_eq!(sorted[0].1, 10);
        assert_eq!(sorted[0].0.edge_count(), 2);
    }

    #[test]
    fn limit_caps_the_census() {
        let pipeline = ExhaustiveOptions::new(3)
            .with_limit(7)
            .with_batch_size(2)
            .build()
            .expect("valid options");
        let report = pipeline
            .run(generators::clique(6).expect("clique"))
            .expect("census succeeds");
        assert_eq!(report.motifs, 7);
        assert_eq!(report.histogram.total(), 7);
    }

    #[rstest]
    #[case::zero_size(ExhaustiveOptions::new(0))]
    #[case::zero_batch(ExhaustiveOptions::new(3).with_batch_size(0))]
    #[case::eager_too_large(ExhaustiveOptions::new(8).with_canonicalizer(CanonicalizerKind::Eager))]
    fn invalid_options_are_rejected(#[case] options: ExhaustiveOptions) {
        let err = options.build().expect_err("options are invalid");
        assert_eq!(err.code().as_str().split('_').next(), Some("GRAPHLET"));
        assert_eq!(err.kind(), crate::ErrorKind::InvalidInput);
    }

    #[test]
    fn cancelled_census_reports_cancellation() {
        let token = CancellationToken::new();
        token.cancel();
        let pipeline = ExhaustiveOptions::new(3)
            .with_cancellation(token)
            .build()
            .expect("valid options");
        let err = pipeline
            .run(generators::clique(6).expect("clique"))
            .expect_err("token already cancelled");
        assert_eq!(err, GraphletError::Cancelled);
    }

    #[test]
    fn star_census_finds_only_paths() {
        // Any 3 vertices containing the hub form a path; leaves alone are disconnected.
        let pipeline = ExhaustiveOptions::new(3).build().expect("valid options");
        let report = pipeline
            .run(generators::star(5).expect("star"))
            .expect("census succeeds");
        assert_eq!(report.motifs, 10);
        assert_eq!(report.histogram.len(), 1);
    }
}
