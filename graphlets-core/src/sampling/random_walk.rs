//! Random-walk sampling, walk recording, and history replay.

use std::{
    fs::File,
    io::{BufWriter, Write},
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use rand::{Rng, SeedableRng, rngs::SmallRng};
use tracing::{info, instrument, warn};

use super::{CanonicalizerKind, SignatureHistogram, classify, record_samples};
use crate::{
    canon::{Canonicalizer, Signature},
    cancel::CancellationToken,
    error::{GraphletError, HistoryError, Result},
    host::HostGraph,
    rng::worker_rng,
    small_graph::MAX_ORDER,
    walk::{
        CowardPolicy, FullPolicy, GraphletWalk, HistoryPaths, RandomWalk, SmartPolicy,
        TransitionPolicy, VirtualWalk, WalkRecorder, record_walk,
    },
    workers::{WorkCursor, build_pool, default_threads},
};

/// Random start vertices tried before falling back to the first valid one.
const START_ATTEMPTS: usize = 64;

/// Transition rule of the sampling walks.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum WalkPolicy {
    /// Uniform over all connected swaps.
    #[default]
    Full,
    /// Crowding-damped swap weights.
    Smart,
    /// Removable members only.
    Coward,
}

/// Configures a [`WalkPipeline`].
///
/// # Examples
/// ```
/// use graphlets_core::{WalkSamplerOptions, generators};
///
/// let pipeline = WalkSamplerOptions::new(3, 20, 50).with_seed(5).build()?;
/// let report = pipeline.run(generators::cycle(30)?)?;
/// assert_eq!(report.samples, 20);
/// assert_eq!(report.histogram.total(), 20);
/// # Ok::<(), graphlets_core::GraphletError>(())
/// ```
#[derive(Clone, Debug)]
pub struct WalkSamplerOptions {
    size: usize,
    samples: u64,
    steps: u64,
    interval: Option<u64>,
    discard: u64,
    policy: WalkPolicy,
    threads: NonZeroUsize,
    seed: u64,
    samples_out: Option<PathBuf>,
    final_states: Option<PathBuf>,
    canonicalizer: CanonicalizerKind,
    cancel: Option<CancellationToken>,
}

impl WalkSamplerOptions {
    /// `samples` walks of `steps` steps over graphlets of `size` vertices.
    #[must_use]
    pub fn new(size: usize, samples: u64, steps: u64) -> Self {
        Self {
            size,
            samples,
            steps,
            interval: None,
            discard: 0,
            policy: WalkPolicy::default(),
            threads: default_threads(),
            seed: 0,
            samples_out: None,
            final_states: None,
            canonicalizer: CanonicalizerKind::default(),
            cancel: None,
        }
    }

    /// Steps between two signatures written to the samples file; defaults to
    /// the walk length.
    #[must_use]
    pub const fn with_interval(mut self, interval: u64) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Leading samples left out of the histogram.
    #[must_use]
    pub const fn with_discard(mut self, discard: u64) -> Self {
        self.discard = discard;
        self
    }

    /// Transition rule.
    #[must_use]
    pub const fn with_policy(mut self, policy: WalkPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Concurrent walks.
    #[must_use]
    pub const fn with_threads(mut self, threads: NonZeroUsize) -> Self {
        self.threads = threads;
        self
    }

    /// Base seed; walk `i` derives its generator from `(seed, i)`.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Writes each walk's interval signatures as one line of `path`.
    #[must_use]
    pub fn with_samples_out(mut self, path: impl Into<PathBuf>) -> Self {
        self.samples_out = Some(path.into());
        self
    }

    /// Writes each walk's final vertex set as one line of `path`.
    #[must_use]
    pub fn with_final_states(mut self, path: impl Into<PathBuf>) -> Self {
        self.final_states = Some(path.into());
        self
    }

    /// Canonicalization strategy.
    #[must_use]
    pub const fn with_canonicalizer(mut self, kind: CanonicalizerKind) -> Self {
        self.canonicalizer = kind;
        self
    }

    /// Stops the walks once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Validates the options.
    ///
    /// # Errors
    /// Returns [`GraphletError::InvalidSize`] unless `2 <= size <= 64` and the
    /// canonicalizer supports it, and [`GraphletError::InvalidParameter`] for
    /// a zero walk length or interval.
    pub fn build(self) -> Result<WalkPipeline> {
        if !(2..=MAX_ORDER).contains(&self.size) {
            return Err(GraphletError::InvalidSize {
                size: self.size,
                min: 2,
                max: MAX_ORDER,
            });
        }
        self.canonicalizer.check(self.size)?;
        if self.steps == 0 {
            return Err(GraphletError::InvalidParameter {
                name: "steps",
                reason: "walks need at least one step",
            });
        }
        let interval = self.interval.unwrap_or(self.steps);
        if interval == 0 {
            return Err(GraphletError::InvalidParameter {
                name: "interval",
                reason: "must be positive",
            });
        }
        let canonicalizer = self.canonicalizer.build(self.size)?;
        Ok(WalkPipeline {
            options: self,
            interval,
            canonicalizer,
        })
    }
}

/// Outcome of a walk-based run.
#[derive(Clone, Debug, Default)]
pub struct WalkReport {
    /// Final-state signatures per class, leading discards excluded.
    pub histogram: SignatureHistogram,
    /// Samples taken, discarded ones included.
    pub samples: u64,
    /// Steps consumed, self-loops included.
    pub steps: u64,
    /// State changes.
    pub real_steps: u64,
}

struct WalkOutcome {
    index: u64,
    intervals: Vec<Signature>,
    final_state: Vec<usize>,
    real_steps: u64,
}

/// Validated walk sampler.
pub struct WalkPipeline {
    options: WalkSamplerOptions,
    interval: u64,
    canonicalizer: Box<dyn Canonicalizer>,
}

impl std::fmt::Debug for WalkPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalkPipeline")
            .field("options", &self.options)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

impl WalkPipeline {
    /// Runs `samples` independent walks from random start vertices.
    ///
    /// Each walk advances in `interval`-step chunks until it has taken at
    /// least `steps` steps; the signature after every chunk goes to the
    /// samples file and the last one to the histogram.
    ///
    /// # Errors
    /// Returns [`GraphletError::NoStartingGraphlet`] when no vertex seeds a
    /// connected graphlet, [`GraphletError::Cancelled`] when the token fires,
    /// and propagates pool errors. Output-file failures are logged only.
    #[instrument(
        name = "sampling.random_walk",
        err,
        skip(self, graph),
        fields(
            size = self.options.size,
            threads = self.options.threads.get(),
            vertices = graph.num_vertices(),
        )
    )]
    pub fn run<G: HostGraph>(&self, graph: G) -> Result<WalkReport> {
        match self.options.policy {
            WalkPolicy::Full => self.run_policy::<G, FullPolicy>(&graph),
            WalkPolicy::Smart => self.run_policy::<G, SmartPolicy>(&graph),
            WalkPolicy::Coward => self.run_policy::<G, CowardPolicy>(&graph),
        }
    }

    fn run_policy<G: HostGraph, P: TransitionPolicy>(&self, graph: &G) -> Result<WalkReport> {
        let samples = usize::try_from(self.options.samples).unwrap_or(usize::MAX);
        let pool = build_pool(self.options.threads)?;
        let cursor = WorkCursor::new(samples);
        let per_worker = pool.broadcast(|_| -> Result<Vec<WalkOutcome>> {
            let local = graph.copy();
            let mut outcomes = Vec::new();
            while let Some(index) = cursor.claim() {
                outcomes.push(self.sample_walk::<G, P>(&local, index as u64)?);
            }
            Ok(outcomes)
        });
        let mut outcomes = Vec::with_capacity(samples);
        for batch in per_worker {
            outcomes.extend(batch?);
        }
        outcomes.sort_unstable_by_key(|outcome| outcome.index);

        let mut report = WalkReport {
            samples: outcomes.len() as u64,
            ..WalkReport::default()
        };
        for outcome in &outcomes {
            report.real_steps += outcome.real_steps;
            report.steps += self.interval * outcome.intervals.len() as u64;
            if outcome.index >= self.options.discard {
                if let Some(last) = outcome.intervals.last() {
                    report.histogram.add(last.clone());
                }
            }
        }
        self.write_outputs(&outcomes);
        record_samples("random_walk", report.histogram.total());
        info!(
            samples = report.samples,
            steps = report.steps,
            real_steps = report.real_steps,
            "random-walk sampling finished"
        );
        Ok(report)
    }

    fn sample_walk<G: HostGraph, P: TransitionPolicy>(
        &self,
        graph: &G,
        index: u64,
    ) -> Result<WalkOutcome> {
        let rng = worker_rng(self.options.seed, index as usize);
        let mut walk = start_walk::<G, P>(graph, self.options.size, rng)?;
        if let Some(token) = &self.options.cancel {
            walk = walk.with_cancellation(token.clone());
        }
        let chunks = self.options.steps.div_ceil(self.interval);
        let mut intervals = Vec::with_capacity(usize::try_from(chunks).unwrap_or(0));
        for _ in 0..chunks {
            walk.walk(self.interval)?;
            intervals.push(classify(walk.graphlet(), self.canonicalizer.as_ref())?);
        }
        Ok(WalkOutcome {
            index,
            intervals,
            final_state: walk.graphlet().vertices().collect(),
            real_steps: walk.real_steps(),
        })
    }

    fn write_outputs(&self, outcomes: &[WalkOutcome]) {
        if let Some(path) = &self.options.samples_out {
            write_lines(path, outcomes, |outcome| {
                outcome
                    .intervals
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" ")
            });
        }
        if let Some(path) = &self.options.final_states {
            write_lines(path, outcomes, |outcome| {
                outcome
                    .final_state
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" ")
            });
        }
    }

    /// Records `samples` walks of `steps` real transitions each into the
    /// history at `paths`, using the full transition rule.
    ///
    /// # Errors
    /// Returns [`HistoryError::Io`] on write failures and wraps walk errors.
    #[instrument(name = "sampling.record", err, skip(self, graph, paths), fields(size = self.options.size))]
    pub fn record<G: HostGraph>(&self, graph: G, paths: HistoryPaths) -> std::result::Result<u64, HistoryError> {
        let mut recorder = WalkRecorder::create(paths)?;
        let mut rng = SmallRng::seed_from_u64(self.options.seed);
        for _ in 0..self.options.samples {
            let walk_rng = SmallRng::seed_from_u64(rng.r#gen());
            let mut walk = start_walk::<G, FullPolicy>(&graph, self.options.size, walk_rng)?;
            record_walk(&mut walk, &mut recorder, self.options.steps)?;
        }
        let recorded = recorder.finish()?;
        info!(recorded, "walk history recorded");
        Ok(recorded)
    }

    /// Replays the history at `paths` as one continuous walk with self-loops,
    /// taking a sample every `steps` virtual steps.
    ///
    /// Stops early with a warning when the history runs out.
    ///
    /// # Errors
    /// Returns [`HistoryError::Io`] and [`HistoryError::Parse`] for unreadable
    /// histories.
    #[instrument(name = "sampling.replay", err, skip(self, graph, paths), fields(size = self.options.size))]
    pub fn replay<G: HostGraph>(&self, graph: G, paths: HistoryPaths) -> std::result::Result<WalkReport, HistoryError> {
        let rng = SmallRng::seed_from_u64(self.options.seed);
        let mut replay = VirtualWalk::open(graph, self.options.size, paths, rng)?;
        let mut report = WalkReport::default();
        for index in 0..self.options.samples {
            let state = match replay.advance(self.options.steps) {
                Ok(state) => state.to_vec(),
                Err(HistoryError::DataExhausted { states_read }) => {
                    warn!(
                        requested = self.options.samples,
                        taken = index,
                        states_read,
                        "walk history exhausted before every sample was taken"
                    );
                    break;
                }
                Err(err) => return Err(err),
            };
            report.samples += 1;
            if index >= self.options.discard {
                let graphlet = replay.graphlet(&state)?;
                report
                    .histogram
                    .add(classify(&graphlet, self.canonicalizer.as_ref())?);
            }
        }
        report.steps = replay.steps();
        report.real_steps = replay.states_read();
        record_samples("replay", report.histogram.total());
        info!(
            samples = report.samples,
            steps = report.steps,
            "walk history replayed"
        );
        Ok(report)
    }
}

/// Starts a walk at a random vertex, retrying on vertices that cannot seed a
/// graphlet and finally falling back to the first vertex that can.
fn start_walk<G: HostGraph, P: TransitionPolicy>(
    graph: &G,
    size: usize,
    mut rng: SmallRng,
) -> Result<RandomWalk<G, P>> {
    let vertices = graph.num_vertices();
    if vertices > 0 {
        for _ in 0..START_ATTEMPTS {
            let start = rng.gen_range(0..vertices);
            let walk_rng = SmallRng::seed_from_u64(rng.r#gen());
            match RandomWalk::<G, P>::new(graph.copy(), size, Some(start), walk_rng) {
                Err(GraphletError::NoStartingGraphlet { .. }) => {}
                other => return other,
            }
        }
    }
    RandomWalk::new(graph.copy(), size, None, rng)
}

fn write_lines(path: &Path, outcomes: &[WalkOutcome], render: impl Fn(&WalkOutcome) -> String) {
    let written = File::create(path).and_then(|file| {
        let mut writer = BufWriter::new(file);
        for outcome in outcomes {
            writeln!(writer, "{}", render(outcome))?;
        }
        writer.flush()
    });
    if let Err(err) = written {
        warn!(path = %path.display(), error = %err, "failed to write walk output");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    use crate::host::generators;

    fn pipeline(samples: u64, steps: u64) -> WalkSamplerOptions {
        WalkSamplerOptions::new(3, samples, steps)
            .with_threads(NonZeroUsize::new(2).expect("non-zero"))
            .with_seed(9)
    }

    #[test]
    fn cycle_walks_only_see_paths() {
        let report = pipeline(16, 40)
            .build()
            .expect("valid options")
            .run(generators::cycle(25).expect("cycle"))
            .expect("walks succeed");
        assert_eq!(report.samples, 16);
        assert_eq!(report.histogram.total(), 16);
        assert_eq!(report.histogram.len(), 1);
        assert_eq!(report.steps, 16 * 40);
    }

    #[test]
    fn discarded_samples_stay_out_of_the_histogram() {
        let report = pipeline(10, 5)
            .with_discard(4)
            .build()
            .expect("valid options")
            .run(generators::clique(6).expect("clique"))
            .expect("walks succeed");
        assert_eq!(report.samples, 10);
        assert_eq!(report.histogram.total(), 6);
    }

    #[test]
    fn thread_count_does_not_change_the_result() {
        let host = generators::erdos_renyi(50, 120, 4).expect("valid parameters");
        let run = |threads: usize| {
            pipeline(12, 30)
                .with_policy(WalkPolicy::Smart)
                .with_threads(NonZeroUsize::new(threads).expect("non-zero"))
                .build()
                .expect("valid options")
                .run(host.copy())
                .expect("walks succeed")
        };
        let single = run(1);
        let many = run(3);
        assert_eq!(single.histogram, many.histogram);
        assert_eq!(single.real_steps, many.real_steps);
    }

    #[test]
    fn output_files_hold_one_line_per_walk() {
        let dir = TempDir::new().expect("temp dir");
        let samples_out = dir.path().join("samples.txt");
        let final_states = dir.path().join("final.txt");
        pipeline(5, 30)
            .with_interval(10)
            .with_policy(WalkPolicy::Coward)
            .with_samples_out(&samples_out)
            .with_final_states(&final_states)
            .build()
            .expect("valid options")
            .run(generators::cycle(12).expect("cycle"))
            .expect("walks succeed");
        let samples = std::fs::read_to_string(&samples_out).expect("samples written");
        let lines: Vec<&str> = samples.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|line| line.split(' ').count() == 3));
        let finals = std::fs::read_to_string(&final_states).expect("final states written");
        assert!(finals.lines().all(|line| line.split(' ').count() == 3));
    }

    #[test]
    fn unwritable_outputs_do_not_fail_the_run() {
        let dir = TempDir::new().expect("temp dir");
        let report = pipeline(2, 5)
            .with_samples_out(dir.path().join("missing").join("samples.txt"))
            .build()
            .expect("valid options")
            .run(generators::cycle(8).expect("cycle"))
            .expect("output errors are logged");
        assert_eq!(report.samples, 2);
    }

    #[test]
    fn recorded_history_replays_until_exhausted() {
        let dir = TempDir::new().expect("temp dir");
        let paths = HistoryPaths::new(dir.path().join("history"));
        let host = generators::cycle(20).expect("cycle");
        let recorder = pipeline(3, 10).build().expect("valid options");
        let recorded = recorder
            .record(host.copy(), paths.clone())
            .expect("history written");
        assert_eq!(recorded, 30);

        let replayer = pipeline(1_000, 4).with_discard(1).build().expect("valid options");
        let report = replayer.replay(host, paths).expect("history readable");
        assert!(report.samples >= 1 && report.samples < 1_000);
        assert_eq!(report.histogram.total(), report.samples - 1);
        assert_eq!(report.real_steps, 30);
    }

    #[test]
    fn invalid_options_are_rejected() {
        assert!(WalkSamplerOptions::new(1, 1, 1).build().is_err());
        assert!(WalkSamplerOptions::new(3, 1, 0).build().is_err());
        assert!(WalkSamplerOptions::new(3, 1, 5).with_interval(0).build().is_err());
    }
}
