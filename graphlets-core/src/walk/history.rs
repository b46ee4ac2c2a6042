//! Persisted walk histories and their virtual replay.
//!
//! A history is two line-aligned text files: `<basename>.states` lists the
//! members of each visited state separated by spaces, and
//! `<basename>.degrees` holds the number of transitions out of that state.
//! Only real transitions are recorded; replay re-inserts self-loops.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Lines, Write},
    path::{Path, PathBuf},
};

use rand::rngs::SmallRng;
use tracing::{debug, instrument};

use super::GraphletWalk;
use crate::{
    distribution::geometric_failures,
    error::{GraphletError, HistoryError},
    graphlet::Graphlet,
    host::{HostGraph, check_vertex},
};

/// File pair backing one history.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HistoryPaths {
    /// State file.
    pub states: PathBuf,
    /// Degree file.
    pub degrees: PathBuf,
}

impl HistoryPaths {
    /// Paths `<basename>.states` and `<basename>.degrees`.
    #[must_use]
    pub fn new(basename: impl AsRef<Path>) -> Self {
        let base = basename.as_ref().as_os_str();
        let with = |suffix: &str| {
            let mut path = base.to_os_string();
            path.push(suffix);
            PathBuf::from(path)
        };
        Self {
            states: with(".states"),
            degrees: with(".degrees"),
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> HistoryError + '_ {
    move |source| HistoryError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Writes a history one state at a time.
#[derive(Debug)]
pub struct WalkRecorder {
    paths: HistoryPaths,
    states: BufWriter<File>,
    degrees: BufWriter<File>,
    recorded: u64,
}

impl WalkRecorder {
    /// Creates (or truncates) both history files.
    ///
    /// # Errors
    /// Returns [`HistoryError::Io`] when either file cannot be created.
    pub fn create(paths: HistoryPaths) -> Result<Self, HistoryError> {
        let states = File::create(&paths.states).map_err(io_error(&paths.states))?;
        let degrees = File::create(&paths.degrees).map_err(io_error(&paths.degrees))?;
        Ok(Self {
            states: BufWriter::new(states),
            degrees: BufWriter::new(degrees),
            paths,
            recorded: 0,
        })
    }

    /// Appends one state and its transition degree.
    ///
    /// # Errors
    /// Returns [`HistoryError::Io`] when a write fails.
    pub fn record<G: HostGraph>(
        &mut self,
        state: &Graphlet<G>,
        degree: usize,
    ) -> Result<(), HistoryError> {
        writeln!(self.states, "{state}").map_err(io_error(&self.paths.states))?;
        writeln!(self.degrees, "{degree}").map_err(io_error(&self.paths.degrees))?;
        self.recorded += 1;
        Ok(())
    }

    /// States written so far.
    #[must_use]
    pub const fn recorded(&self) -> u64 {
        self.recorded
    }

    /// Flushes both files and returns the number of states written.
    ///
    /// # Errors
    /// Returns [`HistoryError::Io`] when a flush fails.
    pub fn finish(mut self) -> Result<u64, HistoryError> {
        self.states.flush().map_err(io_error(&self.paths.states))?;
        self.degrees.flush().map_err(io_error(&self.paths.degrees))?;
        Ok(self.recorded)
    }
}

/// Records `states` consecutive states of `walk` into `recorder`, taking one
/// real transition after each.
///
/// # Errors
/// Returns [`HistoryError::Io`] on write failures and wraps
/// [`GraphletError::NoTransitions`] when the walk gets stuck.
pub fn record_walk<W: GraphletWalk>(
    walk: &mut W,
    recorder: &mut WalkRecorder,
    states: u64,
) -> Result<u64, HistoryError> {
    for _ in 0..states {
        recorder.record(walk.graphlet(), walk.switch_candidates().len())?;
        walk.step()?;
    }
    debug!(states, real_steps = walk.real_steps(), "walk recorded");
    Ok(states)
}

/// Reads a history's state and degree files in lockstep.
#[derive(Debug)]
pub struct HistoryReader {
    paths: HistoryPaths,
    states: Lines<BufReader<File>>,
    degrees: Lines<BufReader<File>>,
    line: u64,
}

impl HistoryReader {
    /// Opens both history files.
    ///
    /// # Errors
    /// Returns [`HistoryError::Io`] when either file cannot be opened.
    pub fn open(paths: HistoryPaths) -> Result<Self, HistoryError> {
        let states = File::open(&paths.states).map_err(io_error(&paths.states))?;
        let degrees = File::open(&paths.degrees).map_err(io_error(&paths.degrees))?;
        Ok(Self {
            states: BufReader::new(states).lines(),
            degrees: BufReader::new(degrees).lines(),
            paths,
            line: 0,
        })
    }

    /// Records read so far.
    #[must_use]
    pub const fn records_read(&self) -> u64 {
        self.line
    }

    /// Next `(state, degree)` record, or `None` once either file ends.
    ///
    /// # Errors
    /// Returns [`HistoryError::Io`] on read failures and
    /// [`HistoryError::Parse`] on malformed lines.
    pub fn next_record(&mut self) -> Result<Option<(Vec<usize>, u64)>, HistoryError> {
        let (Some(state), Some(degree)) = (self.states.next(), self.degrees.next()) else {
            return Ok(None);
        };
        self.line += 1;
        let state = state.map_err(io_error(&self.paths.states))?;
        let degree = degree.map_err(io_error(&self.paths.degrees))?;
        let vertices = state
            .split_whitespace()
            .map(str::parse::<usize>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| self.parse_error(&self.paths.states, err.to_string()))?;
        let degree = degree
            .trim()
            .parse::<u64>()
            .map_err(|err| self.parse_error(&self.paths.degrees, err.to_string()))?;
        Ok(Some((vertices, degree)))
    }

    fn parse_error(&self, path: &Path, reason: String) -> HistoryError {
        HistoryError::Parse {
            path: path.to_path_buf(),
            line: self.line,
            reason: reason.into(),
        }
    }

    /// Largest degree in the degree file, read from a fresh handle.
    ///
    /// # Errors
    /// Returns [`HistoryError::Io`] or [`HistoryError::Parse`] like
    /// [`Self::next_record`].
    pub fn max_degree(paths: &HistoryPaths) -> Result<u64, HistoryError> {
        let file = File::open(&paths.degrees).map_err(io_error(&paths.degrees))?;
        let mut max = 0;
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(io_error(&paths.degrees))?;
            let degree = line.trim().parse::<u64>().map_err(|err| HistoryError::Parse {
                path: paths.degrees.clone(),
                line: index as u64 + 1,
                reason: err.to_string().into(),
            })?;
            max = max.max(degree);
        }
        Ok(max)
    }
}

/// Replays a recorded history, re-inserting self-loops.
///
/// Every state is padded to degree `1 + max_degree`; each recorded state
/// accounts for a geometric number of self-loops plus the one real step that
/// left it.
#[derive(Debug)]
pub struct VirtualWalk<G> {
    graph: G,
    size: usize,
    reader: HistoryReader,
    upper_bound: f64,
    rng: SmallRng,
    current: Option<Vec<usize>>,
    steps: u64,
}

impl<G: HostGraph> VirtualWalk<G> {
    /// Opens the history at `paths` for states of `size` vertices in `graph`.
    ///
    /// # Errors
    /// Returns [`HistoryError::Io`] or [`HistoryError::Parse`] when the
    /// degree file cannot be scanned.
    #[instrument(name = "walk.replay_open", err, skip(graph, paths, rng), fields(vertices = graph.num_vertices()))]
    pub fn open(graph: G, size: usize, paths: HistoryPaths, rng: SmallRng) -> Result<Self, HistoryError> {
        let max_degree = HistoryReader::max_degree(&paths)?;
        debug!(max_degree, "history degree bound");
        Ok(Self {
            graph,
            size,
            reader: HistoryReader::open(paths)?,
            upper_bound: (max_degree + 1) as f64,
            rng,
            current: None,
            steps: 0,
        })
    }

    /// Virtual steps consumed so far.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Recorded states read so far.
    #[must_use]
    pub const fn states_read(&self) -> u64 {
        self.reader.records_read()
    }

    /// Host graph the states refer to.
    pub const fn graph(&self) -> &G {
        &self.graph
    }

    /// Advances by at least `steps` virtual steps and returns the state
    /// reached.
    ///
    /// # Errors
    /// Returns [`HistoryError::DataExhausted`] when the history ends first,
    /// [`HistoryError::Parse`] for states that are not `size` host vertices,
    /// and [`HistoryError::Io`] on read failures.
    pub fn advance(&mut self, steps: u64) -> Result<&[usize], HistoryError> {
        let mut consumed = 0_u64;
        while consumed < steps || self.current.is_none() {
            let Some((state, degree)) = self.reader.next_record()? else {
                return Err(HistoryError::DataExhausted {
                    states_read: self.reader.records_read(),
                });
            };
            self.check_state(&state)?;
            let loops = geometric_failures(&mut self.rng, degree as f64 / self.upper_bound);
            let taken = loops.saturating_add(1);
            consumed = consumed.saturating_add(taken);
            self.steps = self.steps.saturating_add(taken);
            self.current = Some(state);
        }
        Ok(self.current.as_deref().unwrap_or_default())
    }

    fn check_state(&self, state: &[usize]) -> Result<(), HistoryError> {
        if state.len() != self.size {
            return Err(HistoryError::Parse {
                path: self.reader.paths.states.clone(),
                line: self.reader.records_read(),
                reason: format!("expected {} vertices, found {}", self.size, state.len()).into(),
            });
        }
        let vertices = self.graph.num_vertices();
        for &vertex in state {
            check_vertex(vertex, vertices).map_err(HistoryError::from)?;
        }
        Ok(())
    }

    /// Materializes `state` as a graphlet over a copy of the host.
    ///
    /// # Errors
    /// Returns [`GraphletError::VertexOutOfRange`] for unknown vertices.
    pub fn graphlet(&self, state: &[usize]) -> Result<Graphlet<G>, GraphletError> {
        Graphlet::from_vertices(self.graph.copy(), state.iter().copied())
    }
}
