//! Markov-chain random walks over the connected graphlets of a fixed size.
//!
//! A state is a connected [`Graphlet`]; a transition swaps one member for one
//! non-member so the result stays connected. Every state is padded with
//! self-loops up to a common degree bound, which makes the chain's
//! stationary distribution easy to correct for. Self-loops are never taken
//! one by one: a geometric draw tells how many happen before the next real
//! transition.

mod history;
mod policy;

use rand::rngs::SmallRng;
use tracing::{debug, instrument, trace};

pub use self::{
    history::{HistoryPaths, HistoryReader, VirtualWalk, WalkRecorder, record_walk},
    policy::{CowardPolicy, FullPolicy, SmartPolicy, SwitchCandidate, TransitionPolicy},
};
use crate::{
    bfs::capped_bfs,
    cancel::CancellationToken,
    distribution::{EnumeratedDistribution, geometric_failures},
    error::{GraphletError, Result},
    graphlet::Graphlet,
    host::{HostGraph, check_vertex},
    small_graph::MAX_ORDER,
};

/// Operations shared by every graphlet walk.
pub trait GraphletWalk {
    /// Host graph the walk moves in.
    type Graph: HostGraph;

    /// Current state.
    fn graphlet(&self) -> &Graphlet<Self::Graph>;

    /// Steps taken so far, self-loops included.
    fn steps(&self) -> u64;

    /// Transitions that changed the state.
    fn real_steps(&self) -> u64;

    /// Sum of the transition weights out of the current state.
    fn state_weight(&self) -> f64;

    /// Weighted transitions out of the current state.
    fn switch_candidates(&self) -> &[SwitchCandidate];

    /// Takes one real transition, skipping self-loops.
    ///
    /// # Errors
    /// Returns [`GraphletError::NoTransitions`] when the state cannot move.
    fn step(&mut self) -> Result<()>;

    /// Consumes up to `budget` steps and returns how many were used.
    ///
    /// Either every step is a self-loop, or the last one is a real transition.
    ///
    /// # Errors
    /// Returns [`GraphletError::Cancelled`] once the walk's token is cancelled.
    fn step_many(&mut self, budget: u64) -> Result<u64>;

    /// Advances the walk by exactly `steps` steps.
    ///
    /// # Errors
    /// Propagates [`Self::step_many`] errors.
    fn walk(&mut self, steps: u64) -> Result<()> {
        let mut remaining = steps;
        while remaining > 0 {
            remaining -= self.step_many(remaining)?.min(remaining);
        }
        Ok(())
    }
}

/// Random walk whose transitions come from policy `P`.
///
/// # Examples
/// ```
/// use graphlets_core::{FullWalk, GraphletWalk, generators};
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let host = generators::cycle(12).expect("cycle");
/// let mut walk = FullWalk::new(host, 4, Some(0), SmallRng::seed_from_u64(3))?;
/// walk.walk(1_000)?;
/// assert_eq!(walk.steps(), 1_000);
/// assert_eq!(walk.graphlet().len(), 4);
/// assert!(walk.graphlet().is_connected());
/// # Ok::<(), graphlets_core::GraphletError>(())
/// ```
#[derive(Debug)]
pub struct RandomWalk<G, P> {
    graphlet: Graphlet<G>,
    policy: P,
    rng: SmallRng,
    upper_bound: f64,
    candidates: Vec<SwitchCandidate>,
    weight: f64,
    steps: u64,
    real_steps: u64,
    cancel: Option<CancellationToken>,
}

/// Uniform over all connected swaps.
pub type FullWalk<G> = RandomWalk<G, FullPolicy>;
/// Swap weights damped by neighbourhood crowding.
pub type SmartWalk<G> = RandomWalk<G, SmartPolicy>;
/// Swaps out removable members only.
pub type CowardWalk<G> = RandomWalk<G, CowardPolicy>;

impl<G: HostGraph, P: TransitionPolicy> RandomWalk<G, P> {
    /// Walk of `size`-vertex graphlets seeded by a capped BFS.
    ///
    /// With `start` the search begins there; otherwise at the first vertex
    /// whose search reaches `size` vertices.
    ///
    /// # Errors
    /// Returns [`GraphletError::InvalidSize`] unless `2 <= size <= 64`,
    /// [`GraphletError::VertexOutOfRange`] for an unknown start, and
    /// [`GraphletError::NoStartingGraphlet`] when no search reaches `size`
    /// vertices.
    pub fn new(graph: G, size: usize, start: Option<usize>, rng: SmallRng) -> Result<Self> {
        Self::with_policy(graph, size, start, P::default(), rng)
    }

    /// Like [`Self::new`] with an explicit policy value.
    ///
    /// # Errors
    /// See [`Self::new`].
    #[instrument(
        name = "walk.init",
        err,
        skip(graph, policy, rng),
        fields(policy = P::NAME, vertices = graph.num_vertices())
    )]
    pub fn with_policy(
        graph: G,
        size: usize,
        start: Option<usize>,
        policy: P,
        rng: SmallRng,
    ) -> Result<Self> {
        if !(2..=MAX_ORDER).contains(&size) {
            return Err(GraphletError::InvalidSize {
                size,
                min: 2,
                max: MAX_ORDER,
            });
        }
        let vertices = graph.num_vertices();
        let seeded = match start {
            Some(vertex) => {
                check_vertex(vertex, vertices)?;
                Some(capped_bfs(&graph, vertex, size)).filter(|reached| reached.len() == size)
            }
            None => (0..vertices)
                .map(|vertex| capped_bfs(&graph, vertex, size))
                .find(|reached| reached.len() == size),
        }
        .ok_or(GraphletError::NoStartingGraphlet { seed: start, size })?;
        let graphlet = Graphlet::from_vertices(graph, seeded)?;
        Ok(Self::from_graphlet(graphlet, policy, rng))
    }

    /// Walk starting from an explicit connected state.
    ///
    /// # Errors
    /// Returns [`GraphletError::InvalidSize`] for fewer than two members and
    /// [`GraphletError::NoStartingGraphlet`] when the state is disconnected.
    pub fn from_state(graphlet: Graphlet<G>, rng: SmallRng) -> Result<Self> {
        let size = graphlet.len();
        if !(2..=MAX_ORDER).contains(&size) {
            return Err(GraphletError::InvalidSize {
                size,
                min: 2,
                max: MAX_ORDER,
            });
        }
        if !graphlet.is_connected() {
            return Err(GraphletError::NoStartingGraphlet { seed: None, size });
        }
        Ok(Self::from_graphlet(graphlet, P::default(), rng))
    }

    fn from_graphlet(graphlet: Graphlet<G>, policy: P, rng: SmallRng) -> Self {
        let size = graphlet.len();
        let bound = (size - 1)
            .saturating_mul(size)
            .saturating_mul(graphlet.graph().max_degree());
        let mut walk = Self {
            graphlet,
            policy,
            rng,
            upper_bound: bound.max(1) as f64,
            candidates: Vec::new(),
            weight: 0.0,
            steps: 0,
            real_steps: 0,
            cancel: None,
        };
        walk.refresh();
        walk
    }

    /// Stops [`GraphletWalk::walk`] once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Degree bound `(k - 1) * k * max_degree` that pads every state.
    #[must_use]
    pub const fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    /// Consumes the walk, returning its final state.
    pub fn into_graphlet(self) -> Graphlet<G> {
        self.graphlet
    }

    fn refresh(&mut self) {
        self.candidates = self.policy.candidates(&self.graphlet);
        self.weight = self.candidates.iter().map(|candidate| candidate.weight).sum();
    }

    fn transition(&mut self) -> Result<()> {
        if self.candidates.is_empty() {
            return Err(GraphletError::NoTransitions {
                vertices: self.graphlet.vertices().collect(),
            });
        }
        let choice = EnumeratedDistribution::new(
            self.candidates
                .iter()
                .map(|candidate| (*candidate, candidate.weight)),
        )?;
        let SwitchCandidate { remove, insert, .. } = *choice.sample(&mut self.rng);
        trace!(remove, insert, "walk transition");
        self.graphlet.swap(remove, insert)?;
        self.real_steps += 1;
        self.refresh();
        Ok(())
    }
}

impl<G: HostGraph, P: TransitionPolicy> GraphletWalk for RandomWalk<G, P> {
    type Graph = G;

    fn graphlet(&self) -> &Graphlet<G> {
        &self.graphlet
    }

    fn steps(&self) -> u64 {
        self.steps
    }

    fn real_steps(&self) -> u64 {
        self.real_steps
    }

    fn state_weight(&self) -> f64 {
        self.weight
    }

    fn switch_candidates(&self) -> &[SwitchCandidate] {
        &self.candidates
    }

    fn step(&mut self) -> Result<()> {
        self.transition()?;
        self.steps += 1;
        Ok(())
    }

    fn step_many(&mut self, budget: u64) -> Result<u64> {
        if budget == 0 {
            return Ok(0);
        }
        if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            debug!(steps = self.steps, "walk cancelled");
            return Err(GraphletError::Cancelled);
        }
        let loops = geometric_failures(&mut self.rng, self.weight / self.upper_bound);
        if loops >= budget {
            self.steps += budget;
            return Ok(budget);
        }
        self.transition()?;
        self.steps += loops + 1;
        Ok(loops + 1)
    }
}
