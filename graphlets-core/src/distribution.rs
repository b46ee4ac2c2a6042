//! Discrete sampling helpers.
//!
//! [`EnumeratedDistribution`] draws values proportionally to fixed weights;
//! [`geometric_failures`] draws how many self-loops a walk spends in a state.

use rand::{Rng, distributions::Standard};

use crate::error::{GraphletError, Result};

/// Immutable weighted choice over a list of values.
///
/// Sampling draws a uniform point in `[0, total)` and binary-searches the
/// cumulative weights, so zero-weight values are never returned. The
/// distribution holds no RNG and can be shared across threads.
///
/// # Examples
/// ```
/// use graphlets_core::EnumeratedDistribution;
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let dist = EnumeratedDistribution::new([("rare", 1.0), ("never", 0.0), ("common", 9.0)])?;
/// let mut rng = SmallRng::seed_from_u64(1);
/// let draw = *dist.sample(&mut rng);
/// assert!(draw == "rare" || draw == "common");
/// # Ok::<(), graphlets_core::GraphletError>(())
/// ```
#[derive(Clone, Debug)]
pub struct EnumeratedDistribution<V> {
    values: Vec<V>,
    cumulative: Vec<f64>,
}

impl<V> EnumeratedDistribution<V> {
    /// Builds the distribution from `(value, weight)` pairs.
    ///
    /// # Errors
    /// Returns [`GraphletError::InvalidDistribution`] when there are no
    /// values, a weight is negative or not finite, or all weights are zero.
    pub fn new(weighted: impl IntoIterator<Item = (V, f64)>) -> Result<Self> {
        let mut values = Vec::new();
        let mut cumulative = Vec::new();
        let mut total = 0.0_f64;
        for (value, weight) in weighted {
            if !weight.is_finite() || weight < 0.0 {
                return Err(GraphletError::InvalidDistribution {
                    reason: "weights must be finite and non-negative",
                });
            }
            total += weight;
            values.push(value);
            cumulative.push(total);
        }
        if values.is_empty() {
            return Err(GraphletError::InvalidDistribution {
                reason: "no values to choose from",
            });
        }
        if total <= 0.0 {
            return Err(GraphletError::InvalidDistribution {
                reason: "all weights are zero",
            });
        }
        Ok(Self { values, cumulative })
    }

    /// Draws one value.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &V {
        &self.values[self.sample_index(rng)]
    }

    /// Draws the index of one value.
    pub fn sample_index<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let unit: f64 = rng.sample(Standard);
        let point = unit * self.total_weight();
        let index = self.cumulative.partition_point(|&bound| bound <= point);
        index.min(self.values.len() - 1)
    }

    /// Sum of all weights.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Number of values, including zero-weight ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`; construction rejects empty inputs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values in insertion order.
    #[must_use]
    pub fn values(&self) -> &[V] {
        &self.values
    }
}

/// Number of failures before the first success of a Bernoulli(`p`) sequence.
///
/// `p >= 1` always yields zero and `p <= 0` yields [`u64::MAX`], which callers
/// treat as "never leaves".
pub fn geometric_failures<R: Rng + ?Sized>(rng: &mut R, p: f64) -> u64 {
    if p >= 1.0 {
        return 0;
    }
    if p <= 0.0 || p.is_nan() {
        return u64::MAX;
    }
    let unit: f64 = rng.sample(Standard);
    // 1 - unit lies in (0, 1], keeping the logarithm finite.
    let failures = ((1.0 - unit).ln() / (1.0 - p).ln()).floor();
    // Float-to-int casts saturate, which is the intended clamp here.
    failures as u64
}
