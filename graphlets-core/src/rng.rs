//! Per-worker RNG seeding.

use rand::{SeedableRng, rngs::SmallRng};

/// SplitMix64 increment (the 64-bit golden ratio) used for per-worker seed
/// derivation.
const WORKER_SEED_SPACING: u64 = 0x9E37_79B9_7F4A_7C15;
const SPLITMIX_MULT_A: u64 = 0xBF58_476D_1CE4_E5B9;
const SPLITMIX_MULT_B: u64 = 0x94D0_49BB_1331_11EB;

/// Derives an independent seed for `worker_index` from `base_seed`.
#[inline]
#[must_use]
pub fn mix_worker_seed(base_seed: u64, worker_index: usize) -> u64 {
    splitmix64(base_seed ^ ((worker_index as u64 + 1).wrapping_mul(WORKER_SEED_SPACING)))
}

#[inline]
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(WORKER_SEED_SPACING);
    state = (state ^ (state >> 30)).wrapping_mul(SPLITMIX_MULT_A);
    state = (state ^ (state >> 27)).wrapping_mul(SPLITMIX_MULT_B);
    state ^ (state >> 31)
}

/// Builds the generator owned by one worker.
#[must_use]
pub fn worker_rng(base_seed: u64, worker_index: usize) -> SmallRng {
    SmallRng::seed_from_u64(mix_worker_seed(base_seed, worker_index))
}
