//! Benchmark support crate for graphlets.
//!
//! Provides synthetic host graphs and parameter labels for the Criterion
//! benchmarks of exhaustive enumeration, the color-coding fill, and random
//! walks.

pub mod error;
pub mod params;

use graphlets_core::{AdjacencyGraph, generators};

use crate::{error::BenchSetupError, params::HostParams};

/// Builds the Erdős–Rényi host described by `params`.
///
/// # Errors
/// Returns [`BenchSetupError::Graph`] when the edge count exceeds the number
/// of vertex pairs.
pub fn synthetic_host(params: &HostParams) -> Result<AdjacencyGraph, BenchSetupError> {
    if params.vertices == 0 {
        return Err(BenchSetupError::ZeroValue {
            context: "host vertices",
        });
    }
    Ok(generators::erdos_renyi(
        params.vertices,
        params.edges,
        params.seed,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use graphlets_core::HostGraph;
    use rstest::rstest;

    #[rstest]
    #[case(HostParams::new(50, 100, 1))]
    #[case(HostParams::new(200, 600, 2))]
    fn hosts_have_the_requested_edges(#[case] params: HostParams) {
        let host = synthetic_host(&params).expect("host must build");
        assert_eq!(host.num_vertices(), params.vertices);
        assert_eq!(host.num_arcs(), 2 * params.edges);
    }

    #[test]
    fn empty_hosts_are_rejected() {
        let err = synthetic_host(&HostParams::new(0, 0, 0)).expect_err("no vertices");
        assert!(matches!(err, BenchSetupError::ZeroValue { .. }));
    }
}
