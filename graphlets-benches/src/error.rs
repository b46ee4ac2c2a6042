//! Benchmark setup error type.
//!
//! Setup functions propagate failures with `?` instead of `.expect()`.

use graphlets_core::GraphletError;

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Host generation or a pipeline stage failed.
    #[error("graphlet operation failed: {0}")]
    Graph(#[from] GraphletError),
    /// A zero value was passed where a non-zero integer was required.
    #[error("expected a non-zero value for {context}")]
    ZeroValue {
        /// The parameter that was unexpectedly zero.
        context: &'static str,
    },
}
