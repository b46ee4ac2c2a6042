//! Support library for the graphlets CLI binary.
//!
//! Exposes the command pipeline and logging setup so doctests and unit tests
//! can drive commands without forking a subprocess.

pub mod cli;
pub mod logging;
