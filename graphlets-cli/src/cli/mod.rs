//! Command-line interface for graphlet censuses and sampling.
//!
//! Every command loads an edge-list host graph, runs one pipeline, and prints
//! the resulting signature histogram.

mod commands;

pub use commands::{
    Cli, CliError, ColorCodingCommand, Command, ExecutionSummary, ExhaustiveCommand, FlavorArg,
    GraphArgs, PolicyArg, ReplayCommand, WalkCommand, render_summary, run_cli,
};

#[cfg(test)]
mod test_helpers;
