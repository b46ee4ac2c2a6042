//! Command implementations and argument parsing for the graphlets CLI.

use std::{
    io::{self, Write},
    num::NonZeroUsize,
    path::PathBuf,
};

use clap::{Args, Parser, Subcommand, ValueEnum};
use graphlets_core::{
    AdjacencyGraph, CanonicalizerKind, ColorCodingOptions, ExhaustiveOptions, GraphletError,
    HistoryError, HistoryPaths, HostGraph, SignatureHistogram, TreeletFlavor, WalkPolicy,
    WalkSamplerOptions,
};
use graphlets_providers_edgelist::{EdgeListError, EdgeListLoader};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "graphlets", about = "Count and sample graphlets of a host graph.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Enumerate every connected induced subgraph of size k.
    Exhaustive(ExhaustiveCommand),
    /// Sample occurrences uniformly through color coding.
    ColorCoding(ColorCodingCommand),
    /// Sample through random walks, or record a walk history.
    Walk(WalkCommand),
    /// Replay a recorded walk history.
    Replay(ReplayCommand),
}

/// Host graph input shared by every command.
#[derive(Debug, Args, Clone)]
pub struct GraphArgs {
    /// Edge-list file with one `u v` pair per line.
    pub graph: PathBuf,

    /// Vertex count; defaults to the largest id plus one.
    #[arg(long)]
    pub vertices: Option<usize>,
}

/// Options accepted by the `exhaustive` command.
#[derive(Debug, Args, Clone)]
pub struct ExhaustiveCommand {
    /// Host graph.
    #[command(flatten)]
    pub input: GraphArgs,

    /// Graphlet size.
    #[arg(short = 'k', long = "size")]
    pub size: usize,

    /// Stop after this many motifs.
    #[arg(long)]
    pub limit: Option<u64>,

    /// Worker threads; defaults to the available parallelism.
    #[arg(long)]
    pub threads: Option<NonZeroUsize>,

    /// Motifs canonicalized per batch.
    #[arg(long = "batch-size")]
    pub batch_size: Option<usize>,

    /// Use the precomputed canonical table instead of on-demand search.
    #[arg(long)]
    pub eager: bool,
}

/// Treelet flavors selectable on the command line.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum FlavorArg {
    /// Children ordered by root color.
    Colored,
    /// Children keyed by color set.
    #[default]
    SetColored,
}

impl From<FlavorArg> for TreeletFlavor {
    fn from(flavor: FlavorArg) -> Self {
        match flavor {
            FlavorArg::Colored => Self::Colored,
            FlavorArg::SetColored => Self::SetColored,
        }
    }
}

/// Options accepted by the `color-coding` command.
#[derive(Debug, Args, Clone)]
pub struct ColorCodingCommand {
    /// Host graph.
    #[command(flatten)]
    pub input: GraphArgs,

    /// Graphlet size.
    #[arg(short = 'k', long = "size")]
    pub size: usize,

    /// Accepted samples to draw.
    #[arg(short = 'n', long = "samples")]
    pub samples: u64,

    /// Worker threads; defaults to the available parallelism.
    #[arg(long)]
    pub threads: Option<NonZeroUsize>,

    /// Treelet flavor of the counting tables.
    #[arg(long, value_enum, default_value_t = FlavorArg::default())]
    pub flavor: FlavorArg,

    /// Seed for the coloring and the samplers.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

/// Walk transition rules selectable on the command line.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum PolicyArg {
    /// Uniform over all connected swaps.
    #[default]
    Full,
    /// Crowding-damped swap weights.
    Smart,
    /// Removable members only.
    Coward,
}

impl From<PolicyArg> for WalkPolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::Full => Self::Full,
            PolicyArg::Smart => Self::Smart,
            PolicyArg::Coward => Self::Coward,
        }
    }
}

/// Options accepted by the `walk` command.
#[derive(Debug, Args, Clone)]
pub struct WalkCommand {
    /// Host graph.
    #[command(flatten)]
    pub input: GraphArgs,

    /// Graphlet size.
    #[arg(short = 'k', long = "size")]
    pub size: usize,

    /// Walks to run (or record).
    #[arg(short = 'n', long = "samples")]
    pub samples: u64,

    /// Steps per walk.
    #[arg(short = 't', long = "steps")]
    pub steps: u64,

    /// Transition rule.
    #[arg(long, value_enum, default_value_t = PolicyArg::default())]
    pub policy: PolicyArg,

    /// Steps between signatures written to `--samples-out`.
    #[arg(long)]
    pub interval: Option<u64>,

    /// Leading samples left out of the histogram.
    #[arg(long, default_value_t = 0)]
    pub discard: u64,

    /// File receiving each walk's interval signatures.
    #[arg(long = "samples-out")]
    pub samples_out: Option<PathBuf>,

    /// File receiving each walk's final vertex set.
    #[arg(long = "final-states")]
    pub final_states: Option<PathBuf>,

    /// Record walk histories to `<BASENAME>.states` and `<BASENAME>.degrees`
    /// instead of sampling.
    #[arg(long, value_name = "BASENAME")]
    pub record: Option<PathBuf>,

    /// Worker threads; defaults to the available parallelism.
    #[arg(long)]
    pub threads: Option<NonZeroUsize>,

    /// Base seed of the walks.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

/// Options accepted by the `replay` command.
#[derive(Debug, Args, Clone)]
pub struct ReplayCommand {
    /// Basename of the recorded history.
    pub basename: PathBuf,

    /// Host graph.
    #[command(flatten)]
    pub input: GraphArgs,

    /// Graphlet size of the recorded states.
    #[arg(short = 'k', long = "size")]
    pub size: usize,

    /// Samples to take.
    #[arg(short = 'n', long = "samples")]
    pub samples: u64,

    /// Virtual steps between samples.
    #[arg(short = 't', long = "steps")]
    pub steps: u64,

    /// Leading samples left out of the histogram.
    #[arg(long, default_value_t = 0)]
    pub discard: u64,

    /// Seed of the self-loop draws.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The host graph could not be loaded.
    #[error(transparent)]
    EdgeList(#[from] EdgeListError),
    /// A pipeline failed.
    #[error(transparent)]
    Core(#[from] GraphletError),
    /// Recording or replaying a walk history failed.
    #[error(transparent)]
    History(#[from] HistoryError),
}

impl CliError {
    /// Stable code of the underlying library error, if it carries one.
    #[must_use]
    pub const fn code(&self) -> Option<&'static str> {
        match self {
            Self::EdgeList(EdgeListError::Graph(err)) | Self::Core(err) => {
                Some(err.code().as_str())
            }
            Self::History(err) => Some(err.code().as_str()),
            Self::EdgeList(_) => None,
        }
    }
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone, Default)]
pub struct ExecutionSummary {
    /// Signature counts to print.
    pub histogram: SignatureHistogram,
    /// Motifs, accepted samples, walks, or recorded states.
    pub items: u64,
    /// Samples rejected by color coding.
    pub rejected: u64,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading the graph or running the pipeline fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use graphlets_cli::cli::{Cli, Command, ExhaustiveCommand, GraphArgs, run_cli};
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(file.path(), "0 1\n1 2\n2 0\n")?;
/// let cli = Cli {
///     command: Command::Exhaustive(ExhaustiveCommand {
///         input: GraphArgs { graph: file.path().to_path_buf(), vertices: None },
///         size: 3,
///         limit: None,
///         threads: None,
///         batch_size: None,
///         eager: false,
///     }),
/// };
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.items, 1);
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    let span = Span::current();
    match cli.command {
        Command::Exhaustive(command) => {
            span.record("command", "exhaustive");
            run_exhaustive(command)
        }
        Command::ColorCoding(command) => {
            span.record("command", "color-coding");
            run_color_coding(command)
        }
        Command::Walk(command) => {
            span.record("command", "walk");
            run_walk(command)
        }
        Command::Replay(command) => {
            span.record("command", "replay");
            run_replay(command)
        }
    }
}

#[instrument(name = "cli.load_graph", err, skip(input), fields(path = field::Empty))]
pub(super) fn load_graph(input: &GraphArgs) -> Result<AdjacencyGraph, CliError> {
    Span::current().record("path", field::display(input.graph.display()));
    let mut loader = EdgeListLoader::new();
    if let Some(vertices) = input.vertices {
        loader = loader.with_vertex_count(vertices);
    }
    let graph = loader.load(&input.graph)?.into_graph()?;
    info!(
        vertices = graph.num_vertices(),
        arcs = graph.num_arcs(),
        max_degree = graph.max_degree(),
        "host graph loaded"
    );
    Ok(graph)
}

pub(super) fn run_exhaustive(command: ExhaustiveCommand) -> Result<ExecutionSummary, CliError> {
    let graph = load_graph(&command.input)?;
    let mut options = ExhaustiveOptions::new(command.size);
    if let Some(threads) = command.threads {
        options = options.with_threads(threads);
    }
    if let Some(batch_size) = command.batch_size {
        options = options.with_batch_size(batch_size);
    }
    if let Some(limit) = command.limit {
        options = options.with_limit(limit);
    }
    if command.eager {
        options = options.with_canonicalizer(CanonicalizerKind::Eager);
    }
    let report = options.build()?.run(graph)?;
    Ok(ExecutionSummary {
        histogram: report.histogram,
        items: report.motifs,
        rejected: 0,
    })
}

pub(super) fn run_color_coding(command: ColorCodingCommand) -> Result<ExecutionSummary, CliError> {
    let graph = load_graph(&command.input)?;
    let mut options = ColorCodingOptions::new(command.size, command.samples)
        .with_flavor(command.flavor.into())
        .with_seed(command.seed);
    if let Some(threads) = command.threads {
        options = options.with_threads(threads);
    }
    let report = options.build()?.run(graph)?;
    for slice in &report.slices {
        info!(
            size = slice.size,
            max_types = slice.max_types_per_root,
            max_count = %slice.max_count,
            total = %slice.total,
            "treelet slice"
        );
    }
    Ok(ExecutionSummary {
        histogram: report.histogram,
        items: report.accepted,
        rejected: report.rejected,
    })
}

pub(super) fn run_walk(command: WalkCommand) -> Result<ExecutionSummary, CliError> {
    let graph = load_graph(&command.input)?;
    let mut options = WalkSamplerOptions::new(command.size, command.samples, command.steps)
        .with_policy(command.policy.into())
        .with_discard(command.discard)
        .with_seed(command.seed);
    if let Some(interval) = command.interval {
        options = options.with_interval(interval);
    }
    if let Some(threads) = command.threads {
        options = options.with_threads(threads);
    }
    if let Some(path) = command.samples_out {
        options = options.with_samples_out(path);
    }
    if let Some(path) = command.final_states {
        options = options.with_final_states(path);
    }
    let pipeline = options.build()?;
    if let Some(basename) = command.record {
        let recorded = pipeline.record(graph, HistoryPaths::new(&basename))?;
        return Ok(ExecutionSummary {
            items: recorded,
            ..ExecutionSummary::default()
        });
    }
    let report = pipeline.run(graph)?;
    Ok(ExecutionSummary {
        histogram: report.histogram,
        items: report.samples,
        rejected: 0,
    })
}

pub(super) fn run_replay(command: ReplayCommand) -> Result<ExecutionSummary, CliError> {
    let graph = load_graph(&command.input)?;
    let pipeline = WalkSamplerOptions::new(command.size, command.samples, command.steps)
        .with_discard(command.discard)
        .with_seed(command.seed)
        .build()?;
    let report = pipeline.replay(graph, HistoryPaths::new(&command.basename))?;
    Ok(ExecutionSummary {
        histogram: report.histogram,
        items: report.samples,
        rejected: 0,
    })
}

/// Renders `summary` as histogram lines sorted by decreasing count.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use graphlets_cli::cli::{ExecutionSummary, render_summary};
/// # use graphlets_core::Signature;
/// let mut summary = ExecutionSummary::default();
/// summary.histogram.add(Signature::from_u64(3, 0b111)?);
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// assert_eq!(String::from_utf8(buffer)?, "7: 1 (100.00%)\n");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    write!(writer, "{}", summary.histogram)
}
