//! Graphlet discovery and statistics over large host graphs.
//!
//! The crate counts and samples small connected induced subgraphs
//! (graphlets) and groups them by isomorphism class:
//!
//! - [`ExhaustivePipeline`] enumerates every occurrence of a given size.
//! - [`ColorCodingPipeline`] samples occurrences uniformly through color
//!   coding with spanning-tree rejection.
//! - [`WalkPipeline`] samples through random walks on the graphlet graph and
//!   can record and replay walk histories.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod bfs;
mod cancel;
mod canon;
mod color_coding;
mod distribution;
mod enumerate;
mod error;
mod graphlet;
mod host;
mod rng;
mod sampling;
mod small_graph;
mod spanning;
mod treelet;
mod walk;
mod workers;

pub use crate::{
    bfs::{VisitSummary, capped_bfs, parallel_visit},
    cancel::CancellationToken,
    canon::{
        Canonicalizer, EagerCanonicalizer, LazyCanonicalizer, MAX_EAGER_ORDER, Signature,
        bits_per_graph, pair_index,
    },
    color_coding::{
        ColorCoding, ColorCodingEngine, ColorCodingSampler, ColoredColorCoding, OccurrenceSampler,
        SetColoredColorCoding, SliceStats,
    },
    distribution::{EnumeratedDistribution, geometric_failures},
    enumerate::{EnumerationMode, SubgraphEnumerator},
    error::{
        ErrorKind, GraphletError, GraphletErrorCode, HistoryError, HistoryErrorCode, Result,
    },
    graphlet::Graphlet,
    host::{AdjacencyGraph, HostGraph, SequentialGraph, generators},
    rng::{mix_worker_seed, worker_rng},
    sampling::{
        CanonicalizerKind, ColorCodingOptions, ColorCodingPipeline, ColorCodingReport,
        DEFAULT_BATCH_SIZE, ExhaustiveOptions, ExhaustivePipeline, ExhaustiveReport,
        SignatureHistogram, TreeletFlavor, WalkPipeline, WalkPolicy, WalkReport,
        WalkSamplerOptions,
    },
    small_graph::{MAX_ORDER, SmallGraph},
    spanning::spanning_tree_count,
    treelet::{
        ColorSet, ColoredTreelet, MAX_COLORS, SetColoredTreelet, Treelet, TreeletCache,
        TreeletRef,
    },
    walk::{
        CowardPolicy, CowardWalk, FullPolicy, FullWalk, GraphletWalk, HistoryPaths,
        HistoryReader, RandomWalk, SmartPolicy, SmartWalk, SwitchCandidate, TransitionPolicy,
        VirtualWalk, WalkRecorder, record_walk,
    },
    workers::default_threads,
};
