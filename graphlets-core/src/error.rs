//! Error types for the graphlets core library.
//!
//! Defines the error enums exposed by the public API, their stable codes, and
//! a convenient result alias.

use std::{fmt, io, path::PathBuf, sync::Arc};

use thiserror::Error;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? $( ( $($tuple:tt)* ) )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? $( ( $($tuple)* ) )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Coarse classification shared by every error in the crate.
///
/// Callers use the kind to decide whether to stop cleanly
/// ([`ErrorKind::DataExhausted`]), report a usage problem
/// ([`ErrorKind::InvalidInput`]), or give up on a backend
/// ([`ErrorKind::Unsupported`]).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The caller supplied arguments the algorithm cannot work with.
    InvalidInput,
    /// Persisted data ran out before the requested work was satisfied.
    DataExhausted,
    /// The host graph lacks a capability the algorithm needs.
    Unsupported,
    /// The operation observed a cancellation request.
    Cancelled,
    /// An internal invariant was violated or a runtime resource failed.
    Internal,
}

/// Error type produced by graphlet enumeration, canonicalization, color
/// coding, and random walks.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GraphletError {
    /// A signature was requested in a width that cannot hold the pattern.
    #[error("graphs of order {order} need {bits} signature bits but at most {max_bits} fit")]
    SignatureTooWide {
        /// Number of vertices of the graph.
        order: usize,
        /// Bits required by the lower-triangular encoding.
        bits: usize,
        /// Bits available in the requested representation.
        max_bits: usize,
    },
    /// A graph of the wrong order was handed to a canonicalizer.
    #[error("expected a graph of order {expected} but got order {actual}")]
    OrderMismatch {
        /// Order the canonicalizer was built for.
        expected: usize,
        /// Order of the supplied graph.
        actual: usize,
    },
    /// The eager canonicalizer only classifies connected patterns.
    #[error("pattern {pattern} of order {order} is not connected")]
    DisconnectedPattern {
        /// Rendered pattern that failed the connectivity check.
        pattern: Arc<str>,
        /// Order of the pattern.
        order: usize,
    },
    /// A graphlet size was outside the supported range.
    #[error("graphlet size {size} is outside the supported range {min}..={max}")]
    InvalidSize {
        /// The rejected size.
        size: usize,
        /// Smallest supported size.
        min: usize,
        /// Largest supported size.
        max: usize,
    },
    /// A vertex id was not present in the host graph.
    #[error("vertex {vertex} is out of range for a graph with {vertices} vertices")]
    VertexOutOfRange {
        /// The offending vertex id.
        vertex: usize,
        /// Number of vertices in the host graph.
        vertices: usize,
    },
    /// No connected graphlet of the requested size could be seeded.
    #[error("no valid starting graphlet of size {size} reachable from {}", describe_seed(*seed))]
    NoStartingGraphlet {
        /// Requested seed vertex, if any.
        seed: Option<usize>,
        /// Requested graphlet size.
        size: usize,
    },
    /// A walk state has no switchable pair so no real transition exists.
    #[error("graphlet {vertices:?} has no switchable vertex pair")]
    NoTransitions {
        /// Vertex set of the stuck state.
        vertices: Vec<usize>,
    },
    /// Color coding needs random access to the host graph.
    #[error("color coding requires a host graph with random access")]
    RandomAccessUnsupported,
    /// An operation was invoked before the stage it depends on.
    #[error("{operation} requires {stage} to run first")]
    NotReady {
        /// The operation that was attempted.
        operation: &'static str,
        /// The stage that has not completed.
        stage: &'static str,
    },
    /// The color-coding tables contain no colorful occurrence of the size.
    #[error("no colorful occurrence of size {size} exists under the current coloring")]
    NoColorfulOccurrence {
        /// Requested occurrence size.
        size: usize,
    },
    /// A supplied coloring did not match the host graph or palette.
    #[error("invalid coloring: {reason}")]
    InvalidColoring {
        /// Description of the mismatch.
        reason: Arc<str>,
    },
    /// A discrete distribution could not be built from its weights.
    #[error("invalid distribution: {reason}")]
    InvalidDistribution {
        /// Description of the rejected weights.
        reason: &'static str,
    },
    /// A configuration value was rejected.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the parameter.
        name: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
    /// The worker pool could not be created.
    #[error("failed to build worker pool: {message}")]
    ThreadPool {
        /// Message reported by the pool builder.
        message: Arc<str>,
    },
    /// The operation was cancelled through a [`crate::CancellationToken`].
    #[error("operation was cancelled")]
    Cancelled,
}

fn describe_seed(seed: Option<usize>) -> String {
    seed.map_or_else(|| "any vertex".to_owned(), |vertex| format!("vertex {vertex}"))
}

define_error_codes! {
    /// Stable codes describing [`GraphletError`] variants.
    enum GraphletErrorCode for GraphletError {
        /// A signature was requested in a width that cannot hold the pattern.
        SignatureTooWide => SignatureTooWide { .. } => "GRAPHLET_SIGNATURE_TOO_WIDE",
        /// A graph of the wrong order was handed to a canonicalizer.
        OrderMismatch => OrderMismatch { .. } => "GRAPHLET_ORDER_MISMATCH",
        /// The eager canonicalizer only classifies connected patterns.
        DisconnectedPattern => DisconnectedPattern { .. } => "GRAPHLET_DISCONNECTED_PATTERN",
        /// A graphlet size was outside the supported range.
        InvalidSize => InvalidSize { .. } => "GRAPHLET_INVALID_SIZE",
        /// A vertex id was not present in the host graph.
        VertexOutOfRange => VertexOutOfRange { .. } => "GRAPHLET_VERTEX_OUT_OF_RANGE",
        /// No connected graphlet of the requested size could be seeded.
        NoStartingGraphlet => NoStartingGraphlet { .. } => "GRAPHLET_NO_STARTING_GRAPHLET",
        /// A walk state has no switchable pair.
        NoTransitions => NoTransitions { .. } => "GRAPHLET_NO_TRANSITIONS",
        /// Color coding needs random access to the host graph.
        RandomAccessUnsupported => RandomAccessUnsupported => "GRAPHLET_RANDOM_ACCESS_UNSUPPORTED",
        /// An operation was invoked before the stage it depends on.
        NotReady => NotReady { .. } => "GRAPHLET_NOT_READY",
        /// No colorful occurrence exists under the current coloring.
        NoColorfulOccurrence => NoColorfulOccurrence { .. } => "GRAPHLET_NO_COLORFUL_OCCURRENCE",
        /// A supplied coloring did not match the host graph or palette.
        InvalidColoring => InvalidColoring { .. } => "GRAPHLET_INVALID_COLORING",
        /// A discrete distribution could not be built from its weights.
        InvalidDistribution => InvalidDistribution { .. } => "GRAPHLET_INVALID_DISTRIBUTION",
        /// A configuration value was rejected.
        InvalidParameter => InvalidParameter { .. } => "GRAPHLET_INVALID_PARAMETER",
        /// The worker pool could not be created.
        ThreadPool => ThreadPool { .. } => "GRAPHLET_THREAD_POOL",
        /// The operation was cancelled.
        Cancelled => Cancelled => "GRAPHLET_CANCELLED",
    }
}

impl GraphletError {
    /// Classify the error into a coarse [`ErrorKind`].
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::SignatureTooWide { .. }
            | Self::OrderMismatch { .. }
            | Self::DisconnectedPattern { .. }
            | Self::InvalidSize { .. }
            | Self::VertexOutOfRange { .. }
            | Self::NoStartingGraphlet { .. }
            | Self::NotReady { .. }
            | Self::NoColorfulOccurrence { .. }
            | Self::InvalidColoring { .. }
            | Self::InvalidDistribution { .. }
            | Self::InvalidParameter { .. } => ErrorKind::InvalidInput,
            Self::RandomAccessUnsupported => ErrorKind::Unsupported,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::NoTransitions { .. } | Self::ThreadPool { .. } => ErrorKind::Internal,
        }
    }
}

/// Errors raised while recording or replaying a persisted walk history.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum HistoryError {
    /// One of the history streams ended before the requested steps were served.
    #[error("walk history ran out after {states_read} states")]
    DataExhausted {
        /// Number of states consumed before the data ran out.
        states_read: u64,
    },
    /// Reading or writing a history file failed.
    #[error("i/o error on `{path}`: {source}")]
    Io {
        /// File that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// A history line could not be parsed.
    #[error("malformed line {line} in `{path}`: {reason}")]
    Parse {
        /// File containing the malformed line.
        path: PathBuf,
        /// One-based line number.
        line: u64,
        /// Description of the problem.
        reason: Arc<str>,
    },
    /// The replayed states do not fit the host graph.
    #[error(transparent)]
    Graphlet(#[from] GraphletError),
}

define_error_codes! {
    /// Stable codes describing [`HistoryError`] variants.
    enum HistoryErrorCode for HistoryError {
        /// A history stream ran out.
        DataExhausted => DataExhausted { .. } => "HISTORY_DATA_EXHAUSTED",
        /// Reading or writing a history file failed.
        Io => Io { .. } => "HISTORY_IO",
        /// A history line could not be parsed.
        Parse => Parse { .. } => "HISTORY_PARSE",
        /// The replayed states do not fit the host graph.
        Graphlet => Graphlet(..) => "HISTORY_GRAPHLET",
    }
}

impl HistoryError {
    /// Classify the error into a coarse [`ErrorKind`].
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::DataExhausted { .. } => ErrorKind::DataExhausted,
            Self::Io { .. } => ErrorKind::Internal,
            Self::Parse { .. } => ErrorKind::InvalidInput,
            Self::Graphlet(inner) => inner.kind(),
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, GraphletError>;
