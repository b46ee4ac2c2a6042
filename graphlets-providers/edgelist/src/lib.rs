//! Plain-text edge-list loader producing symmetric loop-free host graphs.
//!
//! Each non-comment line holds two whitespace-separated vertex ids. Lines
//! starting with `#` or `%` and blank lines are skipped; further columns (for
//! example weights) are ignored. Edges are symmetrized, self-loops dropped,
//! and duplicates merged.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use graphlets_core::{AdjacencyGraph, GraphletError};
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors raised while loading an edge list.
#[derive(Debug, Error)]
pub enum EdgeListError {
    /// The file could not be opened or read.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// A line did not hold two vertex ids.
    #[error("line {line}: {reason}")]
    Parse {
        /// One-based line number.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },
    /// An explicit vertex count was smaller than the largest id requires.
    #[error("vertex count {declared} is too small for vertex id {max_id}")]
    VertexCountTooSmall {
        /// Declared count.
        declared: usize,
        /// Largest id in the file.
        max_id: usize,
    },
    /// The edges could not be assembled into a graph.
    #[error(transparent)]
    Graph(#[from] GraphletError),
}

/// Undirected edges read from a text source.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EdgeList {
    num_vertices: usize,
    edges: Vec<(usize, usize)>,
    skipped_loops: usize,
}

impl EdgeList {
    /// Number of vertices of the resulting graph.
    #[must_use]
    pub const fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    /// Edges in file order, self-loops excluded.
    #[must_use]
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Self-loops dropped while reading.
    #[must_use]
    pub const fn skipped_loops(&self) -> usize {
        self.skipped_loops
    }

    /// Builds the symmetric host graph.
    ///
    /// # Errors
    /// Returns [`EdgeListError::Graph`] if an edge falls outside the vertex
    /// range, which a loaded list never does.
    pub fn into_graph(self) -> Result<AdjacencyGraph, EdgeListError> {
        Ok(AdjacencyGraph::from_edges(self.num_vertices, self.edges)?)
    }
}

/// Reads edge lists.
///
/// # Examples
/// ```
/// use graphlets_core::HostGraph;
/// use graphlets_providers_edgelist::EdgeListLoader;
///
/// let text = "# triangle\n0 1\n1 2\n2 0\n2 2\n";
/// let graph = EdgeListLoader::new()
///     .read(text.as_bytes())?
///     .into_graph()?;
/// assert_eq!(graph.num_vertices(), 3);
/// assert_eq!(graph.num_arcs(), 6);
/// # Ok::<(), graphlets_providers_edgelist::EdgeListError>(())
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeListLoader {
    vertex_count: Option<usize>,
}

impl EdgeListLoader {
    /// Loader inferring the vertex count as the largest id plus one.
    #[must_use]
    pub const fn new() -> Self {
        Self { vertex_count: None }
    }

    /// Fixes the vertex count, keeping isolated trailing vertices.
    #[must_use]
    pub const fn with_vertex_count(mut self, vertices: usize) -> Self {
        self.vertex_count = Some(vertices);
        self
    }

    /// Reads the file at `path`.
    ///
    /// # Errors
    /// Returns [`EdgeListError::Io`] when the file cannot be read and the
    /// errors of [`Self::read`] otherwise.
    #[instrument(name = "edgelist.load", err, skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn load(self, path: impl AsRef<Path>) -> Result<EdgeList, EdgeListError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| EdgeListError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.read(BufReader::new(file)).map_err(|err| match err {
            EdgeListError::Io { source, .. } => EdgeListError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Reads edges from `reader`.
    ///
    /// # Errors
    /// Returns [`EdgeListError::Parse`] for lines without two vertex ids,
    /// [`EdgeListError::VertexCountTooSmall`] when an explicit count does not
    /// cover every id, and [`EdgeListError::Io`] on read failures.
    pub fn read(self, reader: impl BufRead) -> Result<EdgeList, EdgeListError> {
        let mut list = EdgeList::default();
        let mut max_id = None;
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| EdgeListError::Io {
                path: PathBuf::new(),
                source,
            })?;
            let Some((left, right)) = parse_line(&line, index + 1)? else {
                continue;
            };
            max_id = max_id.max(Some(left.max(right)));
            if left == right {
                list.skipped_loops += 1;
            } else {
                list.edges.push((left, right));
            }
        }
        let required = max_id.map_or(0, |id| id + 1);
        list.num_vertices = match self.vertex_count {
            Some(declared) if declared < required => {
                return Err(EdgeListError::VertexCountTooSmall {
                    declared,
                    max_id: required - 1,
                });
            }
            Some(declared) => declared,
            None => required,
        };
        debug!(
            vertices = list.num_vertices,
            edges = list.edges.len(),
            skipped_loops = list.skipped_loops,
            "edge list read"
        );
        Ok(list)
    }
}

fn parse_line(line: &str, number: usize) -> Result<Option<(usize, usize)>, EdgeListError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(['#', '%']) {
        return Ok(None);
    }
    let mut fields = trimmed.split_whitespace();
    let (Some(left), Some(right)) = (fields.next(), fields.next()) else {
        return Err(EdgeListError::Parse {
            line: number,
            reason: "expected two vertex ids".to_owned(),
        });
    };
    let parse = |field: &str| {
        field.parse::<usize>().map_err(|err| EdgeListError::Parse {
            line: number,
            reason: format!("invalid vertex id `{field}`: {err}"),
        })
    };
    Ok(Some((parse(left)?, parse(right)?)))
}
