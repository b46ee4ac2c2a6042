//! Small helpers shared across CLI tests.

use std::path::PathBuf;

use graphlets_test_support::fixtures::EdgeListFile;

use super::{CliError, GraphArgs};

pub(super) fn graph_file(edges: &[(usize, usize)]) -> EdgeListFile {
    match EdgeListFile::write(edges) {
        Ok(file) => file,
        Err(err) => panic!("failed to write edge list: {err}"),
    }
}

pub(super) fn graph_args(file: &EdgeListFile) -> GraphArgs {
    GraphArgs {
        graph: file.path().to_path_buf(),
        vertices: None,
    }
}

pub(super) fn sibling(file: &EdgeListFile, name: &str) -> PathBuf {
    file.dir().join(name)
}

pub(super) fn expect_error<T>(result: Result<T, CliError>, panic_msg: &str) -> CliError {
    match result {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}
