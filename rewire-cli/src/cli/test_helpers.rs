//! Small helpers shared across CLI tests.
//!
//! The CLI unit tests build temporary graph files and assert error handling
//! behaviour. These helpers keep the test cases concise and consistent.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::commands::NoCandidateArg;
use super::{CliError, TestCommand};

pub(super) fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

pub(super) fn create_text_file(dir: &TempDir, name: &str, contents: &str) -> io::Result<PathBuf> {
    let path = dir.path().join(name);
    let mut file = File::create(&path)?;
    file.write_all(contents.as_bytes())?;
    Ok(path)
}

/// Escape-format ring over `nodes` vertices.
pub(super) fn ring_file(dir: &TempDir, nodes: usize) -> io::Result<PathBuf> {
    let mut contents = format!("{nodes} {nodes}\n");
    for node in 0..nodes {
        contents.push_str(&format!("{node} {}\n", (node + 1) % nodes));
    }
    create_text_file(dir, "ring.edges", &contents)
}

/// Escape-format star with `leaves` leaves around node 0.
pub(super) fn star_file(dir: &TempDir, leaves: usize) -> io::Result<PathBuf> {
    let mut contents = format!("{} {leaves}\n", leaves + 1);
    for leaf in 1..=leaves {
        contents.push_str(&format!("0 {leaf}\n"));
    }
    create_text_file(dir, "star.edges", &contents)
}

/// A `test` command with the CLI defaults and a short walk.
pub(super) fn test_command(graph: &Path, motif_size: usize, num_steps: usize) -> TestCommand {
    TestCommand {
        graph: graph.to_path_buf(),
        motif_size,
        num_steps,
        threshold: 0.01,
        seed: 17,
        repeat_limit: 10,
        no_candidate: NoCandidateArg::Record,
        retry_attempts: 1000,
        parallel: false,
        oracle_dir: None,
        trajectory_out: None,
    }
}

pub(super) fn expect_error<T>(result: Result<T, CliError>, panic_msg: &str) -> CliError {
    match result {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}
