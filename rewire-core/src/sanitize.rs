//! Conversion of raw edge lists into simple undirected graphs.
//!
//! Raw lists carry arbitrary node labels and often extra columns (weights,
//! timestamps). Sanitising keeps the first two tokens of every line, drops
//! self-loops and repeated edges, and maps labels to `0..n` in order of first
//! appearance.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use tracing::{info, instrument};

use crate::{
    error::{FormatErrorKind, GraphError},
    graph::{Graph, Relabeling},
};

/// Tally of what sanitising discarded.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SanitizeReport {
    /// Edge lines read, including dropped ones.
    pub edge_lines: usize,
    /// Blank and `#` lines skipped.
    pub skipped_lines: usize,
    /// Lines whose endpoints carried the same label.
    pub self_loops: usize,
    /// Lines repeating an earlier edge in either direction.
    pub duplicates: usize,
}

/// A sanitised graph together with the labels behind its ids.
#[derive(Clone, Debug)]
pub struct Sanitized {
    /// Undirected graph over ids `0..n`.
    pub graph: Graph,
    /// Bijection from raw labels to ids.
    pub relabeling: Relabeling<String>,
    /// What was dropped on the way.
    pub report: SanitizeReport,
}

/// Sanitises a raw edge list read from `path`.
///
/// # Errors
/// Returns [`GraphError::Io`] when the file cannot be read and
/// [`GraphError::Format`] for lines with fewer than two tokens.
#[instrument(
    name = "core.sanitize",
    err,
    skip(path),
    fields(path = %path.as_ref().display()),
)]
pub fn sanitize_path(path: impl AsRef<Path>) -> Result<Sanitized, GraphError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| GraphError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let sanitized = sanitize(BufReader::new(file), path)?;
    info!(
        nodes = sanitized.graph.node_count(),
        edges = sanitized.graph.edge_count(),
        self_loops = sanitized.report.self_loops,
        duplicates = sanitized.report.duplicates,
        "sanitised raw edge list"
    );
    Ok(sanitized)
}

/// Sanitises a raw edge list from an in-memory reader.
///
/// # Errors
/// Same as [`sanitize_path`].
///
/// # Examples
/// ```
/// use rewire_core::sanitize_reader;
///
/// let raw = "# weighted\nb a 0.5\na b 0.7\nc c 1.0\nc a 2.0\n";
/// let sanitized = sanitize_reader(raw.as_bytes())?;
/// assert_eq!(sanitized.graph.edge_count(), 2);
/// assert_eq!(sanitized.relabeling.id("b"), Some(0));
/// assert_eq!(sanitized.report.duplicates, 1);
/// assert_eq!(sanitized.report.self_loops, 1);
/// # Ok::<(), rewire_core::GraphError>(())
/// ```
pub fn sanitize_reader<R: BufRead>(reader: R) -> Result<Sanitized, GraphError> {
    sanitize(reader, Path::new("<reader>"))
}

fn sanitize<R: BufRead>(reader: R, origin: &Path) -> Result<Sanitized, GraphError> {
    let mut graph = Graph::new(false);
    let mut relabeling = Relabeling::new(0);
    let mut report = SanitizeReport::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| GraphError::Io {
            path: origin.to_path_buf(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            report.skipped_lines += 1;
            continue;
        }
        let mut tokens = trimmed.split_whitespace();
        let (Some(source), Some(target)) = (tokens.next(), tokens.next()) else {
            return Err(GraphError::Format {
                line: index + 1,
                kind: FormatErrorKind::EdgeArity { tokens: 1 },
            });
        };
        report.edge_lines += 1;
        if source == target {
            report.self_loops += 1;
            continue;
        }
        let source = relabeling.assign(source.to_owned());
        let target = relabeling.assign(target.to_owned());
        match graph.add_edge(source, target) {
            Ok(()) => {}
            Err(GraphError::DuplicateEdge { .. }) => report.duplicates += 1,
            Err(other) => return Err(other),
        }
    }
    Ok(Sanitized {
        graph,
        relabeling,
        report,
    })
}
