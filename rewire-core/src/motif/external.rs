//! Subprocess oracle speaking the counting-program file protocol.
//!
//! Each call writes the graph in escape layout to a private scratch
//! directory, runs `<program> <input> <size> -i` inside it and reads the
//! `out.txt` the program leaves behind. The results file holds the node
//! count, an integer edge statistic, then one count per pattern.

use std::{
    fs::{self, File},
    io::{self, BufWriter},
    path::{Path, PathBuf},
    process::Command,
};

use tracing::{debug, instrument, warn};

use super::{MotifCounts, MotifOracle, MotifSize};
use crate::{
    error::OracleError,
    graph::{Graph, GraphFormat},
};

const INPUT_FILE: &str = "graph.edges";
const RESULTS_FILE: &str = "out.txt";

/// Oracle that shells out to one counting executable per motif size.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExternalOracle {
    programs: [PathBuf; 3],
}

impl ExternalOracle {
    /// Executable names looked up by [`ExternalOracle::from_dir`].
    pub const DEFAULT_PROGRAMS: [&'static str; 3] = ["count_three", "count_four", "count_five"];

    /// Uses the default executables inside `dir`.
    #[must_use]
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            programs: Self::DEFAULT_PROGRAMS.map(|name| dir.join(name)),
        }
    }

    /// Overrides the executable used for `size`.
    #[must_use]
    pub fn with_program(mut self, size: MotifSize, program: impl Into<PathBuf>) -> Self {
        self.programs[slot(size)] = program.into();
        self
    }

    /// The executable used for `size`.
    #[must_use]
    pub fn program(&self, size: MotifSize) -> &Path {
        &self.programs[slot(size)]
    }
}

const fn slot(size: MotifSize) -> usize {
    size.vertices() - 3
}

/// Relative paths with a directory part are anchored to the current
/// directory because the child runs elsewhere. Bare names stay bare so the
/// `PATH` lookup still applies.
fn resolve(program: &Path) -> io::Result<PathBuf> {
    if program.is_relative() && program.components().count() > 1 {
        std::path::absolute(program)
    } else {
        Ok(program.to_path_buf())
    }
}

impl MotifOracle for ExternalOracle {
    #[instrument(
        name = "core.oracle.external",
        err,
        skip(self, graph),
        fields(size = %size, nodes = graph.node_count(), edges = graph.edge_count()),
    )]
    fn count(&self, graph: &Graph, size: MotifSize) -> Result<MotifCounts, OracleError> {
        let io_error = |source| OracleError::Io { source };
        let program = resolve(self.program(size)).map_err(io_error)?;
        let scratch = tempfile::Builder::new()
            .prefix("rewire-oracle-")
            .tempdir()
            .map_err(io_error)?;

        let input = scratch.path().join(INPUT_FILE);
        let file = File::create(&input).map_err(io_error)?;
        graph
            .write_to(BufWriter::new(file), GraphFormat::Escape)
            .map_err(io_error)?;

        let output = Command::new(&program)
            .arg(&input)
            .arg(size.to_string())
            .arg("-i")
            .current_dir(scratch.path())
            .output()
            .map_err(|source| OracleError::Spawn {
                program: program.clone(),
                source,
            })?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            warn!(program = %program.display(), stderr = %stderr.trim(), "oracle reported diagnostics");
        }
        debug!(stdout_bytes = output.stdout.len(), status = %output.status, "oracle finished");
        if !output.status.success() {
            return Err(OracleError::Exit {
                program,
                status: output.status,
            });
        }

        let contents = match fs::read_to_string(scratch.path().join(RESULTS_FILE)) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Err(OracleError::MissingResults { program });
            }
            Err(source) => return Err(OracleError::Io { source }),
        };
        parse_results(&contents, size.vector_len())
    }

    fn name(&self) -> &str {
        "external"
    }
}

/// Parses the contents of a results file holding `expected` counts.
///
/// # Errors
/// Returns [`OracleError::MalformedResults`] when either header line is
/// missing or not an integer, or a count is not a finite number, and
/// [`OracleError::CountLength`] when the number of counts differs from
/// `expected`.
///
/// # Examples
/// ```
/// use rewire_core::parse_results;
///
/// let counts = parse_results("3\n3\n1\n3\n3\n1\n", 4)?;
/// assert_eq!(counts.as_slice(), &[1.0, 3.0, 3.0, 1.0]);
/// # Ok::<(), rewire_core::OracleError>(())
/// ```
pub fn parse_results(contents: &str, expected: usize) -> Result<MotifCounts, OracleError> {
    let lines: Vec<&str> = contents.lines().collect();
    for (index, what) in ["node count", "edge count"].into_iter().enumerate() {
        let line = index + 1;
        let Some(value) = lines.get(index).map(|text| text.trim()) else {
            return Err(OracleError::MalformedResults {
                line,
                reason: format!("missing {what}"),
            });
        };
        if value.parse::<u64>().is_err() {
            return Err(OracleError::MalformedResults {
                line,
                reason: format!("{what} `{value}` is not an integer"),
            });
        }
    }

    let mut values = Vec::with_capacity(expected);
    for (index, text) in lines.iter().enumerate().skip(2) {
        for token in text.split_whitespace() {
            match token.parse::<f64>() {
                Ok(value) if value.is_finite() => values.push(value),
                _ => {
                    return Err(OracleError::MalformedResults {
                        line: index + 1,
                        reason: format!("`{token}` is not a finite number"),
                    });
                }
            }
        }
    }
    if values.len() != expected {
        return Err(OracleError::CountLength {
            expected,
            found: values.len(),
        });
    }
    Ok(MotifCounts::new(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case::one_per_line("5\n8\n1\n2\n3\n4\n")]
    #[case::space_separated("5\n8\n1 2\n3 4")]
    #[case::scientific("5\n8\n1e0 2.0 3 4.000\n")]
    fn accepts_valid_results(#[case] contents: &str) {
        let counts = parse_results(contents, 4).expect("valid results");
        assert_eq!(counts.as_slice(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[rstest]
    #[case::empty("", 1)]
    #[case::missing_edge_line("5\n", 2)]
    #[case::fractional_header("5\n8.5\n1 2 3 4\n", 2)]
    #[case::word("5\n8\n1 2\nthree 4\n", 4)]
    #[case::nan("5\n8\n1 2 NaN 4\n", 3)]
    fn rejects_malformed_results(#[case] contents: &str, #[case] expected_line: usize) {
        let error = parse_results(contents, 4).expect_err("malformed");
        assert!(
            matches!(error, OracleError::MalformedResults { line, .. } if line == expected_line),
            "unexpected error: {error:?}"
        );
    }

    #[test]
    fn rejects_wrong_count_length() {
        let error = parse_results("5\n8\n1 2 3\n", 4).expect_err("too short");
        assert!(matches!(
            error,
            OracleError::CountLength {
                expected: 4,
                found: 3
            }
        ));
    }

    #[test]
    fn programs_default_to_directory_entries() {
        let oracle = ExternalOracle::from_dir("/opt/escape")
            .with_program(MotifSize::Five, "/usr/local/bin/five");
        assert_eq!(
            oracle.program(MotifSize::Three),
            Path::new("/opt/escape/count_three")
        );
        assert_eq!(
            oracle.program(MotifSize::Five),
            Path::new("/usr/local/bin/five")
        );
    }

    #[test]
    fn bare_program_names_are_not_resolved() {
        let resolved = resolve(Path::new("count_three")).expect("resolves");
        assert_eq!(resolved, PathBuf::from("count_three"));
        let anchored = resolve(Path::new("bin/count_three")).expect("resolves");
        assert!(anchored.is_absolute());
    }
}
