//! Command implementations and argument parsing for the `rewire` CLI.

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use rewire_core::{
    DEFAULT_SEED, ExactOracle, ExecutionStrategy, ExternalOracle, Graph, GraphError, GraphFormat,
    MixReport, MotifOracle, NoCandidatePolicy, PermutationOutcome, RewireBuilder, RewireError,
    SanitizeReport, SwitchSampler, Trajectory, sanitize_path,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

const DEFAULT_NUM_STEPS: usize = 10_000;
const DEFAULT_THRESHOLD: f64 = 0.01;
const DEFAULT_RETRY_ATTEMPTS: usize = 1000;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "rewire",
    about = "Test motif significance against degree-preserving rewirings."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the split-trajectory permutation test on a graph.
    Test(TestCommand),
    /// Randomise a graph with degree-preserving switches and save it.
    Mix(MixCommand),
    /// Turn a raw edge list into a canonical graph file.
    Sanitize(SanitizeCommand),
}

/// Options accepted by the `test` command.
#[derive(Debug, Args, Clone)]
pub struct TestCommand {
    /// Canonical edge-list file to test.
    #[arg(long)]
    pub graph: PathBuf,

    /// Largest motif size to count (3, 4 or 5).
    #[arg(long = "motif-size")]
    pub motif_size: usize,

    /// Total number of walk steps across both halves.
    #[arg(long = "num-steps", default_value_t = DEFAULT_NUM_STEPS)]
    pub num_steps: usize,

    /// Threshold used to mark p-values in the report.
    #[arg(long = "p-value", default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f64,

    /// Base seed for the walk and pivot.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Second-edge draws per switch sample.
    #[arg(long = "repeat-limit", default_value_t = SwitchSampler::DEFAULT_REPEAT_LIMIT)]
    pub repeat_limit: usize,

    /// What a step does when no switch is found.
    #[arg(long = "no-candidate", value_enum, default_value_t = NoCandidateArg::Record)]
    pub no_candidate: NoCandidateArg,

    /// Sample budget per step for `--no-candidate retry`.
    #[arg(long = "retry-attempts", default_value_t = DEFAULT_RETRY_ATTEMPTS)]
    pub retry_attempts: usize,

    /// Walk both halves concurrently.
    #[arg(long)]
    pub parallel: bool,

    /// Directory holding `count_three`, `count_four` and `count_five`.
    /// Counts are computed in-process when omitted.
    #[arg(long = "oracle-dir")]
    pub oracle_dir: Option<PathBuf>,

    /// File that receives both count trajectories.
    #[arg(long = "trajectory-out")]
    pub trajectory_out: Option<PathBuf>,
}

/// Command-line spelling of [`NoCandidatePolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NoCandidateArg {
    /// Take no step and record nothing.
    Skip,
    /// Record the unchanged counts as a step.
    Record,
    /// Resample until a switch is found or the budget runs out.
    Retry,
}

impl NoCandidateArg {
    fn policy(self, max_attempts: usize) -> NoCandidatePolicy {
        match self {
            Self::Skip => NoCandidatePolicy::Skip,
            Self::Record => NoCandidatePolicy::RecordNoOp,
            Self::Retry => NoCandidatePolicy::Retry { max_attempts },
        }
    }
}

/// Options accepted by the `mix` command.
#[derive(Debug, Args, Clone)]
pub struct MixCommand {
    /// Canonical edge-list file to randomise.
    #[arg(long)]
    pub graph: PathBuf,

    /// Destination of the randomised graph.
    #[arg(long)]
    pub output: PathBuf,

    /// Successful switches to perform; zero means five per edge.
    #[arg(long, default_value_t = 0)]
    pub switches: usize,

    /// Layout of the written graph.
    #[arg(long, value_enum, default_value_t = FormatArg::Escape)]
    pub format: FormatArg,

    /// Seed for switch sampling.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,
}

/// Command-line spelling of [`GraphFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// `n m` header with zero-based ids.
    Escape,
    /// `n` header with one-based ids.
    Compact,
}

impl From<FormatArg> for GraphFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Escape => Self::Escape,
            FormatArg::Compact => Self::Compact,
        }
    }
}

/// Options accepted by the `sanitize` command.
#[derive(Debug, Args, Clone)]
pub struct SanitizeCommand {
    /// Raw whitespace-separated edge list.
    pub input: PathBuf,

    /// Destination of the canonical graph; labels go to `<output>.map`.
    #[arg(long)]
    pub output: PathBuf,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Writing an output file failed.
    #[error("failed to write `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The marking threshold must lie strictly between zero and one.
    #[error("p-value threshold must lie in (0, 1) (got {value})")]
    InvalidThreshold {
        /// Value supplied on the command line.
        value: f64,
    },
    /// Loading or saving a graph failed.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// Core orchestration failed.
    #[error(transparent)]
    Core(#[from] RewireError),
}

impl CliError {
    /// Stable code of the failure and of the graph or oracle error behind
    /// it, for structured logs.
    #[must_use]
    pub const fn codes(&self) -> (Option<&'static str>, Option<&'static str>) {
        match self {
            Self::Core(error) => (Some(error.code().as_str()), error.inner_code()),
            Self::Graph(error) => (Some(error.code().as_str()), None),
            Self::Io { .. } | Self::InvalidThreshold { .. } => (None, None),
        }
    }

    /// Returns `true` when the invocation itself was wrong, as opposed to
    /// its input data, the oracle or the file system.
    #[must_use]
    pub const fn is_usage(&self) -> bool {
        match self {
            Self::InvalidThreshold { .. } => true,
            Self::Core(error) => error.is_configuration(),
            Self::Io { .. } | Self::Graph(_) => false,
        }
    }
}

/// Result of the `test` command.
#[derive(Debug, Clone)]
pub struct TestSummary {
    /// Graph that was tested.
    pub graph: PathBuf,
    /// Threshold used for marking.
    pub threshold: f64,
    /// Permutation test outcome.
    pub outcome: PermutationOutcome,
    /// Where the trajectories were written, if requested.
    pub trajectory_out: Option<PathBuf>,
}

/// Result of the `mix` command.
#[derive(Debug, Clone)]
pub struct MixSummary {
    /// Where the randomised graph was written.
    pub output: PathBuf,
    /// Label map written next to the graph when ids were renumbered.
    pub map: Option<PathBuf>,
    /// Switch tally.
    pub report: MixReport,
}

/// Result of the `sanitize` command.
#[derive(Debug, Clone)]
pub struct SanitizeSummary {
    /// Where the canonical graph was written.
    pub output: PathBuf,
    /// Where the label map was written.
    pub map: PathBuf,
    /// Nodes in the canonical graph.
    pub nodes: usize,
    /// Edges in the canonical graph.
    pub edges: usize,
    /// What was dropped from the raw input.
    pub report: SanitizeReport,
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub enum ExecutionSummary {
    /// Outcome of `test`.
    Test(TestSummary),
    /// Outcome of `mix`.
    Mix(MixSummary),
    /// Outcome of `sanitize`.
    Sanitize(SanitizeSummary),
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading, testing or writing fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use rewire_cli::cli::{Cli, Command, ExecutionSummary, SanitizeCommand, run_cli};
/// # use tempfile::TempDir;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let dir = TempDir::new()?;
/// let input = dir.path().join("raw.txt");
/// std::fs::write(&input, "a b\nb c\n")?;
/// let cli = Cli {
///     command: Command::Sanitize(SanitizeCommand {
///         input,
///         output: dir.path().join("clean.edges"),
///     }),
/// };
/// let ExecutionSummary::Sanitize(summary) = run_cli(cli)? else {
///     unreachable!("sanitize yields a sanitize summary");
/// };
/// assert_eq!(summary.edges, 2);
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    let span = Span::current();
    match cli.command {
        Command::Test(command) => {
            span.record("command", field::display("test"));
            run_test(command).map(ExecutionSummary::Test)
        }
        Command::Mix(command) => {
            span.record("command", field::display("mix"));
            run_mix(command).map(ExecutionSummary::Mix)
        }
        Command::Sanitize(command) => {
            span.record("command", field::display("sanitize"));
            run_sanitize(command).map(ExecutionSummary::Sanitize)
        }
    }
}

#[instrument(
    name = "cli.test",
    err,
    skip(command),
    fields(
        graph = %command.graph.display(),
        motif_size = command.motif_size,
        num_steps = command.num_steps,
        oracle = field::Empty,
    ),
)]
pub(super) fn run_test(command: TestCommand) -> Result<TestSummary, CliError> {
    validate_threshold(command.threshold)?;
    let strategy = if command.parallel {
        ExecutionStrategy::Parallel
    } else {
        ExecutionStrategy::Sequential
    };
    let rewire = RewireBuilder::new()
        .with_motif_size(command.motif_size)
        .with_num_steps(command.num_steps)
        .with_seed(command.seed)
        .with_repeat_limit(command.repeat_limit)
        .with_no_candidate_policy(command.no_candidate.policy(command.retry_attempts))
        .with_execution_strategy(strategy)
        .build()?;

    let graph = Graph::load(&command.graph, false)?;
    let oracle: Box<dyn MotifOracle> = match &command.oracle_dir {
        Some(dir) => Box::new(ExternalOracle::from_dir(dir)),
        None => Box::new(ExactOracle),
    };
    Span::current().record("oracle", field::display(oracle.name()));

    let outcome = rewire.test(&graph, oracle.as_ref())?;
    if let Some(path) = &command.trajectory_out {
        write_trajectories(path, outcome.first(), outcome.second())?;
    }

    info!(
        pivot = outcome.pivot(),
        accepted = outcome.first().accepted_switches() + outcome.second().accepted_switches(),
        "command completed"
    );
    Ok(TestSummary {
        graph: command.graph,
        threshold: command.threshold,
        outcome,
        trajectory_out: command.trajectory_out,
    })
}

#[instrument(
    name = "cli.mix",
    err,
    skip(command),
    fields(graph = %command.graph.display(), output = %command.output.display()),
)]
pub(super) fn run_mix(command: MixCommand) -> Result<MixSummary, CliError> {
    let rewire = RewireBuilder::new().with_seed(command.seed).build()?;
    let mut graph = Graph::load(&command.graph, false)?;
    let report = rewire.mix(&mut graph, command.switches)?;

    let map = match graph.save(&command.output, command.format.into())? {
        Some(relabeling) => {
            let path = map_path(&command.output);
            let writer = create_output(&path)?;
            relabeling
                .write_to(writer)
                .map_err(|source| CliError::Io {
                    path: path.clone(),
                    source,
                })?;
            Some(path)
        }
        None => None,
    };

    info!(
        switches = report.switches,
        failed_samples = report.failed_samples,
        "command completed"
    );
    Ok(MixSummary {
        output: command.output,
        map,
        report,
    })
}

#[instrument(
    name = "cli.sanitize",
    err,
    skip(command),
    fields(input = %command.input.display(), output = %command.output.display()),
)]
pub(super) fn run_sanitize(command: SanitizeCommand) -> Result<SanitizeSummary, CliError> {
    let sanitized = sanitize_path(&command.input)?;
    sanitized.graph.save(&command.output, GraphFormat::Escape)?;

    let map = map_path(&command.output);
    let writer = create_output(&map)?;
    sanitized
        .relabeling
        .write_to(writer)
        .map_err(|source| CliError::Io {
            path: map.clone(),
            source,
        })?;

    info!(
        nodes = sanitized.graph.node_count(),
        edges = sanitized.graph.edge_count(),
        "command completed"
    );
    Ok(SanitizeSummary {
        output: command.output,
        map,
        nodes: sanitized.graph.node_count(),
        edges: sanitized.graph.edge_count(),
        report: sanitized.report,
    })
}

pub(super) fn validate_threshold(value: f64) -> Result<(), CliError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(CliError::InvalidThreshold { value })
    }
}

/// Appends `.map` to the full file name of `output`.
pub(super) fn map_path(output: &Path) -> PathBuf {
    let mut name = OsString::from(output.as_os_str());
    name.push(".map");
    PathBuf::from(name)
}

#[instrument(name = "cli.create_output", err, fields(path = %path.display()))]
pub(super) fn create_output(path: &Path) -> Result<BufWriter<File>, CliError> {
    let file = File::create(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufWriter::new(file))
}

#[instrument(
    name = "cli.write_trajectories",
    err,
    skip(first, second),
    fields(path = %path.display(), first = first.len(), second = second.len()),
)]
pub(super) fn write_trajectories(
    path: &Path,
    first: &Trajectory,
    second: &Trajectory,
) -> Result<(), CliError> {
    let writer = create_output(path)?;
    render_trajectories(first, second, writer).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes both trajectories, one count vector per line.
///
/// # Errors
/// Returns [`io::Error`] if writing to `writer` fails.
pub fn render_trajectories(
    first: &Trajectory,
    second: &Trajectory,
    mut writer: impl Write,
) -> io::Result<()> {
    for (label, trajectory) in [("trajectory 1:", first), ("trajectory 2:", second)] {
        writeln!(writer, "{label}")?;
        for counts in trajectory.counts() {
            let mut values = counts.as_slice().iter();
            if let Some(head) = values.next() {
                write!(writer, "{head}")?;
            }
            for value in values {
                write!(writer, " {value}")?;
            }
            writeln!(writer)?;
        }
    }
    writer.flush()
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// Test reports list the connected patterns of every block. A `*` follows
/// p-values at or below the threshold, or at or above one minus it.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    match summary {
        ExecutionSummary::Test(test) => render_test(test, &mut writer),
        ExecutionSummary::Mix(mix) => {
            writeln!(writer, "output: {}", mix.output.display())?;
            if let Some(map) = &mix.map {
                writeln!(writer, "map: {}", map.display())?;
            }
            writeln!(writer, "switches: {}", mix.report.switches)?;
            writeln!(writer, "failed samples: {}", mix.report.failed_samples)
        }
        ExecutionSummary::Sanitize(sanitize) => {
            writeln!(writer, "output: {}", sanitize.output.display())?;
            writeln!(writer, "map: {}", sanitize.map.display())?;
            writeln!(
                writer,
                "nodes: {}\nedges: {}",
                sanitize.nodes, sanitize.edges
            )?;
            writeln!(
                writer,
                "dropped: {} self-loops, {} duplicates",
                sanitize.report.self_loops, sanitize.report.duplicates
            )
        }
    }
}

fn render_test(summary: &TestSummary, writer: &mut impl Write) -> io::Result<()> {
    let outcome = &summary.outcome;
    writeln!(writer, "graph: {}", summary.graph.display())?;
    writeln!(
        writer,
        "steps: {} (pivot {})",
        outcome.num_steps(),
        outcome.pivot()
    )?;
    for block in outcome.blocks() {
        writeln!(writer, "size {}:", block.size())?;
        for (name, p) in block.connected() {
            let marker = if is_marked(p, summary.threshold) {
                "\t*"
            } else {
                ""
            };
            writeln!(writer, "{name}\t{p:.6}{marker}")?;
        }
    }
    if let Some(path) = &summary.trajectory_out {
        writeln!(writer, "trajectories: {}", path.display())?;
    }
    Ok(())
}

pub(super) fn is_marked(p: f64, threshold: f64) -> bool {
    p <= threshold || p >= 1.0 - threshold
}
