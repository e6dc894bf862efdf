//! Command-line interface orchestration for motif significance testing.
//!
//! `test` runs the split-trajectory permutation test on a canonical graph,
//! `mix` writes a degree-preserving randomisation of one, and `sanitize`
//! turns a raw edge list into the canonical format with a label map.

mod commands;

pub use commands::{
    Cli, CliError, Command, ExecutionSummary, FormatArg, MixCommand, MixSummary, NoCandidateArg,
    SanitizeCommand, SanitizeSummary, TestCommand, TestSummary, render_summary,
    render_trajectories, run_cli,
};

#[cfg(test)]
mod test_helpers;
