//! `rewire` binary.
//!
//! Reports go to stdout and diagnostics to stderr. Invocation mistakes exit
//! with status 2, every other failure with status 1.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use rewire_cli::{
    cli::{Cli, CliError, render_summary, run_cli},
    logging::{self, LoggingError},
};
use tracing::{error, field};

const USAGE_FAILURE: u8 = 2;

fn try_main() -> Result<()> {
    let summary = run_cli(Cli::parse()).context("rewire command failed")?;
    let mut out = BufWriter::new(io::stdout().lock());
    render_summary(&summary, &mut out).context("failed to write report")?;
    out.flush().context("failed to flush report")
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    let Err(err) = try_main() else {
        return ExitCode::SUCCESS;
    };
    let cli_error = err.downcast_ref::<CliError>();
    let (code, inner_code) = cli_error.map_or((None, None), CliError::codes);
    error!(
        error = %err,
        code = code.map(field::display),
        inner_code = inner_code.map(field::display),
        "command execution failed"
    );
    if cli_error.is_some_and(CliError::is_usage) {
        ExitCode::from(USAGE_FAILURE)
    } else {
        ExitCode::FAILURE
    }
}

#[expect(
    clippy::print_stderr,
    reason = "Logging failed to start, so stderr is the only channel left"
)]
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("rewire: cannot start logging: {err}");
}
