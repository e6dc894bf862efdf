//! Structured logging for the `rewire` binary.
//!
//! Spans from `rewire-core` are written to stderr when they close, so a walk
//! of ten thousand steps logs one `core.trajectory` line per half rather than
//! one per step. Records from crates on the `log` facade are bridged in.

use std::{env, str::FromStr, sync::OnceLock};

use thiserror::Error;
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, Layer, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt,
};

const LOG_FORMAT_ENV: &str = "REWIRE_LOG_FORMAT";
const DEFAULT_FILTER: &str = "info";

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Line layout selected by `REWIRE_LOG_FORMAT`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum LogFormat {
    #[default]
    Human,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim();
        if wanted.eq_ignore_ascii_case("human") {
            Ok(Self::Human)
        } else if wanted.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else {
            Err(LoggingError::UnsupportedFormat {
                provided: wanted.to_owned(),
            })
        }
    }
}

/// Why logging could not be started.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// `REWIRE_LOG_FORMAT` is set but not valid UTF-8.
    #[error("environment variable `{name}` contained invalid UTF-8: {source}")]
    InvalidUnicode {
        /// Variable that was read.
        name: &'static str,
        /// Failure reported by [`std::env::var`].
        #[source]
        source: env::VarError,
    },
    /// `REWIRE_LOG_FORMAT` names neither `human` nor `json`.
    #[error("unsupported log format `{provided}`; expected `human` or `json`")]
    UnsupportedFormat {
        /// The value as given, without surrounding whitespace.
        provided: String,
    },
    /// A global subscriber was already set by someone else.
    #[error("failed to install tracing subscriber: {source}")]
    InstallFailed {
        /// Error raised by `tracing_subscriber`.
        #[source]
        source: tracing_subscriber::util::TryInitError,
    },
}

/// Starts logging once per process; later calls do nothing.
///
/// `RUST_LOG` picks the level, `info` when unset or unparsable. An already
/// installed global subscriber is kept and reported on stderr.
///
/// # Errors
/// Returns [`LoggingError`] when `REWIRE_LOG_FORMAT` is not valid UTF-8 or
/// names an unknown format.
pub fn init_logging() -> Result<(), LoggingError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }
    match install(requested_format()?) {
        Ok(()) => {}
        Err(LoggingError::InstallFailed { source }) => report_existing_subscriber(&source),
        Err(err) => return Err(err),
    }
    let _ = INSTALLED.set(());
    Ok(())
}

fn requested_format() -> Result<LogFormat, LoggingError> {
    match env::var(LOG_FORMAT_ENV) {
        Ok(raw) => raw.parse(),
        Err(env::VarError::NotPresent) => Ok(LogFormat::default()),
        Err(source) => Err(LoggingError::InvalidUnicode {
            name: LOG_FORMAT_ENV,
            source,
        }),
    }
}

fn install(format: LogFormat) -> Result<(), LoggingError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let base = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    let output = match format {
        LogFormat::Human => base.boxed(),
        LogFormat::Json => base.json().with_current_span(true).with_span_list(true).boxed(),
    };

    // Keep any `log` logger installed before us.
    let _ = LogTracer::init();

    tracing_subscriber::registry()
        .with(filter)
        .with(output)
        .try_init()
        .map_err(|source| LoggingError::InstallFailed { source })
}

#[expect(
    clippy::print_stderr,
    reason = "The subscriber that would carry this notice is not ours"
)]
fn report_existing_subscriber(source: &tracing_subscriber::util::TryInitError) {
    eprintln!("rewire: keeping existing log subscriber: {source}");
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case("human", LogFormat::Human)]
    #[case("HUMAN", LogFormat::Human)]
    #[case(" json ", LogFormat::Json)]
    #[case("Json", LogFormat::Json)]
    fn known_formats_parse(#[case] raw: &str, #[case] expected: LogFormat) {
        assert_eq!(raw.parse::<LogFormat>().expect("known format"), expected);
    }

    #[rstest]
    #[case("xml", "xml")]
    #[case(" Logfmt ", "Logfmt")]
    fn unknown_formats_are_reported_as_given(#[case] raw: &str, #[case] provided: &str) {
        let err = raw.parse::<LogFormat>().expect_err("unknown format");
        match err {
            LoggingError::UnsupportedFormat { provided: found } => assert_eq!(found, provided),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn human_is_the_default() {
        assert_eq!(LogFormat::default(), LogFormat::Human);
    }

    #[test]
    fn init_logging_is_idempotent() {
        init_logging().expect("logging must initialise");
        init_logging().expect("subsequent calls must be no-ops");
    }
}
