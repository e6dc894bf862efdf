//! Error types for the rewire core library.
//!
//! Every public error enum carries a stable machine-readable code so the CLI
//! can attach it to structured log events.

use std::{fmt, io, path::PathBuf, process::ExitStatus};

use thiserror::Error;

use crate::graph::{Edge, NodeId};

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

/// Reasons a canonical edge-list file was rejected.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum FormatErrorKind {
    /// The file contained no header line.
    #[error("missing `<nodes> [<edges>]` header")]
    MissingHeader,
    /// The header did not hold one or two integers.
    #[error("header must contain one or two integers, found {tokens} tokens")]
    MalformedHeader {
        /// Number of whitespace-separated tokens on the header line.
        tokens: usize,
    },
    /// The header declared more nodes than a graph may hold.
    #[error("header declares {declared} nodes, more than the limit of {limit}")]
    NodeCountTooLarge {
        /// Node count declared on the header line.
        declared: usize,
        /// Largest accepted node count.
        limit: usize,
    },
    /// A token could not be parsed as a non-negative integer.
    #[error("`{token}` is not a non-negative integer")]
    NonInteger {
        /// The offending token.
        token: String,
    },
    /// An edge line did not hold exactly two ids.
    #[error("edge lines must contain two node ids, found {tokens} tokens")]
    EdgeArity {
        /// Number of whitespace-separated tokens on the edge line.
        tokens: usize,
    },
    /// An edge referenced an id outside the header's node range.
    #[error("node {node} is outside the id range {first}..{end}")]
    NodeOutOfRange {
        /// The offending node id.
        node: NodeId,
        /// First valid id of the layout.
        first: NodeId,
        /// One past the last valid id of the layout.
        end: NodeId,
    },
    /// The header's edge count disagreed with the body.
    #[error("header declares {declared} edges but the body holds {found}")]
    EdgeCountMismatch {
        /// Edge count declared on the header line.
        declared: usize,
        /// Edge lines found in the body.
        found: usize,
    },
}

/// Errors raised while loading, saving or mutating a [`crate::Graph`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GraphError {
    /// Reading or writing a graph file failed.
    #[error("failed to access `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The canonical edge list was malformed.
    #[error("malformed edge list at line {line}: {kind}")]
    Format {
        /// One-based line number of the offending line.
        line: usize,
        /// What was wrong with the line.
        kind: FormatErrorKind,
    },
    /// An edge would connect a node to itself.
    #[error("self-loop on node {node} is not allowed")]
    SelfLoop {
        /// Node at both ends of the rejected edge.
        node: NodeId,
    },
    /// The edge is already present.
    #[error("edge {edge} already exists")]
    DuplicateEdge {
        /// The duplicated edge.
        edge: Edge,
    },
    /// The edge is not present.
    #[error("edge {edge} does not exist")]
    MissingEdge {
        /// The missing edge.
        edge: Edge,
    },
    /// The node is not part of the graph.
    #[error("node {node} is not part of the graph")]
    UnknownNode {
        /// The unknown node id.
        node: NodeId,
    },
    /// A switch candidate failed validation against the current graph.
    #[error("switch of {first} and {second} is not valid for the current graph")]
    InvalidSwitch {
        /// First edge of the rejected switch.
        first: Edge,
        /// Second edge of the rejected switch.
        second: Edge,
    },
}

define_error_codes! {
    /// Stable codes describing [`GraphError`] variants.
    enum GraphErrorCode for GraphError {
        /// Reading or writing a graph file failed.
        Io => Io { .. } => "GRAPH_IO",
        /// The canonical edge list was malformed.
        Format => Format { .. } => "GRAPH_FORMAT",
        /// An edge would connect a node to itself.
        SelfLoop => SelfLoop { .. } => "GRAPH_SELF_LOOP",
        /// The edge is already present.
        DuplicateEdge => DuplicateEdge { .. } => "GRAPH_DUPLICATE_EDGE",
        /// The edge is not present.
        MissingEdge => MissingEdge { .. } => "GRAPH_MISSING_EDGE",
        /// The node is not part of the graph.
        UnknownNode => UnknownNode { .. } => "GRAPH_UNKNOWN_NODE",
        /// A switch candidate failed validation.
        InvalidSwitch => InvalidSwitch { .. } => "GRAPH_INVALID_SWITCH",
    }
}

/// Errors raised by [`crate::MotifOracle`] implementations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum OracleError {
    /// The counting program could not be started.
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        /// Program that failed to start.
        program: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Preparing the oracle input or scratch directory failed.
    #[error("oracle scratch space failed: {source}")]
    Io {
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The counting program exited unsuccessfully.
    #[error("`{program}` exited with {status}")]
    Exit {
        /// Program that failed.
        program: PathBuf,
        /// Exit status reported by the operating system.
        status: ExitStatus,
    },
    /// The counting program did not produce a results file.
    #[error("`{program}` produced no results file")]
    MissingResults {
        /// Program that failed to write results.
        program: PathBuf,
    },
    /// The results file did not follow the counting protocol.
    #[error("malformed oracle results at line {line}: {reason}")]
    MalformedResults {
        /// One-based line number of the offending line.
        line: usize,
        /// Human-readable description of the problem.
        reason: String,
    },
    /// The results file held the wrong number of counts.
    #[error("oracle returned {found} counts but {expected} were expected")]
    CountLength {
        /// Expected number of counts for the motif size.
        expected: usize,
        /// Number of counts found.
        found: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`OracleError`] variants.
    enum OracleErrorCode for OracleError {
        /// The counting program could not be started.
        Spawn => Spawn { .. } => "ORACLE_SPAWN",
        /// Preparing the oracle input or scratch directory failed.
        Io => Io { .. } => "ORACLE_IO",
        /// The counting program exited unsuccessfully.
        Exit => Exit { .. } => "ORACLE_EXIT",
        /// The counting program did not produce a results file.
        MissingResults => MissingResults { .. } => "ORACLE_MISSING_RESULTS",
        /// The results file did not follow the counting protocol.
        MalformedResults => MalformedResults { .. } => "ORACLE_MALFORMED_RESULTS",
        /// The results file held the wrong number of counts.
        CountLength => CountLength { .. } => "ORACLE_COUNT_LENGTH",
    }
}

/// Error type produced when configuring or running a motif significance test.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RewireError {
    /// Only motifs with three, four or five vertices are supported.
    #[error("motif size must be 3, 4 or 5 (got {got})")]
    UnsupportedMotifSize {
        /// The rejected motif size.
        got: usize,
    },
    /// The walk needs at least one step.
    #[error("num_steps must be at least 1 (got {got})")]
    InvalidStepCount {
        /// The rejected step count.
        got: usize,
    },
    /// The sampler needs at least one attempt per step.
    #[error("repeat_limit must be at least 1 (got {got})")]
    InvalidRepeatLimit {
        /// The rejected repeat limit.
        got: usize,
    },
    /// The retry policy needs at least one attempt.
    #[error("retry policy must allow at least 1 attempt (got {got})")]
    InvalidRetryAttempts {
        /// The rejected attempt budget.
        got: usize,
    },
    /// Motif statistics are only defined for undirected graphs.
    #[error("motif significance tests require an undirected graph")]
    DirectedGraph,
    /// A switch needs two edges.
    #[error("graph has {edges} edges but at least 2 are required")]
    GraphTooSmall {
        /// Number of edges in the rejected graph.
        edges: usize,
    },
    /// No valid switch was found within the configured attempt budget.
    #[error("no valid switch found after {attempts} consecutive attempts")]
    SwitchUnavailable {
        /// Consecutive failed sampling attempts.
        attempts: usize,
    },
    /// A conversion matrix failed its invertibility check.
    #[error("conversion matrix for {size}-vertex patterns is singular")]
    SingularConversion {
        /// Pattern size of the singular matrix.
        size: usize,
    },
    /// A count vector had the wrong dimension for the motif size.
    #[error("count vector has {found} entries but {expected} were expected")]
    CountLength {
        /// Expected vector dimension.
        expected: usize,
        /// Actual vector dimension.
        found: usize,
    },
    /// A graph operation failed.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// A motif oracle query failed.
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

define_error_codes! {
    /// Stable codes describing [`RewireError`] variants.
    enum RewireErrorCode for RewireError {
        /// Only motifs with three, four or five vertices are supported.
        UnsupportedMotifSize => UnsupportedMotifSize { .. } => "REWIRE_UNSUPPORTED_MOTIF_SIZE",
        /// The walk needs at least one step.
        InvalidStepCount => InvalidStepCount { .. } => "REWIRE_INVALID_STEP_COUNT",
        /// The sampler needs at least one attempt per step.
        InvalidRepeatLimit => InvalidRepeatLimit { .. } => "REWIRE_INVALID_REPEAT_LIMIT",
        /// The retry policy needs at least one attempt.
        InvalidRetryAttempts => InvalidRetryAttempts { .. } => "REWIRE_INVALID_RETRY_ATTEMPTS",
        /// Motif statistics are only defined for undirected graphs.
        DirectedGraph => DirectedGraph => "REWIRE_DIRECTED_GRAPH",
        /// A switch needs two edges.
        GraphTooSmall => GraphTooSmall { .. } => "REWIRE_GRAPH_TOO_SMALL",
        /// No valid switch was found within the configured attempt budget.
        SwitchUnavailable => SwitchUnavailable { .. } => "REWIRE_SWITCH_UNAVAILABLE",
        /// A conversion matrix failed its invertibility check.
        SingularConversion => SingularConversion { .. } => "REWIRE_SINGULAR_CONVERSION",
        /// A count vector had the wrong dimension for the motif size.
        CountLength => CountLength { .. } => "REWIRE_COUNT_LENGTH",
        /// A graph operation failed.
        GraphFailure => Graph(..) => "REWIRE_GRAPH_FAILURE",
        /// A motif oracle query failed.
        OracleFailure => Oracle(..) => "REWIRE_ORACLE_FAILURE",
    }
}

impl RewireError {
    /// Retrieve the code of the wrapped graph or oracle error, if any.
    #[must_use]
    pub const fn inner_code(&self) -> Option<&'static str> {
        match self {
            Self::Graph(error) => Some(error.code().as_str()),
            Self::Oracle(error) => Some(error.code().as_str()),
            _ => None,
        }
    }

    /// Returns `true` for errors caused by invalid configuration rather than
    /// by the data or the oracle.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedMotifSize { .. }
                | Self::InvalidStepCount { .. }
                | Self::InvalidRepeatLimit { .. }
                | Self::InvalidRetryAttempts { .. }
                | Self::DirectedGraph
        )
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, RewireError>;

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(RewireError::UnsupportedMotifSize { got: 6 }, "REWIRE_UNSUPPORTED_MOTIF_SIZE")]
    #[case(RewireError::DirectedGraph, "REWIRE_DIRECTED_GRAPH")]
    #[case(RewireError::SwitchUnavailable { attempts: 3 }, "REWIRE_SWITCH_UNAVAILABLE")]
    fn codes_are_stable(#[case] error: RewireError, #[case] expected: &str) {
        assert_eq!(error.code().as_str(), expected);
        assert_eq!(error.code().to_string(), expected);
    }

    #[test]
    fn wrapped_errors_expose_inner_code() {
        let error = RewireError::from(GraphError::SelfLoop { node: 4 });
        assert_eq!(error.code(), RewireErrorCode::GraphFailure);
        assert_eq!(error.inner_code(), Some("GRAPH_SELF_LOOP"));
        assert!(!error.is_configuration());
    }

    #[test]
    fn format_errors_render_line_numbers() {
        let error = GraphError::Format {
            line: 3,
            kind: FormatErrorKind::EdgeArity { tokens: 1 },
        };
        assert_eq!(
            error.to_string(),
            "malformed edge list at line 3: edge lines must contain two node ids, found 1 tokens"
        );
    }
}
