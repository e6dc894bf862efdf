use std::io;

use rewire_core::{
    Edge, FormatErrorKind, GraphError, GraphErrorCode, OracleError, OracleErrorCode, RewireError,
    RewireErrorCode,
};
use rstest::rstest;

#[rstest]
#[case(
    GraphError::Format { line: 1, kind: FormatErrorKind::MissingHeader },
    GraphErrorCode::Format,
)]
#[case(GraphError::SelfLoop { node: 2 }, GraphErrorCode::SelfLoop)]
#[case(
    GraphError::DuplicateEdge { edge: Edge::new(0, 1) },
    GraphErrorCode::DuplicateEdge,
)]
#[case(GraphError::MissingEdge { edge: Edge::new(0, 1) }, GraphErrorCode::MissingEdge)]
#[case(GraphError::UnknownNode { node: 9 }, GraphErrorCode::UnknownNode)]
#[case(
    GraphError::InvalidSwitch { first: Edge::new(0, 1), second: Edge::new(1, 2) },
    GraphErrorCode::InvalidSwitch,
)]
fn returns_expected_graph_code(#[case] error: GraphError, #[case] expected: GraphErrorCode) {
    assert_eq!(error.code(), expected);
    assert!(error.code().as_str().starts_with("GRAPH_"));
}

#[rstest]
#[case(
    OracleError::Io { source: io::Error::other("disk full") },
    OracleErrorCode::Io,
)]
#[case(
    OracleError::MalformedResults { line: 2, reason: "missing edge count".to_owned() },
    OracleErrorCode::MalformedResults,
)]
#[case(
    OracleError::CountLength { expected: 4, found: 3 },
    OracleErrorCode::CountLength,
)]
fn returns_expected_oracle_code(#[case] error: OracleError, #[case] expected: OracleErrorCode) {
    assert_eq!(error.code(), expected);
    assert!(error.code().as_str().starts_with("ORACLE_"));
}

#[rstest]
#[case(RewireError::InvalidStepCount { got: 0 }, RewireErrorCode::InvalidStepCount, None)]
#[case(RewireError::GraphTooSmall { edges: 1 }, RewireErrorCode::GraphTooSmall, None)]
#[case(RewireError::SingularConversion { size: 4 }, RewireErrorCode::SingularConversion, None)]
#[case(
    RewireError::CountLength { expected: 15, found: 4 },
    RewireErrorCode::CountLength,
    None,
)]
#[case(
    RewireError::Graph(GraphError::UnknownNode { node: 3 }),
    RewireErrorCode::GraphFailure,
    Some("GRAPH_UNKNOWN_NODE"),
)]
#[case(
    RewireError::Oracle(OracleError::CountLength { expected: 4, found: 0 }),
    RewireErrorCode::OracleFailure,
    Some("ORACLE_COUNT_LENGTH"),
)]
fn returns_expected_rewire_code(
    #[case] error: RewireError,
    #[case] expected: RewireErrorCode,
    #[case] inner: Option<&str>,
) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.inner_code(), inner);
}

#[test]
fn wrapped_errors_keep_their_message() {
    let error = RewireError::from(GraphError::MissingEdge {
        edge: Edge::new(3, 7),
    });
    assert_eq!(error.to_string(), "edge (3, 7) does not exist");
}
