use ldcr_core::{GraphError, GraphErrorCode};
use rstest::rstest;

#[rstest]
#[case(GraphError::InvalidParameters { reason: "p_out".into() }, GraphErrorCode::InvalidParameters, "LDCR_INVALID_PARAMETERS")]
#[case(GraphError::EmptySelection, GraphErrorCode::EmptySelection, "LDCR_EMPTY_SELECTION")]
#[case(GraphError::StaleHandle { handle: 3 }, GraphErrorCode::StaleHandle, "LDCR_STALE_HANDLE")]
#[case(
    GraphError::ElementOutOfDomain { element: 9, max: 4 },
    GraphErrorCode::ElementOutOfDomain,
    "LDCR_ELEMENT_OUT_OF_DOMAIN",
)]
#[case(
    GraphError::ElementAlreadySelected { element: 1 },
    GraphErrorCode::ElementAlreadySelected,
    "LDCR_ELEMENT_ALREADY_SELECTED",
)]
#[case(
    GraphError::ElementNotSelected { element: 1 },
    GraphErrorCode::ElementNotSelected,
    "LDCR_ELEMENT_NOT_SELECTED",
)]
#[case(GraphError::SamplerFull, GraphErrorCode::SamplerFull, "LDCR_SAMPLER_FULL")]
#[case(GraphError::SamplerEmpty, GraphErrorCode::SamplerEmpty, "LDCR_SAMPLER_EMPTY")]
#[case(GraphError::UnknownNode { node: 2 }, GraphErrorCode::UnknownNode, "LDCR_UNKNOWN_NODE")]
#[case(
    GraphError::UnknownCluster { cluster: 2 },
    GraphErrorCode::UnknownCluster,
    "LDCR_UNKNOWN_CLUSTER",
)]
#[case(
    GraphError::NodeNotIsolated { node: 2, degree: 1 },
    GraphErrorCode::NodeNotIsolated,
    "LDCR_NODE_NOT_ISOLATED",
)]
#[case(GraphError::SelfLoop { node: 2 }, GraphErrorCode::SelfLoop, "LDCR_SELF_LOOP")]
#[case(
    GraphError::DuplicateEdge { first: 2, second: 3 },
    GraphErrorCode::DuplicateEdge,
    "LDCR_DUPLICATE_EDGE",
)]
#[case(
    GraphError::MissingEdge { first: 2, second: 3 },
    GraphErrorCode::MissingEdge,
    "LDCR_MISSING_EDGE",
)]
#[case(
    GraphError::ClusterLocked { cluster: 1 },
    GraphErrorCode::ClusterLocked,
    "LDCR_CLUSTER_LOCKED",
)]
#[case(
    GraphError::InvariantViolation { message: "drift".into() },
    GraphErrorCode::InvariantViolation,
    "LDCR_INVARIANT_VIOLATION",
)]
fn every_error_has_a_stable_code(
    #[case] error: GraphError,
    #[case] expected: GraphErrorCode,
    #[case] text: &str,
) {
    assert_eq!(error.code(), expected);
    assert_eq!(expected.as_str(), text);
    assert_eq!(expected.to_string(), text);
}

#[test]
fn messages_name_the_offending_objects() {
    let error = GraphError::DuplicateEdge { first: 4, second: 9 };
    assert_eq!(error.to_string(), "edge 4-9 already exists");
    let error = GraphError::ElementOutOfDomain { element: 7, max: 3 };
    assert_eq!(error.to_string(), "element 7 lies outside the domain [0, 3)");
}
