use revtree_core::errors::{ExError, ExErrorKind, RevTreeError};
use revtree_core::model::NodeKind;

#[test]
fn test_revision_not_found_verifiable_by_kind() {
    let err = RevTreeError::RevisionNotFound { revision: 12 };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::NotFound);
    assert_eq!(ex_err.code(), "ERR_NOT_FOUND");
    assert_eq!(ex_err.revision(), Some(12));
    assert_eq!(ex_err.node_key(), None);
}

#[test]
fn test_node_not_found_carries_key_and_revision() {
    let err = RevTreeError::NodeNotFound {
        key: 41,
        revision: 3,
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::NotFound);
    assert_eq!(ex_err.node_key(), Some(41));
    assert_eq!(ex_err.revision(), Some(3));
    assert!(ex_err.message().contains("Node 41"));
}

#[test]
fn test_structural_errors_map_to_invalid_structure() {
    let errors = vec![
        RevTreeError::NotAContainer {
            key: 5,
            kind: NodeKind::Text,
        },
        RevTreeError::NotAText {
            key: 5,
            kind: NodeKind::Element,
        },
        RevTreeError::NotAnElement {
            key: 5,
            kind: NodeKind::Text,
        },
        RevTreeError::KeyInUse { key: 5 },
    ];

    for err in errors {
        let ex_err: ExError = err.into();
        assert_eq!(ex_err.kind(), ExErrorKind::InvalidStructure);
        assert_eq!(ex_err.code(), "ERR_INVALID_STRUCTURE");
        assert_eq!(ex_err.node_key(), Some(5));
    }
}

#[test]
fn test_document_root_errors_point_at_key_zero() {
    for err in [
        RevTreeError::SiblingOfDocumentRoot,
        RevTreeError::CannotRemoveDocumentRoot,
    ] {
        let ex_err: ExError = err.into();
        assert_eq!(ex_err.kind(), ExErrorKind::InvalidStructure);
        assert_eq!(ex_err.node_key(), Some(0));
    }
}

#[test]
fn test_invalid_request_structured_fields() {
    let err = RevTreeError::InvalidRequest {
        reason: "new revision 1 must be greater than old revision 1".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::InvalidRequest);
    assert_eq!(ex_err.code(), "ERR_INVALID_REQUEST");
    assert!(ex_err.message().contains("Invalid diff request"));
}

#[test]
fn test_error_kind_code_mapping() {
    // Test that each kind has a stable, unique code
    let kinds = vec![
        (ExErrorKind::InvalidInput, "ERR_INVALID_INPUT"),
        (ExErrorKind::InvalidStructure, "ERR_INVALID_STRUCTURE"),
        (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
        (ExErrorKind::InvalidRequest, "ERR_INVALID_REQUEST"),
        (ExErrorKind::CursorAcquisition, "ERR_CURSOR_ACQUISITION"),
        (ExErrorKind::ObserverFailure, "ERR_OBSERVER_FAILURE"),
        (ExErrorKind::Cancelled, "ERR_CANCELLED"),
        (ExErrorKind::InvalidSeed, "ERR_INVALID_SEED"),
        (ExErrorKind::Io, "ERR_IO"),
        (ExErrorKind::Serialization, "ERR_SERIALIZATION"),
        (ExErrorKind::Concurrency, "ERR_CONCURRENCY"),
        (ExErrorKind::Internal, "ERR_INTERNAL"),
    ];

    let mut seen = std::collections::HashSet::new();
    for (kind, expected_code) in kinds {
        assert_eq!(kind.code(), expected_code);
        assert!(seen.insert(expected_code), "duplicate code {expected_code}");
    }
}

#[test]
fn test_lock_poisoned_is_concurrency() {
    let err = RevTreeError::LockPoisoned {
        what: "revision list".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::Concurrency);
    assert!(ex_err.message().contains("revision list"));
}

#[test]
fn test_serde_json_error_converts_to_serialization() {
    let json_err = serde_json::from_str::<u64>("not json").unwrap_err();
    let err: RevTreeError = json_err.into();

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::Serialization);
}

#[test]
fn test_builder_context_round_trips_through_accessors() {
    let request_id = revtree_core_types::RequestId::new();
    let err = ExError::new(ExErrorKind::Cancelled)
        .with_op("diff_session")
        .with_request_id(request_id.clone())
        .with_message("cancelled after 3 events");

    assert_eq!(err.op(), Some("diff_session"));
    assert_eq!(err.request_id(), Some(&request_id));
    assert_eq!(err.message(), "cancelled after 3 events");
    assert!(err.to_string().contains("[ERR_CANCELLED] in operation 'diff_session'"));
}
