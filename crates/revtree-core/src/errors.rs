use revtree_core_types::RequestId;
use thiserror::Error;

use crate::model::{NodeKey, NodeKind, RevisionNumber};

/// Result type alias using RevTreeError
pub type Result<T> = std::result::Result<T, RevTreeError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// This taxonomy provides a stable, structured classification of all errors
/// in revtree. Each kind maps to a stable error code that can be used for
/// programmatic error handling, testing, and external API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    InvalidStructure,
    NotFound,

    // Diff requests
    /// Request rejected before any cursor was opened
    InvalidRequest,
    /// Revision or start key missing, or the store could not open a read view
    CursorAcquisition,
    /// An observer callback failed; the session was stopped
    ObserverFailure,
    /// The session was cancelled between node comparisons
    Cancelled,

    // Seeds
    InvalidSeed,

    // Integration/IO
    Io,
    Serialization,
    Concurrency,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidStructure => "ERR_INVALID_STRUCTURE",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::InvalidRequest => "ERR_INVALID_REQUEST",
            ExErrorKind::CursorAcquisition => "ERR_CURSOR_ACQUISITION",
            ExErrorKind::ObserverFailure => "ERR_OBSERVER_FAILURE",
            ExErrorKind::Cancelled => "ERR_CANCELLED",
            ExErrorKind::InvalidSeed => "ERR_INVALID_SEED",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// This error type provides a structured representation of errors with
/// classification fields for programmatic handling and rich context for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    revision: Option<RevisionNumber>,
    node_key: Option<NodeKey>,
    request_id: Option<RequestId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            revision: None,
            node_key: None,
            request_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add revision context
    pub fn with_revision(mut self, revision: RevisionNumber) -> Self {
        self.revision = Some(revision);
        self
    }

    /// Add node key context
    pub fn with_node_key(mut self, key: NodeKey) -> Self {
        self.node_key = Some(key);
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the revision context, if any
    pub fn revision(&self) -> Option<RevisionNumber> {
        self.revision
    }

    /// Get the node key context, if any
    pub fn node_key(&self) -> Option<NodeKey> {
        self.node_key
    }

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(revision) = self.revision {
            write!(f, " (revision: {})", revision)?;
        }
        if let Some(key) = self.node_key {
            write!(f, " (node_key: {})", key)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for document and revision operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RevTreeError {
    // ===== Lookup Errors =====
    /// Revision does not exist in the store
    #[error("Revision not found: {revision}")]
    RevisionNotFound { revision: RevisionNumber },

    /// Node key does not exist in the given revision
    #[error("Node {key} not found in revision {revision}")]
    NodeNotFound {
        key: NodeKey,
        revision: RevisionNumber,
    },

    /// Node key does not exist in the revision being written
    #[error("Node {key} not found in pending revision")]
    PendingNodeNotFound { key: NodeKey },

    // ===== Structural Errors =====
    /// The target node cannot hold children
    #[error("Node {key} of kind {kind:?} cannot have children")]
    NotAContainer { key: NodeKey, kind: NodeKind },

    /// The document root has no siblings
    #[error("The document root cannot have siblings")]
    SiblingOfDocumentRoot,

    /// The document root cannot be removed or replaced
    #[error("The document root cannot be removed")]
    CannotRemoveDocumentRoot,

    /// Value operations require a text node
    #[error("Node {key} is a {kind:?}, expected a text node")]
    NotAText { key: NodeKey, kind: NodeKind },

    /// Name and attribute operations require an element
    #[error("Node {key} is a {kind:?}, expected an element")]
    NotAnElement { key: NodeKey, kind: NodeKind },

    /// Key is already present in the pending revision
    #[error("Node key {key} is already in use")]
    KeyInUse { key: NodeKey },

    /// No key above the last allocated one is left
    #[error("Node key space exhausted after key {last}")]
    KeySpaceExhausted { last: NodeKey },

    /// Qualified name could not be parsed
    #[error("Invalid qualified name: {name:?}")]
    InvalidName { name: String },

    // ===== Diff Errors =====
    /// Diff request failed validation
    #[error("Invalid diff request: {reason}")]
    InvalidRequest { reason: String },

    // ===== Internal Errors =====
    /// Serialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// A lock guarding shared state was poisoned
    #[error("Lock poisoned: {what}")]
    LockPoisoned { what: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<RevTreeError> for ExError {
    fn from(err: RevTreeError) -> Self {
        let message = err.to_string();
        match err {
            RevTreeError::RevisionNotFound { revision } => {
                ExError::new(ExErrorKind::NotFound).with_revision(revision)
            }
            RevTreeError::NodeNotFound { key, revision } => ExError::new(ExErrorKind::NotFound)
                .with_revision(revision)
                .with_node_key(key),
            RevTreeError::PendingNodeNotFound { key } => {
                ExError::new(ExErrorKind::NotFound).with_node_key(key)
            }

            RevTreeError::NotAContainer { key, .. }
            | RevTreeError::NotAText { key, .. }
            | RevTreeError::NotAnElement { key, .. }
            | RevTreeError::KeyInUse { key } => {
                ExError::new(ExErrorKind::InvalidStructure).with_node_key(key)
            }
            RevTreeError::KeySpaceExhausted { last } => {
                ExError::new(ExErrorKind::InvalidStructure).with_node_key(last)
            }
            RevTreeError::SiblingOfDocumentRoot | RevTreeError::CannotRemoveDocumentRoot => {
                ExError::new(ExErrorKind::InvalidStructure).with_node_key(crate::model::DOCUMENT_ROOT_KEY)
            }

            RevTreeError::InvalidName { .. } => ExError::new(ExErrorKind::InvalidInput),
            RevTreeError::InvalidRequest { .. } => ExError::new(ExErrorKind::InvalidRequest),
            RevTreeError::Serialization { .. } => ExError::new(ExErrorKind::Serialization),
            RevTreeError::LockPoisoned { .. } => ExError::new(ExErrorKind::Concurrency),
            RevTreeError::Internal { .. } => ExError::new(ExErrorKind::Internal),
        }
        .with_message(message)
    }
}

impl From<serde_json::Error> for RevTreeError {
    fn from(err: serde_json::Error) -> Self {
        RevTreeError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_error_kind_codes() {
        let cases = [
            (ExErrorKind::InvalidRequest, "ERR_INVALID_REQUEST"),
            (ExErrorKind::CursorAcquisition, "ERR_CURSOR_ACQUISITION"),
            (ExErrorKind::ObserverFailure, "ERR_OBSERVER_FAILURE"),
            (ExErrorKind::Cancelled, "ERR_CANCELLED"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_display_includes_context() {
        let err = ExError::new(ExErrorKind::CursorAcquisition)
            .with_op("open_cursor")
            .with_revision(3)
            .with_node_key(7)
            .with_message("no such node");
        let rendered = err.to_string();
        assert!(rendered.starts_with("[ERR_CURSOR_ACQUISITION]"));
        assert!(rendered.contains("open_cursor"));
        assert!(rendered.contains("revision: 3"));
        assert!(rendered.contains("node_key: 7"));
    }

    #[test]
    fn test_source_chain_is_exposed() {
        let inner = ExError::new(ExErrorKind::NotFound).with_message("missing");
        let outer = ExError::new(ExErrorKind::CursorAcquisition).with_source(inner);
        let source = std::error::Error::source(&outer).expect("source should be set");
        assert!(source.to_string().contains("ERR_NOT_FOUND"));
        assert_eq!(
            outer.source_error().map(|e| e.kind()),
            Some(ExErrorKind::NotFound)
        );
    }
}
