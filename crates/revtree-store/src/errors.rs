//! Error handling for revtree-store
//!
//! Wraps revtree-core ExError with store-specific helpers

use revtree_core::errors::{ExError, ExErrorKind};
use thiserror::Error;

use revtree_core::model::NodeKey;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Reasons a seed document is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeedError {
    #[error("Unsupported schema_version: {found}. Expected 0")]
    UnsupportedSchemaVersion { found: u32 },

    #[error("Seed has no document name")]
    MissingDocumentName,

    #[error("Seed has no revisions")]
    NoRevisions,

    #[error("Revision {revision}: node key 0 is reserved for the document root")]
    ReservedKey { revision: usize },

    #[error("Revision {revision}: node key {key} exceeds the largest seed key {max}")]
    KeyOutOfRange {
        revision: usize,
        key: NodeKey,
        max: NodeKey,
    },

    #[error("Revision {revision}: duplicate node key {key}")]
    DuplicateKey { revision: usize, key: NodeKey },

    #[error("Revision {revision}: node {key} must have exactly one of 'element' or 'text'")]
    AmbiguousKind { revision: usize, key: NodeKey },

    #[error("Revision {revision}: text node {key} cannot have children, attributes or namespaces")]
    TextWithContent { revision: usize, key: NodeKey },

    #[error("Revision {revision}: node {key} has invalid name {name:?}")]
    InvalidName {
        revision: usize,
        key: NodeKey,
        name: String,
    },

    #[error("Revision {revision}: node {key} changed kind since an earlier revision")]
    KindChanged { revision: usize, key: NodeKey },

    #[error("Revision {revision}: node key {key} reappears after being removed")]
    KeyResurrected { revision: usize, key: NodeKey },
}

impl From<SeedError> for ExError {
    fn from(err: SeedError) -> Self {
        seed_validation(&err.to_string())
    }
}

/// Create a seed validation error
pub fn seed_validation(reason: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidSeed)
        .with_op("seed_parse")
        .with_message(reason.to_string())
}

/// Create a seed import error from a store rejection
pub fn seed_import(revision: usize, source: ExError) -> ExError {
    ExError::new(ExErrorKind::InvalidSeed)
        .with_op("seed_import")
        .with_message(format!("Revision {} could not be built: {}", revision, source.message()))
        .with_source(source)
}

/// Create a serialization error
pub fn serialization_error(operation: &str, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
