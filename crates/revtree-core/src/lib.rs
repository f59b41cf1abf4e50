//! revtree core - revision diffing for versioned document trees
//!
//! This crate provides:
//! - The node model shared by stores and the diff engine
//! - The storage contract (`RevisionStore`, `RevisionCursor`) the engine consumes
//! - The diff engine: classification, realignment, cursor synchronization,
//!   sessions, observers and validated requests
//! - The error and logging facilities used across the workspace

pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod storage;

// Re-export commonly used types
pub use diff::{
    run_diff, CancellationToken, DiffEvent, DiffMode, DiffObserver, DiffOutcome, DiffRequest,
    DiffVariant, DiffVerdict, ObserverSet,
};
pub use errors::{ExError, ExErrorKind, RevTreeError, Result};
pub use model::{NodeKey, NodeKind, NodeSnapshot, QName, RevisionNumber, TreeNode};
pub use storage::{HashingPolicy, RevisionCursor, RevisionStore, StoreHandle};
