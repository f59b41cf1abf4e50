//! Revision diff engine.
//!
//! Walks two revisions of one document in lock-step and reports each node
//! as same, inserted, deleted or updated.
//!
//! ## Entry point
//!
//! ```ignore
//! use revtree_core::diff::{run_diff, CancellationToken, DiffMode, DiffRequest, DiffVariant};
//!
//! let request = DiffRequest::builder()
//!     .store(handle)
//!     .revisions(0, 1)
//!     .mode(DiffMode::Optimized)
//!     .variant(DiffVariant::structural())
//!     .observers(&observers)
//!     .build()?;
//! let outcome = run_diff(request, CancellationToken::new())?;
//! ```
//!
//! ## Guarantees
//!
//! - **Completeness**: every visited new node and every unmatched old node
//!   yields exactly one event before completion.
//! - **Collapsing**: in optimized mode an unchanged or deleted subtree yields
//!   one event for its root. Inserted subtrees are always reported node by node.
//! - **Hash trust**: equal content hashes are taken as equal subtrees.
//! - **Determinism**: the same request over the same revisions yields the same
//!   event sequence.

pub mod classify;
pub mod depth;
pub mod human_summary;
pub mod model;
pub mod observer;
pub mod realign;
pub mod request;
pub mod session;
pub mod sync;
pub mod variant;

#[cfg(test)]
pub(crate) mod fixture;

pub use tokio_util::sync::CancellationToken;
pub use classify::DiffClassifier;
pub use depth::{DepthPair, DepthTracker, Side};
pub use human_summary::render_human_summary;
pub use model::{DiffEvent, DiffMode, DiffOutcome, DiffVerdict, VerdictCounts};
pub use observer::{CollectingObserver, DiffObserver, ObserverSet, TracingObserver};
pub use realign::RealignmentSearch;
pub use request::{run_diff, DiffRequest, DiffRequestBuilder};
pub use session::DiffSession;
pub use sync::CursorSynchronizer;
pub use variant::DiffVariant;
