//! Storage contract consumed by the diff engine.
//!
//! The engine never sees how revisions are laid out. It asks a
//! [`RevisionStore`] for one [`RevisionCursor`] per side and walks them.

pub mod cursor;
pub mod handle;

pub use cursor::RevisionCursor;
pub use handle::StoreHandle;

use serde::{Deserialize, Serialize};

use crate::errors::RevTreeError;
use crate::model::{NodeKey, RevisionNumber};

/// Whether the store maintains subtree content hashes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashingPolicy {
    /// Every hash is 0; optimized diffs degrade to normal diffs
    Disabled,
    /// Hashes are recomputed bottom-up on commit
    #[default]
    Postorder,
}

impl HashingPolicy {
    pub fn is_enabled(&self) -> bool {
        matches!(self, HashingPolicy::Postorder)
    }
}

/// A source of read-only revision cursors
pub trait RevisionStore: Send + Sync {
    type Cursor: RevisionCursor + 'static;

    /// Open a cursor on `revision` positioned at `key`.
    ///
    /// # Errors
    ///
    /// `RevisionNotFound` if the revision was never committed, `NodeNotFound`
    /// if the key is not live in that revision.
    fn open_cursor(
        &self,
        revision: RevisionNumber,
        key: NodeKey,
    ) -> Result<Self::Cursor, RevTreeError>;

    fn hashing_policy(&self) -> HashingPolicy;

    /// Most recently committed revision, if any
    fn latest_revision(&self) -> Option<RevisionNumber>;
}
