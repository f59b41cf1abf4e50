use super::depth::{DepthTracker, Side};
use super::model::DiffVerdict;
use crate::model::NodeKey;
use crate::storage::RevisionCursor;

/// Moves one cursor one step in preorder, confined to the start node's subtree
///
/// When a side is exhausted its cursor is parked on the document root and
/// `advance` reports `false`.
#[derive(Debug, Clone, Copy)]
pub struct CursorSynchronizer {
    optimized: bool,
    scope_root: NodeKey,
}

impl CursorSynchronizer {
    pub fn new(optimized: bool, scope_root: NodeKey) -> Self {
        Self {
            optimized,
            scope_root,
        }
    }

    pub fn advance<C: RevisionCursor>(
        &self,
        cursor: &mut C,
        side: Side,
        depth: &mut DepthTracker,
        last_verdict: DiffVerdict,
    ) -> bool {
        let node = cursor.node();
        if node.has_first_child() {
            if self.skips_subtree(node.is_document_root(), last_verdict) {
                return self.move_to_following(cursor, side, depth);
            }
            cursor.move_to_first_child();
            depth.increment(side);
            return true;
        }
        self.move_to_following(cursor, side, depth)
    }

    /// The subtree under the cursor is already resolved by the last verdict
    fn skips_subtree(&self, at_document_root: bool, last_verdict: DiffVerdict) -> bool {
        self.optimized
            && !at_document_root
            && matches!(
                last_verdict,
                DiffVerdict::SameSubtree | DiffVerdict::Deleted
            )
    }

    /// Next node after the cursor's subtree: the right sibling, or the right
    /// sibling of the nearest ancestor that has one.
    fn move_to_following<C: RevisionCursor>(
        &self,
        cursor: &mut C,
        side: Side,
        depth: &mut DepthTracker,
    ) -> bool {
        loop {
            if cursor.key() == self.scope_root {
                cursor.move_to_document_root();
                return false;
            }
            if cursor.move_to_right_sibling() {
                return true;
            }
            if !cursor.move_to_parent() {
                cursor.move_to_document_root();
                return false;
            }
            depth.decrement(side);
        }
    }
}
