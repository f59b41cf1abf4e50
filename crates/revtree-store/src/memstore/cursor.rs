use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use revtree_core::errors::ExError;
use revtree_core::model::{NodeKey, RevisionNumber, TreeNode, DOCUMENT_ROOT_KEY};
use revtree_core::storage::RevisionCursor;

use super::Revision;

/// Read-only cursor over one committed revision of a [`MemoryStore`](super::MemoryStore)
///
/// Holds the revision alive on its own, so it stays valid while the store
/// commits further revisions.
#[derive(Debug)]
pub struct MemoryCursor {
    revision: Arc<Revision>,
    current: Arc<TreeNode>,
    open_cursors: Arc<AtomicUsize>,
    closed: bool,
}

impl MemoryCursor {
    pub(crate) fn open(
        revision: Arc<Revision>,
        key: NodeKey,
        open_cursors: Arc<AtomicUsize>,
    ) -> Option<Self> {
        let current = revision.nodes.get(&key).cloned()?;
        open_cursors.fetch_add(1, Ordering::SeqCst);
        Some(Self {
            revision,
            current,
            open_cursors,
            closed: false,
        })
    }

    fn follow(&mut self, link: Option<NodeKey>) -> bool {
        match link.and_then(|key| self.revision.nodes.get(&key)) {
            Some(node) => {
                self.current = Arc::clone(node);
                true
            }
            None => false,
        }
    }

    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            self.open_cursors.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl RevisionCursor for MemoryCursor {
    type Position = Arc<TreeNode>;

    fn revision(&self) -> RevisionNumber {
        self.revision.number
    }

    fn node(&self) -> &TreeNode {
        &self.current
    }

    fn move_to(&mut self, key: NodeKey) -> bool {
        self.follow(Some(key))
    }

    fn move_to_first_child(&mut self) -> bool {
        self.follow(self.current.first_child)
    }

    fn move_to_right_sibling(&mut self) -> bool {
        self.follow(self.current.right_sibling)
    }

    fn move_to_parent(&mut self) -> bool {
        self.follow(self.current.parent)
    }

    fn move_to_document_root(&mut self) {
        self.follow(Some(DOCUMENT_ROOT_KEY));
    }

    fn position(&self) -> Arc<TreeNode> {
        Arc::clone(&self.current)
    }

    fn restore(&mut self, position: Arc<TreeNode>) {
        self.current = position;
    }

    fn close(&mut self) -> Result<(), ExError> {
        self.release();
        Ok(())
    }
}

impl Drop for MemoryCursor {
    fn drop(&mut self) {
        self.release();
    }
}
