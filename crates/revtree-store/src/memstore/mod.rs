//! In-memory revision store
//!
//! Revisions are immutable once committed and share unchanged node records
//! with their predecessors. One writer at a time builds the next revision
//! from the latest one; any number of cursors read committed revisions.

pub mod cursor;
pub mod hashing;
pub mod writer;

pub use cursor::MemoryCursor;
pub use writer::{InsertPosition, NewNode, RevisionWriter};

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use revtree_core::errors::RevTreeError;
use revtree_core::model::{NodeKey, RevisionNumber, TreeNode, DOCUMENT_ROOT_KEY};
use revtree_core::storage::{HashingPolicy, RevisionStore};

/// One committed revision
#[derive(Debug, Clone)]
pub struct Revision {
    number: RevisionNumber,
    nodes: HashMap<NodeKey, Arc<TreeNode>>,
    max_key: NodeKey,
}

impl Revision {
    pub fn number(&self) -> RevisionNumber {
        self.number
    }

    pub fn node(&self, key: NodeKey) -> Option<&TreeNode> {
        self.nodes.get(&key).map(Arc::as_ref)
    }

    /// Structural nodes, document root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Highest key allocated up to and including this revision
    pub fn max_key(&self) -> NodeKey {
        self.max_key
    }

    #[cfg(test)]
    pub(crate) fn shares_record_with(&self, other: &Revision, key: NodeKey) -> bool {
        match (self.nodes.get(&key), other.nodes.get(&key)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Copy-on-write store of numbered revisions
#[derive(Debug)]
pub struct MemoryStore {
    revisions: RwLock<Vec<Arc<Revision>>>,
    hashing: HashingPolicy,
    writer: Mutex<()>,
    open_cursors: Arc<AtomicUsize>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Store with post-order hashing
    pub fn new() -> Self {
        Self::with_hashing(HashingPolicy::Postorder)
    }

    pub fn with_hashing(hashing: HashingPolicy) -> Self {
        Self {
            revisions: RwLock::new(Vec::new()),
            hashing,
            writer: Mutex::new(()),
            open_cursors: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn hashing(&self) -> HashingPolicy {
        self.hashing
    }

    pub fn revision_count(&self) -> usize {
        self.revisions.read().map(|r| r.len()).unwrap_or(0)
    }

    /// A committed revision, if it exists
    pub fn revision(&self, number: RevisionNumber) -> Option<Arc<Revision>> {
        self.revisions
            .read()
            .ok()
            .and_then(|r| r.get(number as usize).cloned())
    }

    /// Cursors opened and not yet closed or dropped
    pub fn open_cursor_count(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    /// Start the next revision from the latest committed one (or an empty
    /// document). Blocks while another writer is active.
    ///
    /// # Errors
    ///
    /// `LockPoisoned` if a previous writer panicked.
    pub fn begin_write(&self) -> Result<RevisionWriter<'_>, RevTreeError> {
        let guard = self.writer.lock().map_err(|_| poisoned("writer lock"))?;
        let base = self.latest()?;
        let (nodes, next_key) = match base {
            Some(rev) => (rev.nodes.clone(), next_after(rev.max_key)?),
            None => (empty_document(), DOCUMENT_ROOT_KEY + 1),
        };
        Ok(RevisionWriter::new(self, guard, nodes, next_key))
    }

    /// Start the next revision from an empty document, with every key up to
    /// `reserved_through` kept out of automatic allocation.
    pub(crate) fn begin_rebuild(
        &self,
        reserved_through: NodeKey,
    ) -> Result<RevisionWriter<'_>, RevTreeError> {
        let guard = self.writer.lock().map_err(|_| poisoned("writer lock"))?;
        let floor = self.latest()?.map(|rev| rev.max_key).unwrap_or(0);
        let next_key = next_after(floor.max(reserved_through))?;
        Ok(RevisionWriter::new(self, guard, empty_document(), next_key))
    }

    fn latest(&self) -> Result<Option<Arc<Revision>>, RevTreeError> {
        let revisions = self
            .revisions
            .read()
            .map_err(|_| poisoned("revision list"))?;
        Ok(revisions.last().cloned())
    }

    /// Called by the writer that holds the writer lock
    pub(crate) fn push_revision(
        &self,
        nodes: HashMap<NodeKey, Arc<TreeNode>>,
        max_key: NodeKey,
    ) -> Result<RevisionNumber, RevTreeError> {
        let mut revisions = self
            .revisions
            .write()
            .map_err(|_| poisoned("revision list"))?;
        let number = revisions.len() as RevisionNumber;
        revisions.push(Arc::new(Revision {
            number,
            nodes,
            max_key,
        }));
        Ok(number)
    }
}

impl RevisionStore for MemoryStore {
    type Cursor = MemoryCursor;

    fn open_cursor(
        &self,
        revision: RevisionNumber,
        key: NodeKey,
    ) -> Result<MemoryCursor, RevTreeError> {
        let rev = self
            .revision(revision)
            .ok_or(RevTreeError::RevisionNotFound { revision })?;
        MemoryCursor::open(rev, key, Arc::clone(&self.open_cursors))
            .ok_or(RevTreeError::NodeNotFound { key, revision })
    }

    fn hashing_policy(&self) -> HashingPolicy {
        self.hashing
    }

    fn latest_revision(&self) -> Option<RevisionNumber> {
        self.revisions
            .read()
            .ok()
            .and_then(|r| r.last().map(|rev| rev.number))
    }
}

fn empty_document() -> HashMap<NodeKey, Arc<TreeNode>> {
    let mut nodes = HashMap::new();
    nodes.insert(DOCUMENT_ROOT_KEY, Arc::new(TreeNode::document_root()));
    nodes
}

fn next_after(key: NodeKey) -> Result<NodeKey, RevTreeError> {
    key.checked_add(1)
        .ok_or(RevTreeError::KeySpaceExhausted { last: key })
}

fn poisoned(what: &str) -> RevTreeError {
    RevTreeError::LockPoisoned {
        what: what.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revtree_core::model::{NodeKind, QName};
    use revtree_core::storage::RevisionCursor;

    fn catalog(store: &MemoryStore) -> (NodeKey, NodeKey, NodeKey) {
        let mut w = store.begin_write().unwrap();
        let root = w
            .insert(
                InsertPosition::FirstChild(DOCUMENT_ROOT_KEY),
                NewNode::element(QName::local("catalog")),
            )
            .unwrap();
        let item = w
            .insert(InsertPosition::LastChild(root), NewNode::element(QName::local("item")))
            .unwrap();
        let text = w
            .insert(InsertPosition::FirstChild(item), NewNode::text("hello"))
            .unwrap();
        assert_eq!(w.commit().unwrap(), 0);
        (root, item, text)
    }

    #[test]
    fn test_revisions_numbered_from_zero() {
        let store = MemoryStore::new();
        assert_eq!(store.latest_revision(), None);
        catalog(&store);
        let w = store.begin_write().unwrap();
        assert_eq!(w.commit().unwrap(), 1);
        assert_eq!(store.revision_count(), 2);
        assert_eq!(store.latest_revision(), Some(1));
    }

    #[test]
    fn test_unchanged_records_are_shared() {
        let store = MemoryStore::new();
        let (root, item, text) = catalog(&store);

        let mut w = store.begin_write().unwrap();
        w.set_attribute(root, QName::local("version"), "2").unwrap();
        w.commit().unwrap();

        let r0 = store.revision(0).unwrap();
        let r1 = store.revision(1).unwrap();
        assert!(r1.shares_record_with(&r0, text));
        assert!(r1.shares_record_with(&r0, item));
        assert!(!r1.shares_record_with(&r0, root), "attributes and hash changed");
    }

    #[test]
    fn test_open_cursor_errors() {
        let store = MemoryStore::new();
        catalog(&store);
        assert_eq!(
            store.open_cursor(4, 0).unwrap_err(),
            RevTreeError::RevisionNotFound { revision: 4 }
        );
        assert_eq!(
            store.open_cursor(0, 99).unwrap_err(),
            RevTreeError::NodeNotFound {
                key: 99,
                revision: 0
            }
        );
        assert_eq!(store.open_cursor_count(), 0);
    }

    #[test]
    fn test_cursor_count_tracks_close_and_drop() {
        let store = MemoryStore::new();
        let (_, item, _) = catalog(&store);

        let mut a = store.open_cursor(0, item).unwrap();
        let b = store.open_cursor(0, DOCUMENT_ROOT_KEY).unwrap();
        assert_eq!(store.open_cursor_count(), 2);
        a.close().unwrap();
        a.close().unwrap();
        assert_eq!(store.open_cursor_count(), 1);
        drop(b);
        assert_eq!(store.open_cursor_count(), 0);
    }

    #[test]
    fn test_disabled_hashing_leaves_zero_hashes() {
        let store = MemoryStore::with_hashing(HashingPolicy::Disabled);
        let (root, _, text) = catalog(&store);
        let rev = store.revision(0).unwrap();
        assert_eq!(rev.node(root).map(|n| n.hash), Some(0));
        assert_eq!(rev.node(text).map(|n| n.kind), Some(NodeKind::Text));
        assert_eq!(rev.node(text).map(|n| n.hash), Some(0));
    }
}
