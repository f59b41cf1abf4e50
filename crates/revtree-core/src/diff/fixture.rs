//! In-memory trees for unit tests of the diff modules.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::{ExError, RevTreeError};
use crate::model::{NodeKey, QName, RevisionNumber, TreeNode, DOCUMENT_ROOT_KEY};
use crate::storage::{HashingPolicy, RevisionCursor, RevisionStore};

/// A tree addressed by key, built by appending children
#[derive(Clone)]
pub(crate) struct FixtureTree {
    nodes: HashMap<NodeKey, TreeNode>,
    open: Arc<AtomicUsize>,
}

impl FixtureTree {
    pub(crate) fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(DOCUMENT_ROOT_KEY, TreeNode::document_root());
        Self {
            nodes,
            open: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn element(&mut self, parent: NodeKey, key: NodeKey, name: &str) -> &mut Self {
        self.append(parent, TreeNode::element(key, QName::local(name)))
    }

    pub(crate) fn text(&mut self, parent: NodeKey, key: NodeKey, value: &str) -> &mut Self {
        self.append(parent, TreeNode::text(key, value))
    }

    fn append(&mut self, parent: NodeKey, mut node: TreeNode) -> &mut Self {
        node.parent = Some(parent);
        let mut last = self.nodes[&parent].first_child;
        let mut prev = None;
        while let Some(key) = last {
            prev = Some(key);
            last = self.nodes[&key].right_sibling;
        }
        node.left_sibling = prev;
        match prev {
            Some(prev) => self.nodes.get_mut(&prev).unwrap().right_sibling = Some(node.key),
            None => self.nodes.get_mut(&parent).unwrap().first_child = Some(node.key),
        }
        self.nodes.insert(node.key, node);
        self
    }

    /// Recompute content hashes bottom-up
    pub(crate) fn rehash(&mut self) -> &mut Self {
        self.hash_subtree(DOCUMENT_ROOT_KEY);
        self
    }

    fn hash_subtree(&mut self, key: NodeKey) -> u64 {
        let mut hasher = DefaultHasher::new();
        let node = &self.nodes[&key];
        node.kind.hash(&mut hasher);
        node.name.hash(&mut hasher);
        node.value.hash(&mut hasher);
        let mut child = node.first_child;
        while let Some(c) = child {
            self.hash_subtree(c).hash(&mut hasher);
            child = self.nodes[&c].right_sibling;
        }
        let hash = hasher.finish();
        self.nodes.get_mut(&key).unwrap().hash = hash;
        hash
    }

    pub(crate) fn pin_hash(&mut self, key: NodeKey, hash: u64) -> &mut Self {
        self.nodes.get_mut(&key).unwrap().hash = hash;
        self
    }

    pub(crate) fn cursor(&self, revision: RevisionNumber, key: NodeKey) -> FixtureCursor {
        assert!(self.nodes.contains_key(&key), "fixture has no node {key}");
        self.open.fetch_add(1, Ordering::SeqCst);
        FixtureCursor {
            revision,
            nodes: Arc::new(self.nodes.clone()),
            current: key,
            open: Arc::clone(&self.open),
            closed: false,
        }
    }

    /// Cursors handed out and not yet closed
    pub(crate) fn open_cursors(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

pub(crate) struct FixtureCursor {
    revision: RevisionNumber,
    nodes: Arc<HashMap<NodeKey, TreeNode>>,
    current: NodeKey,
    open: Arc<AtomicUsize>,
    closed: bool,
}

impl FixtureCursor {
    fn follow(&mut self, link: Option<NodeKey>) -> bool {
        match link {
            Some(key) => {
                self.current = key;
                true
            }
            None => false,
        }
    }
}

impl RevisionCursor for FixtureCursor {
    type Position = NodeKey;

    fn revision(&self) -> RevisionNumber {
        self.revision
    }

    fn node(&self) -> &TreeNode {
        &self.nodes[&self.current]
    }

    fn move_to(&mut self, key: NodeKey) -> bool {
        self.nodes.contains_key(&key) && self.follow(Some(key))
    }

    fn move_to_first_child(&mut self) -> bool {
        self.follow(self.node().first_child)
    }

    fn move_to_right_sibling(&mut self) -> bool {
        self.follow(self.node().right_sibling)
    }

    fn move_to_parent(&mut self) -> bool {
        self.follow(self.node().parent)
    }

    fn move_to_document_root(&mut self) {
        self.current = DOCUMENT_ROOT_KEY;
    }

    fn position(&self) -> NodeKey {
        self.current
    }

    fn restore(&mut self, position: NodeKey) {
        self.current = position;
    }

    fn close(&mut self) -> Result<(), ExError> {
        if !self.closed {
            self.closed = true;
            self.open.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Revisions numbered by position
pub(crate) struct FixtureStore {
    pub(crate) revisions: Vec<FixtureTree>,
    pub(crate) hashing: HashingPolicy,
}

impl RevisionStore for FixtureStore {
    type Cursor = FixtureCursor;

    fn open_cursor(
        &self,
        revision: RevisionNumber,
        key: NodeKey,
    ) -> Result<FixtureCursor, RevTreeError> {
        let tree = self
            .revisions
            .get(revision as usize)
            .ok_or(RevTreeError::RevisionNotFound { revision })?;
        if !tree.nodes.contains_key(&key) {
            return Err(RevTreeError::NodeNotFound { key, revision });
        }
        Ok(tree.cursor(revision, key))
    }

    fn hashing_policy(&self) -> HashingPolicy {
        self.hashing
    }

    fn latest_revision(&self) -> Option<RevisionNumber> {
        self.revisions.len().checked_sub(1).map(|r| r as RevisionNumber)
    }
}
