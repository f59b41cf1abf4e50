use std::collections::HashMap;
use std::sync::{Arc, MutexGuard};

use revtree_core::errors::RevTreeError;
use revtree_core::model::{
    Attribute, Namespace, NodeKey, NodeKind, QName, RevisionNumber, TreeNode, DOCUMENT_ROOT_KEY,
};

use super::{hashing, MemoryStore};

/// Where a new node goes, relative to an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    FirstChild(NodeKey),
    LastChild(NodeKey),
    RightSibling(NodeKey),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Content {
    Element(QName),
    Text(String),
}

/// Content of a node about to be inserted; the writer assigns its key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNode {
    content: Content,
    attributes: Vec<(QName, String)>,
    namespaces: Vec<(Option<String>, String)>,
}

impl NewNode {
    pub fn element(name: QName) -> Self {
        Self {
            content: Content::Element(name),
            attributes: Vec::new(),
            namespaces: Vec::new(),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self {
            content: Content::Text(value.into()),
            attributes: Vec::new(),
            namespaces: Vec::new(),
        }
    }

    /// Only valid on elements; inserting a text node with attributes fails
    pub fn with_attribute(mut self, name: QName, value: impl Into<String>) -> Self {
        self.attributes.push((name, value.into()));
        self
    }

    pub fn with_namespace(mut self, prefix: Option<String>, uri: impl Into<String>) -> Self {
        self.namespaces.push((prefix, uri.into()));
        self
    }

    fn kind(&self) -> NodeKind {
        match self.content {
            Content::Element(_) => NodeKind::Element,
            Content::Text(_) => NodeKind::Text,
        }
    }
}

/// Builds the next revision of a [`MemoryStore`]
///
/// Holds the store's writer lock until committed or dropped. Dropping
/// without committing discards every edit.
#[derive(Debug)]
pub struct RevisionWriter<'a> {
    store: &'a MemoryStore,
    _guard: MutexGuard<'a, ()>,
    nodes: HashMap<NodeKey, Arc<TreeNode>>,
    next_key: NodeKey,
    pinned: HashMap<NodeKey, u64>,
}

impl<'a> RevisionWriter<'a> {
    pub(crate) fn new(
        store: &'a MemoryStore,
        guard: MutexGuard<'a, ()>,
        nodes: HashMap<NodeKey, Arc<TreeNode>>,
        next_key: NodeKey,
    ) -> Self {
        Self {
            store,
            _guard: guard,
            nodes,
            next_key,
            pinned: HashMap::new(),
        }
    }

    /// Node as it stands in the pending revision
    pub fn node(&self, key: NodeKey) -> Option<&TreeNode> {
        self.nodes.get(&key).map(Arc::as_ref)
    }

    /// Insert a node under a freshly allocated key
    ///
    /// # Errors
    ///
    /// Fails if the anchor does not exist, the parent cannot hold children,
    /// the anchor is the document root for `RightSibling`, or a text node
    /// carries attributes or namespaces.
    pub fn insert(&mut self, at: InsertPosition, node: NewNode) -> Result<NodeKey, RevTreeError> {
        let key = self.next_key;
        self.insert_with_key(at, node, key)?;
        Ok(key)
    }

    /// Insert a node under a caller-chosen key. Used by seed import.
    pub(crate) fn insert_with_key(
        &mut self,
        at: InsertPosition,
        node: NewNode,
        key: NodeKey,
    ) -> Result<(), RevTreeError> {
        if key == DOCUMENT_ROOT_KEY || self.nodes.contains_key(&key) {
            return Err(RevTreeError::KeyInUse { key });
        }
        if node.kind() == NodeKind::Text
            && (!node.attributes.is_empty() || !node.namespaces.is_empty())
        {
            return Err(RevTreeError::NotAnElement {
                key,
                kind: NodeKind::Text,
            });
        }

        let after = key
            .checked_add(1)
            .ok_or(RevTreeError::KeySpaceExhausted { last: key })?;
        let (parent, left, right) = self.resolve(at)?;
        self.next_key = self.next_key.max(after);

        let mut record = match node.content {
            Content::Element(name) => TreeNode::element(key, name),
            Content::Text(value) => TreeNode::text(key, value),
        };
        record.parent = Some(parent);
        record.left_sibling = left;
        record.right_sibling = right;
        for (name, value) in node.attributes {
            let attr_key = self.allocate()?;
            record.attributes.push(Attribute {
                key: attr_key,
                name,
                value,
            });
        }
        for (prefix, uri) in node.namespaces {
            let ns_key = self.allocate()?;
            record.namespaces.push(Namespace {
                key: ns_key,
                prefix,
                uri,
            });
        }

        match left {
            Some(left) => self.get_mut(left)?.right_sibling = Some(key),
            None => self.get_mut(parent)?.first_child = Some(key),
        }
        if let Some(right) = right {
            self.get_mut(right)?.left_sibling = Some(key);
        }
        self.nodes.insert(key, Arc::new(record));
        Ok(())
    }

    /// Parent, left sibling and right sibling for a node placed at `at`
    fn resolve(
        &self,
        at: InsertPosition,
    ) -> Result<(NodeKey, Option<NodeKey>, Option<NodeKey>), RevTreeError> {
        match at {
            InsertPosition::FirstChild(parent) => {
                let node = self.container(parent)?;
                Ok((parent, None, node.first_child))
            }
            InsertPosition::LastChild(parent) => {
                let node = self.container(parent)?;
                let mut last = None;
                let mut next = node.first_child;
                while let Some(key) = next {
                    last = Some(key);
                    next = self.get(key)?.right_sibling;
                }
                Ok((parent, last, None))
            }
            InsertPosition::RightSibling(sibling) => {
                let node = self.get(sibling)?;
                match node.parent {
                    Some(parent) if !node.is_document_root() => {
                        Ok((parent, Some(sibling), node.right_sibling))
                    }
                    _ => Err(RevTreeError::SiblingOfDocumentRoot),
                }
            }
        }
    }

    /// Replace the value of a text node; the key is kept
    ///
    /// # Errors
    ///
    /// `PendingNodeNotFound` or `NotAText`.
    pub fn set_value(&mut self, key: NodeKey, value: impl Into<String>) -> Result<(), RevTreeError> {
        self.expect_kind(key, NodeKind::Text)?;
        self.get_mut(key)?.value = Some(value.into());
        Ok(())
    }

    /// Remove a text node and insert a new one with `value` at the same
    /// position. The replacement gets a new key.
    ///
    /// # Errors
    ///
    /// `PendingNodeNotFound` or `NotAText`.
    pub fn replace_text(
        &mut self,
        key: NodeKey,
        value: impl Into<String>,
    ) -> Result<NodeKey, RevTreeError> {
        self.expect_kind(key, NodeKind::Text)?;
        let node = self.get(key)?;
        let at = match (node.left_sibling, node.parent) {
            (Some(left), _) => InsertPosition::RightSibling(left),
            (None, Some(parent)) => InsertPosition::FirstChild(parent),
            (None, None) => {
                return Err(RevTreeError::Internal {
                    message: format!("text node {key} has no parent"),
                })
            }
        };
        self.remove(key)?;
        self.insert(at, NewNode::text(value))
    }

    /// # Errors
    ///
    /// `PendingNodeNotFound` or `NotAnElement`.
    pub fn rename(&mut self, key: NodeKey, name: QName) -> Result<(), RevTreeError> {
        self.expect_kind(key, NodeKind::Element)?;
        self.get_mut(key)?.name = Some(name);
        Ok(())
    }

    /// Set or overwrite an attribute. Overwriting keeps the attribute's key.
    ///
    /// # Errors
    ///
    /// `PendingNodeNotFound` or `NotAnElement`.
    pub fn set_attribute(
        &mut self,
        key: NodeKey,
        name: QName,
        value: impl Into<String>,
    ) -> Result<(), RevTreeError> {
        self.expect_kind(key, NodeKind::Element)?;
        let value = value.into();
        let existing = self
            .get(key)?
            .attributes
            .iter()
            .position(|attr| attr.name == name);
        match existing {
            Some(index) => self.get_mut(key)?.attributes[index].value = value,
            None => {
                let attr_key = self.allocate()?;
                self.get_mut(key)?.attributes.push(Attribute {
                    key: attr_key,
                    name,
                    value,
                });
            }
        }
        Ok(())
    }

    /// Returns whether an attribute with that name was present
    ///
    /// # Errors
    ///
    /// `PendingNodeNotFound` or `NotAnElement`.
    pub fn remove_attribute(&mut self, key: NodeKey, name: &QName) -> Result<bool, RevTreeError> {
        self.expect_kind(key, NodeKind::Element)?;
        if !self.get(key)?.attributes.iter().any(|attr| &attr.name == name) {
            return Ok(false);
        }
        self.get_mut(key)?.attributes.retain(|attr| &attr.name != name);
        Ok(true)
    }

    /// Declare a namespace on an element, returning the declaration's key
    ///
    /// # Errors
    ///
    /// `PendingNodeNotFound` or `NotAnElement`.
    pub fn add_namespace(
        &mut self,
        key: NodeKey,
        prefix: Option<String>,
        uri: impl Into<String>,
    ) -> Result<NodeKey, RevTreeError> {
        self.expect_kind(key, NodeKind::Element)?;
        let ns_key = self.allocate()?;
        self.get_mut(key)?.namespaces.push(Namespace {
            key: ns_key,
            prefix,
            uri: uri.into(),
        });
        Ok(ns_key)
    }

    /// Remove a node together with its whole subtree
    ///
    /// # Errors
    ///
    /// `CannotRemoveDocumentRoot` or `PendingNodeNotFound`.
    pub fn remove(&mut self, key: NodeKey) -> Result<(), RevTreeError> {
        if key == DOCUMENT_ROOT_KEY {
            return Err(RevTreeError::CannotRemoveDocumentRoot);
        }
        let node = Arc::clone(self.get(key)?);

        match node.left_sibling {
            Some(left) => self.get_mut(left)?.right_sibling = node.right_sibling,
            None => {
                if let Some(parent) = node.parent {
                    self.get_mut(parent)?.first_child = node.right_sibling;
                }
            }
        }
        if let Some(right) = node.right_sibling {
            self.get_mut(right)?.left_sibling = node.left_sibling;
        }

        let mut pending: Vec<NodeKey> = node.first_child.into_iter().collect();
        while let Some(next) = pending.pop() {
            if let Some(child) = self.nodes.remove(&next) {
                pending.extend(child.first_child);
                pending.extend(child.right_sibling);
            }
            self.pinned.remove(&next);
        }
        self.nodes.remove(&key);
        self.pinned.remove(&key);
        Ok(())
    }

    /// Override the computed hash of `key` for this commit only
    ///
    /// # Errors
    ///
    /// `PendingNodeNotFound`.
    pub fn pin_hash(&mut self, key: NodeKey, hash: u64) -> Result<(), RevTreeError> {
        self.get(key)?;
        self.pinned.insert(key, hash);
        Ok(())
    }

    /// Recompute hashes per the store's policy and publish the revision
    ///
    /// # Errors
    ///
    /// `LockPoisoned` if the revision list is poisoned.
    pub fn commit(mut self) -> Result<RevisionNumber, RevTreeError> {
        if self.store.hashing().is_enabled() {
            hashing::rehash(&mut self.nodes);
        } else {
            hashing::clear(&mut self.nodes);
        }
        for (key, hash) in &self.pinned {
            if let Some(node) = self.nodes.get_mut(key) {
                Arc::make_mut(node).hash = *hash;
            }
        }
        let nodes = std::mem::take(&mut self.nodes);
        self.store.push_revision(nodes, self.next_key - 1)
    }

    fn allocate(&mut self) -> Result<NodeKey, RevTreeError> {
        let key = self.next_key;
        self.next_key = key
            .checked_add(1)
            .ok_or(RevTreeError::KeySpaceExhausted { last: key })?;
        Ok(key)
    }

    fn get(&self, key: NodeKey) -> Result<&Arc<TreeNode>, RevTreeError> {
        self.nodes
            .get(&key)
            .ok_or(RevTreeError::PendingNodeNotFound { key })
    }

    fn get_mut(&mut self, key: NodeKey) -> Result<&mut TreeNode, RevTreeError> {
        self.nodes
            .get_mut(&key)
            .map(Arc::make_mut)
            .ok_or(RevTreeError::PendingNodeNotFound { key })
    }

    fn container(&self, key: NodeKey) -> Result<&TreeNode, RevTreeError> {
        let node = self.get(key)?;
        if !node.kind.is_container() {
            return Err(RevTreeError::NotAContainer {
                key,
                kind: node.kind,
            });
        }
        Ok(node)
    }

    fn expect_kind(&self, key: NodeKey, expected: NodeKind) -> Result<(), RevTreeError> {
        let kind = self.get(key)?.kind;
        if kind == expected {
            return Ok(());
        }
        Err(match expected {
            NodeKind::Text => RevTreeError::NotAText { key, kind },
            _ => RevTreeError::NotAnElement { key, kind },
        })
    }
}
