use serde::{Deserialize, Serialize};

use super::{NodeKey, QName, DOCUMENT_ROOT_KEY};

/// Kind of a stored node
///
/// Only `Root`, `Element` and `Text` are reachable through structural links.
/// `Attribute` and `Namespace` records hang off their element, and `Deleted`
/// marks a tombstoned record that no live revision links to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Root,
    Element,
    Text,
    Attribute,
    Namespace,
    Deleted,
}

impl NodeKind {
    /// Whether nodes of this kind may have structural children
    pub fn is_container(&self) -> bool {
        matches!(self, NodeKind::Root | NodeKind::Element)
    }
}

/// Attribute attached to an element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: NodeKey,
    pub name: QName,
    pub value: String,
}

/// Namespace declaration attached to an element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub key: NodeKey,
    pub prefix: Option<String>,
    pub uri: String,
}

/// One node record of a revision
///
/// Structural links are keys rather than references; a cursor resolves them
/// against the revision it is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub key: NodeKey,
    pub kind: NodeKind,
    pub name: Option<QName>,
    pub value: Option<String>,
    pub parent: Option<NodeKey>,
    pub first_child: Option<NodeKey>,
    pub left_sibling: Option<NodeKey>,
    pub right_sibling: Option<NodeKey>,
    pub attributes: Vec<Attribute>,
    pub namespaces: Vec<Namespace>,
    /// Content hash of the subtree rooted here; 0 when hashing is disabled
    pub hash: u64,
}

impl TreeNode {
    /// The synthetic document root with no children
    pub fn document_root() -> Self {
        Self::bare(DOCUMENT_ROOT_KEY, NodeKind::Root)
    }

    /// Element with the given name and no links
    pub fn element(key: NodeKey, name: QName) -> Self {
        Self {
            name: Some(name),
            ..Self::bare(key, NodeKind::Element)
        }
    }

    /// Text node with the given value and no links
    pub fn text(key: NodeKey, value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::bare(key, NodeKind::Text)
        }
    }

    fn bare(key: NodeKey, kind: NodeKind) -> Self {
        Self {
            key,
            kind,
            name: None,
            value: None,
            parent: None,
            first_child: None,
            left_sibling: None,
            right_sibling: None,
            attributes: Vec::new(),
            namespaces: Vec::new(),
            hash: 0,
        }
    }

    pub fn has_first_child(&self) -> bool {
        self.first_child.is_some()
    }

    pub fn has_right_sibling(&self) -> bool {
        self.right_sibling.is_some()
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    pub fn is_document_root(&self) -> bool {
        self.key == DOCUMENT_ROOT_KEY
    }

    /// Owned copy of the fields observers get to see
    pub fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot {
            key: self.key,
            kind: self.kind,
            name: self.name.as_ref().map(ToString::to_string),
            value: self.value.clone(),
            hash: self.hash,
        }
    }
}

/// Observer-facing copy of a node, detached from any cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub key: NodeKey,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub hash: u64,
}
