//! Equality and participation policies for a diff.
//!
//! A variant is a value, not a type: new variants are new constructors.

use std::fmt;

use crate::model::{Attribute, Namespace, NodeKind, TreeNode};

/// Node equality predicate used for alignment
pub type NodeEquality = fn(&TreeNode, &TreeNode) -> bool;

const STRUCTURAL_KINDS: &[NodeKind] = &[NodeKind::Root, NodeKind::Element, NodeKind::Text];

/// Policy deciding what "the same node" means and which kinds are visited
#[derive(Clone, Copy)]
pub struct DiffVariant {
    name: &'static str,
    node_equality: NodeEquality,
    participating: &'static [NodeKind],
}

impl DiffVariant {
    pub const STRUCTURAL: &'static str = "structural";
    pub const FULL: &'static str = "full";

    /// Build a custom variant
    pub fn new(
        name: &'static str,
        node_equality: NodeEquality,
        participating: &'static [NodeKind],
    ) -> Self {
        Self {
            name,
            node_equality,
            participating,
        }
    }

    /// Identity only: two nodes are the same when their keys match
    pub fn structural() -> Self {
        Self::new(Self::STRUCTURAL, same_key, STRUCTURAL_KINDS)
    }

    /// Identity plus content: kind, name, text value, attributes and namespaces
    pub fn full() -> Self {
        Self::new(Self::FULL, same_key_and_content, STRUCTURAL_KINDS)
    }

    /// Look up a built-in variant by name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            Self::STRUCTURAL => Some(Self::structural()),
            Self::FULL => Some(Self::full()),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn nodes_equal(&self, new: &TreeNode, old: &TreeNode) -> bool {
        (self.node_equality)(new, old)
    }

    pub fn participates(&self, kind: NodeKind) -> bool {
        self.participating.contains(&kind)
    }
}

impl fmt::Debug for DiffVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffVariant")
            .field("name", &self.name)
            .field("participating", &self.participating)
            .finish()
    }
}

fn same_key(new: &TreeNode, old: &TreeNode) -> bool {
    new.key == old.key
}

fn same_key_and_content(new: &TreeNode, old: &TreeNode) -> bool {
    new.key == old.key
        && new.kind == old.kind
        && new.name == old.name
        && new.value == old.value
        && attribute_set(&new.attributes) == attribute_set(&old.attributes)
        && namespace_set(&new.namespaces) == namespace_set(&old.namespaces)
}

// Attribute and namespace records get fresh keys when rewritten, so they
// compare by content and ignore declaration order.
fn attribute_set(attributes: &[Attribute]) -> Vec<(String, &str)> {
    let mut set: Vec<_> = attributes
        .iter()
        .map(|a| (a.name.to_string(), a.value.as_str()))
        .collect();
    set.sort();
    set
}

fn namespace_set(namespaces: &[Namespace]) -> Vec<(Option<&str>, &str)> {
    let mut set: Vec<_> = namespaces
        .iter()
        .map(|n| (n.prefix.as_deref(), n.uri.as_str()))
        .collect();
    set.sort();
    set
}
