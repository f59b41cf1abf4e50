//! Post-order content hashes
//!
//! A node's hash covers its kind, name, value, attributes, namespace
//! declarations and the hashes of its children in order. Keys are not
//! hashed, so equal content under different keys hashes equally.

use std::collections::HashMap;
use std::sync::Arc;

use revtree_core::model::{NodeKey, NodeKind, TreeNode, DOCUMENT_ROOT_KEY};
use sha2::{Digest, Sha256};

/// Recompute every reachable node's hash, copying only records whose hash
/// actually changed.
pub(crate) fn rehash(nodes: &mut HashMap<NodeKey, Arc<TreeNode>>) {
    let mut preorder = Vec::with_capacity(nodes.len());
    let mut pending = vec![DOCUMENT_ROOT_KEY];
    while let Some(key) = pending.pop() {
        let Some(node) = nodes.get(&key) else {
            continue;
        };
        preorder.push(key);
        pending.extend(node.right_sibling);
        pending.extend(node.first_child);
    }

    // Reverse pre-order visits every node after all of its descendants.
    for key in preorder.into_iter().rev() {
        let Some(node) = nodes.get(&key) else {
            continue;
        };
        let mut child_hashes = Vec::new();
        let mut next = node.first_child;
        while let Some(child) = next.and_then(|k| nodes.get(&k)) {
            child_hashes.push(child.hash);
            next = child.right_sibling;
        }
        let hash = content_hash(node, &child_hashes);
        if node.hash != hash {
            if let Some(node) = nodes.get_mut(&key) {
                Arc::make_mut(node).hash = hash;
            }
        }
    }
}

/// Reset every hash to 0
pub(crate) fn clear(nodes: &mut HashMap<NodeKey, Arc<TreeNode>>) {
    for node in nodes.values_mut() {
        if node.hash != 0 {
            Arc::make_mut(node).hash = 0;
        }
    }
}

pub fn content_hash(node: &TreeNode, child_hashes: &[u64]) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update([kind_tag(node.kind)]);
    update_opt(&mut hasher, node.name.as_ref().map(ToString::to_string).as_deref());
    update_opt(&mut hasher, node.value.as_deref());

    let mut attributes: Vec<(String, &str)> = node
        .attributes
        .iter()
        .map(|attr| (attr.name.to_string(), attr.value.as_str()))
        .collect();
    attributes.sort();
    hasher.update((attributes.len() as u64).to_be_bytes());
    for (name, value) in &attributes {
        update_str(&mut hasher, name);
        update_str(&mut hasher, value);
    }

    let mut namespaces: Vec<(Option<&str>, &str)> = node
        .namespaces
        .iter()
        .map(|ns| (ns.prefix.as_deref(), ns.uri.as_str()))
        .collect();
    namespaces.sort();
    hasher.update((namespaces.len() as u64).to_be_bytes());
    for (prefix, uri) in namespaces {
        update_opt(&mut hasher, prefix);
        update_str(&mut hasher, uri);
    }

    hasher.update((child_hashes.len() as u64).to_be_bytes());
    for hash in child_hashes {
        hasher.update(hash.to_be_bytes());
    }

    let digest = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head)
}

fn kind_tag(kind: NodeKind) -> u8 {
    match kind {
        NodeKind::Root => 0,
        NodeKind::Element => 1,
        NodeKind::Text => 2,
        NodeKind::Attribute => 3,
        NodeKind::Namespace => 4,
        NodeKind::Deleted => 5,
    }
}

fn update_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_be_bytes());
    hasher.update(s.as_bytes());
}

fn update_opt(hasher: &mut Sha256, s: Option<&str>) {
    match s {
        Some(s) => {
            hasher.update([1u8]);
            update_str(hasher, s);
        }
        None => hasher.update([0u8]),
    }
}
