//! Seed importer orchestration
//!
//! Rebuilds every seeded revision in a fresh `MemoryStore`, keeping the
//! seed's node keys so identity carries across revisions.

use std::path::Path;
use std::time::Instant;

use revtree_core::model::{NodeKey, QName, DOCUMENT_ROOT_KEY};
use revtree_core::{log_op_end, log_op_error, log_op_start};

use crate::errors::{seed_import, Result};
use crate::memstore::{InsertPosition, MemoryStore, NewNode};
use crate::seed::format_v0::{SeedNode, SeedV0};
use crate::seed::{compute_seed_digest, parse_seed_file};

/// A store built from a seed file, plus what identifies that seed
pub struct ImportedSeed {
    pub store: MemoryStore,
    pub digest: String,
    pub document: String,
}

/// Parse, digest and import a seed file
///
/// This is the main entry point for seed import. It:
/// 1. Parses and validates the seed YAML
/// 2. Computes the seed digest
/// 3. Commits one store revision per seed revision
pub fn import_seed_file(path: &Path) -> Result<ImportedSeed> {
    let start = Instant::now();
    log_op_start!("seed_import", path = %path.display());

    let imported = parse_seed_file(path).and_then(|seed| {
        let digest = compute_seed_digest(&seed)?;
        let store = import_seed(&seed)?;
        Ok(ImportedSeed {
            store,
            digest,
            document: seed.document,
        })
    });

    let duration_ms = start.elapsed().as_millis() as u64;
    match &imported {
        Ok(seed) => {
            log_op_end!(
                "seed_import",
                duration_ms = duration_ms,
                revisions = seed.store.revision_count(),
                digest = %seed.digest
            );
        }
        Err(err) => {
            log_op_error!("seed_import", err.clone(), duration_ms = duration_ms);
        }
    }
    imported
}

/// Import an already validated seed
///
/// Attributes and namespace declarations get keys above every key the seed
/// names, so they never collide with a seeded node in a later revision.
pub fn import_seed(seed: &SeedV0) -> Result<MemoryStore> {
    let store = MemoryStore::with_hashing(seed.hashing);
    let reserved = seed
        .revisions
        .iter()
        .flat_map(|rev| rev.nodes.iter())
        .map(max_key)
        .max()
        .unwrap_or(DOCUMENT_ROOT_KEY);

    for (index, revision) in seed.revisions.iter().enumerate() {
        let mut writer = store
            .begin_rebuild(reserved)
            .map_err(|e| seed_import(index, e.into()))?;

        // Siblings pop in document order because children go on in reverse.
        let mut pending: Vec<(NodeKey, &SeedNode)> = revision
            .nodes
            .iter()
            .rev()
            .map(|node| (DOCUMENT_ROOT_KEY, node))
            .collect();
        while let Some((parent, node)) = pending.pop() {
            let new_node = to_new_node(node).map_err(|e| seed_import(index, e))?;
            writer
                .insert_with_key(InsertPosition::LastChild(parent), new_node, node.key)
                .map_err(|e| seed_import(index, e.into()))?;
            pending.extend(node.children.iter().rev().map(|child| (node.key, child)));
        }

        writer.commit().map_err(|e| seed_import(index, e.into()))?;
    }

    tracing::debug!(
        document = %seed.document,
        revisions = store.revision_count(),
        "seed imported"
    );
    Ok(store)
}

fn to_new_node(node: &SeedNode) -> Result<NewNode> {
    let mut new_node = match (&node.element, &node.text) {
        (Some(name), None) => NewNode::element(QName::parse(name)?),
        (None, Some(text)) => NewNode::text(text.clone()),
        _ => {
            return Err(crate::errors::seed_validation(&format!(
                "node {} must have exactly one of 'element' or 'text'",
                node.key
            )))
        }
    };
    for attr in &node.attributes {
        new_node = new_node.with_attribute(QName::parse(&attr.name)?, attr.value.clone());
    }
    for ns in &node.namespaces {
        new_node = new_node.with_namespace(ns.prefix.clone(), ns.uri.clone());
    }
    Ok(new_node)
}

fn max_key(node: &SeedNode) -> NodeKey {
    node.children
        .iter()
        .map(max_key)
        .fold(node.key, NodeKey::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::parse_seed_str;
    use revtree_core::model::NodeKind;
    use revtree_core::storage::{HashingPolicy, RevisionCursor, RevisionStore};

    const TWO_REVISIONS: &str = r#"
schema_version: 0
document: catalog
revisions:
  - nodes:
      - key: 10
        element: catalog
        attributes:
          - { name: version, value: "1" }
        children:
          - { key: 11, element: item, children: [ { key: 12, text: apple } ] }
          - { key: 13, element: item, children: [ { key: 14, text: pear } ] }
  - nodes:
      - key: 10
        element: catalog
        children:
          - { key: 13, element: item, children: [ { key: 14, text: pear } ] }
          - { key: 20, element: item, children: [ { key: 21, text: plum } ] }
"#;

    #[test]
    fn test_import_preserves_keys_and_order() {
        let seed = parse_seed_str(TWO_REVISIONS).unwrap();
        let store = import_seed(&seed).unwrap();
        assert_eq!(store.revision_count(), 2);

        let mut cursor = store.open_cursor(1, 10).unwrap();
        assert!(cursor.move_to_first_child());
        assert_eq!(cursor.key(), 13);
        assert!(cursor.move_to_right_sibling());
        assert_eq!(cursor.key(), 20);
        assert!(cursor.move_to_first_child());
        assert_eq!(cursor.node().kind, NodeKind::Text);
        assert_eq!(cursor.node().value.as_deref(), Some("plum"));

        assert!(store.open_cursor(1, 11).is_err());
        assert!(store.open_cursor(0, 11).is_ok());
    }

    #[test]
    fn test_attribute_keys_stay_above_seed_keys() {
        let seed = parse_seed_str(TWO_REVISIONS).unwrap();
        let store = import_seed(&seed).unwrap();
        let rev = store.revision(0).unwrap();
        let attr_key = rev.node(10).map(|n| n.attributes[0].key).unwrap();
        assert!(attr_key > 21);
    }

    #[test]
    fn test_unchanged_subtree_hashes_match_across_revisions() {
        let seed = parse_seed_str(TWO_REVISIONS).unwrap();
        let store = import_seed(&seed).unwrap();
        let r0 = store.revision(0).unwrap();
        let r1 = store.revision(1).unwrap();
        assert_eq!(
            r0.node(13).map(|n| n.hash),
            r1.node(13).map(|n| n.hash)
        );
        assert_ne!(
            r0.node(10).map(|n| n.hash),
            r1.node(10).map(|n| n.hash)
        );
    }

    #[test]
    fn test_seed_hashing_policy_is_applied() {
        let yaml = TWO_REVISIONS.replace("document: catalog", "document: catalog\nhashing: disabled");
        let seed = parse_seed_str(&yaml).unwrap();
        let store = import_seed(&seed).unwrap();
        assert_eq!(store.hashing_policy(), HashingPolicy::Disabled);
        assert_eq!(store.revision(0).unwrap().node(10).map(|n| n.hash), Some(0));
    }
}
