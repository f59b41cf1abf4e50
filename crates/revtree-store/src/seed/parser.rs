//! Seed parser with validation
//!
//! Parses YAML and validates schema version, node shape and key identity
//! across revisions

use crate::errors::{io_error, seed_validation, Result, SeedError};
use crate::seed::format_v0::{SeedNode, SeedV0, MAX_SEED_KEY};
use revtree_core::model::{NodeKey, NodeKind, QName};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Parse a seed file from a path
pub fn parse_seed_file(path: &Path) -> Result<SeedV0> {
    let content = fs::read_to_string(path).map_err(|e| io_error("seed_parse", e))?;
    parse_seed_str(&content)
}

/// Parse a seed from a string
pub fn parse_seed_str(content: &str) -> Result<SeedV0> {
    let seed: SeedV0 = serde_yaml::from_str(content)
        .map_err(|e| seed_validation(&format!("YAML parse error: {}", e)))?;

    validate_seed(&seed)?;

    Ok(seed)
}

/// Validate a parsed seed
///
/// Checks run in revision order and stop at the first violation.
pub fn validate_seed(seed: &SeedV0) -> std::result::Result<(), SeedError> {
    if seed.schema_version != 0 {
        return Err(SeedError::UnsupportedSchemaVersion {
            found: seed.schema_version,
        });
    }
    if seed.document.trim().is_empty() {
        return Err(SeedError::MissingDocumentName);
    }
    if seed.revisions.is_empty() {
        return Err(SeedError::NoRevisions);
    }

    let mut kinds: HashMap<NodeKey, NodeKind> = HashMap::new();
    let mut removed: HashSet<NodeKey> = HashSet::new();
    let mut previous: HashSet<NodeKey> = HashSet::new();

    for (revision, content) in seed.revisions.iter().enumerate() {
        let mut present = HashSet::new();
        let mut pending: Vec<&SeedNode> = content.nodes.iter().collect();

        while let Some(node) = pending.pop() {
            let key = node.key;
            if key == 0 {
                return Err(SeedError::ReservedKey { revision });
            }
            if key > MAX_SEED_KEY {
                return Err(SeedError::KeyOutOfRange {
                    revision,
                    key,
                    max: MAX_SEED_KEY,
                });
            }
            if !present.insert(key) {
                return Err(SeedError::DuplicateKey { revision, key });
            }
            if removed.contains(&key) {
                return Err(SeedError::KeyResurrected { revision, key });
            }

            let kind = node
                .kind()
                .ok_or(SeedError::AmbiguousKind { revision, key })?;
            if *kinds.entry(key).or_insert(kind) != kind {
                return Err(SeedError::KindChanged { revision, key });
            }

            match kind {
                NodeKind::Text => {
                    if !node.children.is_empty()
                        || !node.attributes.is_empty()
                        || !node.namespaces.is_empty()
                    {
                        return Err(SeedError::TextWithContent { revision, key });
                    }
                }
                _ => {
                    let names = node
                        .element
                        .iter()
                        .chain(node.attributes.iter().map(|attr| &attr.name));
                    for name in names {
                        if QName::parse(name).is_err() {
                            return Err(SeedError::InvalidName {
                                revision,
                                key,
                                name: name.clone(),
                            });
                        }
                    }
                }
            }

            pending.extend(node.children.iter());
        }

        removed.extend(previous.difference(&present).copied());
        previous = present;
    }

    Ok(())
}
