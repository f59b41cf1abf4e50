//! Seed digest canonicalization
//!
//! Computes stable SHA256 digests of seeds for reproducibility

use crate::errors::{serialization_error, Result};
use crate::seed::format_v0::{SeedNode, SeedV0};
use revtree_core::storage::HashingPolicy;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Canonical representation of a seed for digest calculation
///
/// Revision and node order are content and are kept. Attribute and
/// namespace order is not, so both are sorted.
#[derive(Debug, Clone, Serialize)]
struct CanonicalSeed {
    schema_version: u32,
    document: String,
    hashing: HashingPolicy,
    revisions: Vec<Vec<CanonicalNode>>,
}

#[derive(Debug, Clone, Serialize)]
struct CanonicalNode {
    key: u64,
    element: Option<String>,
    text: Option<String>,
    attributes: Vec<(String, String)>,
    namespaces: Vec<(Option<String>, String)>,
    children: Vec<CanonicalNode>,
}

/// Compute a stable digest for a seed
///
/// Returns a SHA256 hex digest of the canonicalized seed representation
pub fn compute_seed_digest(seed: &SeedV0) -> Result<String> {
    let canonical = canonicalize_seed(seed);

    let json =
        serde_json::to_string(&canonical).map_err(|e| serialization_error("seed_digest", e))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    let result = hasher.finalize();

    Ok(hex::encode(result))
}

fn canonicalize_seed(seed: &SeedV0) -> CanonicalSeed {
    CanonicalSeed {
        schema_version: seed.schema_version,
        document: seed.document.clone(),
        hashing: seed.hashing,
        revisions: seed
            .revisions
            .iter()
            .map(|rev| rev.nodes.iter().map(canonicalize_node).collect())
            .collect(),
    }
}

fn canonicalize_node(node: &SeedNode) -> CanonicalNode {
    let mut attributes: Vec<(String, String)> = node
        .attributes
        .iter()
        .map(|a| (a.name.clone(), a.value.clone()))
        .collect();
    attributes.sort();

    let mut namespaces: Vec<(Option<String>, String)> = node
        .namespaces
        .iter()
        .map(|ns| (ns.prefix.clone(), ns.uri.clone()))
        .collect();
    namespaces.sort();

    CanonicalNode {
        key: node.key,
        element: node.element.clone(),
        text: node.text.clone(),
        attributes,
        namespaces,
        children: node.children.iter().map(canonicalize_node).collect(),
    }
}
