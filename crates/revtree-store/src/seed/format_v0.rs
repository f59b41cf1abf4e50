//! Seed Format v0 schema
//!
//! Defines the YAML structure for seeding a store with a sequence of
//! revisions of one document

use revtree_core::model::{NodeKey, NodeKind};
use revtree_core::storage::HashingPolicy;
use serde::{Deserialize, Serialize};

/// Largest key a seed may name. Keys above it stay free for the attribute
/// and namespace declarations the importer allocates.
pub const MAX_SEED_KEY: NodeKey = NodeKey::MAX / 2;

/// Top-level seed file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedV0 {
    /// Schema version (must be 0 for this format)
    pub schema_version: u32,

    /// Document name, used for display only
    pub document: String,

    /// Hashing policy of the store built from this seed
    #[serde(default)]
    pub hashing: HashingPolicy,

    /// Revisions in commit order; revision `i` of the store is entry `i`
    pub revisions: Vec<SeedRevision>,
}

/// Full content of one revision
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedRevision {
    /// Children of the document root, in order
    #[serde(default)]
    pub nodes: Vec<SeedNode>,
}

/// A structural node. Exactly one of `element` or `text` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedNode {
    /// Stable key; the same logical node keeps its key across revisions
    pub key: NodeKey,

    /// Qualified element name (`local` or `prefix:local`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,

    /// Text value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<SeedAttribute>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<SeedNamespace>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SeedNode>,
}

impl SeedNode {
    /// `None` when both or neither of `element` and `text` are set
    pub fn kind(&self) -> Option<NodeKind> {
        match (&self.element, &self.text) {
            (Some(_), None) => Some(NodeKind::Element),
            (None, Some(_)) => Some(NodeKind::Text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedAttribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedNamespace {
    #[serde(default)]
    pub prefix: Option<String>,
    pub uri: String,
}
