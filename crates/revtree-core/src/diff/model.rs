//! Diff output types.
//!
//! Events derive `Serialize` so two runs can be compared byte for byte.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::depth::DepthPair;
use crate::model::NodeSnapshot;

/// Classification of one aligned node pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffVerdict {
    Same,
    /// Equal content hashes; the whole subtree is presumed identical
    SameSubtree,
    Inserted,
    Deleted,
    Updated,
}

impl DiffVerdict {
    /// The verdict as observers see it; `SameSubtree` is reported as `Same`
    pub fn reported(self) -> Self {
        match self {
            DiffVerdict::SameSubtree => DiffVerdict::Same,
            other => other,
        }
    }
}

impl fmt::Display for DiffVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiffVerdict::Same => "same",
            DiffVerdict::SameSubtree => "same_subtree",
            DiffVerdict::Inserted => "inserted",
            DiffVerdict::Deleted => "deleted",
            DiffVerdict::Updated => "updated",
        };
        f.write_str(label)
    }
}

/// Whether content hashes may short-circuit comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffMode {
    #[default]
    Normal,
    Optimized,
}

impl fmt::Display for DiffMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffMode::Normal => f.write_str("normal"),
            DiffMode::Optimized => f.write_str("optimized"),
        }
    }
}

impl FromStr for DiffMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(DiffMode::Normal),
            "optimized" => Ok(DiffMode::Optimized),
            other => Err(format!("unknown diff mode: {other}")),
        }
    }
}

/// One classified node or collapsed subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffEvent {
    pub verdict: DiffVerdict,
    /// Absent for `Deleted`
    pub new_node: Option<NodeSnapshot>,
    /// Absent for `Inserted`
    pub old_node: Option<NodeSnapshot>,
    pub depth: DepthPair,
}

impl DiffEvent {
    /// Build an event, dropping the side that has no counterpart
    pub fn new(
        verdict: DiffVerdict,
        new_node: NodeSnapshot,
        old_node: NodeSnapshot,
        depth: DepthPair,
    ) -> Self {
        let verdict = verdict.reported();
        Self {
            verdict,
            new_node: (verdict != DiffVerdict::Deleted).then_some(new_node),
            old_node: (verdict != DiffVerdict::Inserted).then_some(old_node),
            depth,
        }
    }

    /// An old node with no counterpart left on the new side
    pub fn deleted(old_node: NodeSnapshot, depth: DepthPair) -> Self {
        Self {
            verdict: DiffVerdict::Deleted,
            new_node: None,
            old_node: Some(old_node),
            depth,
        }
    }
}

/// Tally of reported verdicts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictCounts {
    pub same: usize,
    pub inserted: usize,
    pub deleted: usize,
    pub updated: usize,
}

impl VerdictCounts {
    pub fn record(&mut self, verdict: DiffVerdict) {
        match verdict.reported() {
            DiffVerdict::Same | DiffVerdict::SameSubtree => self.same += 1,
            DiffVerdict::Inserted => self.inserted += 1,
            DiffVerdict::Deleted => self.deleted += 1,
            DiffVerdict::Updated => self.updated += 1,
        }
    }

    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a DiffEvent>) -> Self {
        let mut counts = Self::default();
        for event in events {
            counts.record(event.verdict);
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.same + self.inserted + self.deleted + self.updated
    }

    /// True when every event was `Same`
    pub fn is_unchanged(&self) -> bool {
        self.inserted == 0 && self.deleted == 0 && self.updated == 0
    }
}

/// Result of a session that ran to completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffOutcome {
    pub events_fired: usize,
    pub counts: VerdictCounts,
    /// Whether hashes were used; false when hashing is disabled in the store
    pub optimized: bool,
}
