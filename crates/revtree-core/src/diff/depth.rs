use serde::{Deserialize, Serialize};

/// Which revision a cursor walks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    New,
    Old,
}

/// Depth of each cursor below the session's start node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthPair {
    pub new_depth: i64,
    pub old_depth: i64,
}

impl DepthPair {
    pub fn get(&self, side: Side) -> i64 {
        match side {
            Side::New => self.new_depth,
            Side::Old => self.old_depth,
        }
    }

    /// The old side is deeper than the new side
    pub fn old_is_deeper(&self) -> bool {
        self.old_depth > self.new_depth
    }
}

/// Running depth counters, one per side, moved independently
#[derive(Debug, Default)]
pub struct DepthTracker {
    pair: DepthPair,
}

impl DepthTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pair(&self) -> DepthPair {
        self.pair
    }

    pub fn increment(&mut self, side: Side) {
        *self.slot(side) += 1;
    }

    pub fn decrement(&mut self, side: Side) {
        *self.slot(side) -= 1;
    }

    fn slot(&mut self, side: Side) -> &mut i64 {
        match side {
            Side::New => &mut self.pair.new_depth,
            Side::Old => &mut self.pair.old_depth,
        }
    }
}
