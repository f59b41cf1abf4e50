//! Resolves a disagreeing node pair into `Deleted`, `Updated` or `Inserted`.

use super::depth::DepthPair;
use super::model::DiffVerdict;
use super::variant::DiffVariant;
use crate::storage::RevisionCursor;

/// Search over the cursors' neighbourhood for where the two sides line up again
///
/// Every probe restores both cursors before returning.
pub struct RealignmentSearch<'a> {
    variant: &'a DiffVariant,
}

impl<'a> RealignmentSearch<'a> {
    pub fn new(variant: &'a DiffVariant) -> Self {
        Self { variant }
    }

    /// Classify a pair the variant considers unequal
    pub fn resolve<C: RevisionCursor>(
        &self,
        new: &mut C,
        old: &mut C,
        depth: DepthPair,
    ) -> DiffVerdict {
        if depth.old_is_deeper() {
            return DiffVerdict::Deleted;
        }
        if self.resyncs_after(new, old) || new.key() == old.key() {
            return DiffVerdict::Updated;
        }
        if self.old_sibling_matches(new, old) {
            DiffVerdict::Deleted
        } else {
            DiffVerdict::Inserted
        }
    }

    /// Both sides line up again right after this node: on the right siblings,
    /// or on the parents when neither side has a right sibling.
    fn resyncs_after<C: RevisionCursor>(&self, new: &mut C, old: &mut C) -> bool {
        let new_pos = new.position();
        let old_pos = old.position();

        let moved_new = new.move_to_right_sibling();
        let moved_old = old.move_to_right_sibling();
        let aligned = if moved_new && moved_old {
            self.variant.nodes_equal(new.node(), old.node())
        } else if !moved_new && !moved_old {
            new.move_to_parent()
                && old.move_to_parent()
                && self.variant.nodes_equal(new.node(), old.node())
        } else {
            false
        };

        new.restore(new_pos);
        old.restore(old_pos);
        aligned
    }

    /// Some later right sibling of the old node matches the new node
    fn old_sibling_matches<C: RevisionCursor>(&self, new: &C, old: &mut C) -> bool {
        let old_pos = old.position();
        let mut found = false;
        while old.move_to_right_sibling() {
            if self.variant.nodes_equal(new.node(), old.node()) {
                found = true;
                break;
            }
        }
        old.restore(old_pos);
        found
    }
}
