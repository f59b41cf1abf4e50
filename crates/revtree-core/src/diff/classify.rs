use super::depth::DepthPair;
use super::model::DiffVerdict;
use super::realign::RealignmentSearch;
use super::variant::DiffVariant;
use crate::storage::RevisionCursor;

/// Produces the verdict for the currently aligned pair
#[derive(Debug, Clone, Copy)]
pub struct DiffClassifier {
    variant: DiffVariant,
    optimized: bool,
}

impl DiffClassifier {
    /// `optimized` must already account for the store's hashing policy.
    pub fn new(variant: DiffVariant, optimized: bool) -> Self {
        Self { variant, optimized }
    }

    pub fn variant(&self) -> &DiffVariant {
        &self.variant
    }

    pub fn is_optimized(&self) -> bool {
        self.optimized
    }

    /// Classify the pair under both cursors.
    ///
    /// Returns `None` when the new node's kind does not participate; such
    /// nodes fire no event and count as `Same` for the walk.
    pub fn classify<C: RevisionCursor>(
        &self,
        new: &mut C,
        old: &mut C,
        depth: DepthPair,
    ) -> Option<DiffVerdict> {
        if !self.variant.participates(new.node().kind) {
            return None;
        }

        if self.optimized && new.node().hash == old.node().hash {
            return Some(DiffVerdict::SameSubtree);
        }
        if self.variant.nodes_equal(new.node(), old.node()) {
            return Some(DiffVerdict::Same);
        }
        Some(RealignmentSearch::new(&self.variant).resolve(new, old, depth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::fixture::FixtureTree;
    use crate::model::{NodeKind, TreeNode};

    static ELEMENTS_ONLY: &[NodeKind] = &[NodeKind::Element];

    fn pair() -> (FixtureTree, FixtureTree) {
        let mut old = FixtureTree::new();
        old.element(0, 1, "root").element(1, 2, "a").text(2, 3, "x");
        old.rehash();
        let mut new = FixtureTree::new();
        new.element(0, 1, "root").element(1, 2, "a").text(2, 4, "y");
        new.rehash();
        (old, new)
    }

    #[test]
    fn test_equal_hashes_short_circuit_in_optimized_mode() {
        let (mut old_tree, mut new_tree) = pair();
        new_tree.pin_hash(1, 42);
        old_tree.pin_hash(1, 42);

        let mut new = new_tree.cursor(1, 1);
        let mut old = old_tree.cursor(0, 1);
        let optimized = DiffClassifier::new(DiffVariant::structural(), true);
        assert_eq!(
            optimized.classify(&mut new, &mut old, DepthPair::default()),
            Some(DiffVerdict::SameSubtree)
        );

        let normal = DiffClassifier::new(DiffVariant::structural(), false);
        assert_eq!(
            normal.classify(&mut new, &mut old, DepthPair::default()),
            Some(DiffVerdict::Same)
        );
    }

    #[test]
    fn test_same_key_with_changed_descendants_is_same() {
        let (old_tree, new_tree) = pair();
        let mut new = new_tree.cursor(1, 2);
        let mut old = old_tree.cursor(0, 2);
        let classifier = DiffClassifier::new(DiffVariant::structural(), true);
        assert_eq!(
            classifier.classify(&mut new, &mut old, DepthPair::default()),
            Some(DiffVerdict::Same)
        );
    }

    #[test]
    fn test_unequal_pair_is_realigned() {
        let (old_tree, new_tree) = pair();
        let mut new = new_tree.cursor(1, 4);
        let mut old = old_tree.cursor(0, 3);
        let classifier = DiffClassifier::new(DiffVariant::structural(), true);
        let depth = DepthPair {
            new_depth: 3,
            old_depth: 3,
        };
        assert_eq!(
            classifier.classify(&mut new, &mut old, depth),
            Some(DiffVerdict::Updated)
        );
    }

    #[test]
    fn test_non_participating_kind_is_filtered() {
        let (old_tree, new_tree) = pair();
        let mut new = new_tree.cursor(1, 4);
        let mut old = old_tree.cursor(0, 3);
        let variant = DiffVariant::new("elements", |a: &TreeNode, b: &TreeNode| a.key == b.key, ELEMENTS_ONLY);
        let classifier = DiffClassifier::new(variant, false);
        assert_eq!(
            classifier.classify(&mut new, &mut old, DepthPair::default()),
            None
        );
    }
}
