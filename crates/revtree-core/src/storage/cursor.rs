use crate::errors::ExError;
use crate::model::{NodeKey, RevisionNumber, TreeNode};

/// Read-only navigator over one revision
///
/// Every `move_*` method either moves and returns `true`, or leaves the
/// cursor where it was and returns `false`.
pub trait RevisionCursor: Send {
    /// Saved location used to undo tentative probes
    type Position: Clone + Send;

    fn revision(&self) -> RevisionNumber;

    /// The node the cursor currently points at
    fn node(&self) -> &TreeNode;

    fn move_to(&mut self, key: NodeKey) -> bool;

    fn move_to_first_child(&mut self) -> bool;

    fn move_to_right_sibling(&mut self) -> bool;

    fn move_to_parent(&mut self) -> bool;

    /// The document root is live in every revision, so this cannot fail.
    fn move_to_document_root(&mut self);

    fn position(&self) -> Self::Position;

    fn restore(&mut self, position: Self::Position);

    /// Release the read view. Further navigation is unspecified.
    ///
    /// # Errors
    ///
    /// Returns an error if the store refuses the release.
    fn close(&mut self) -> Result<(), ExError>;

    fn key(&self) -> NodeKey {
        self.node().key
    }
}
