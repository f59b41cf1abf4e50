pub mod node;
pub mod qname;

pub use node::{Attribute, Namespace, NodeKind, NodeSnapshot, TreeNode};
pub use qname::QName;

/// Stable node identity, unchanged across revisions for the same logical node
pub type NodeKey = u64;

/// Revision number, assigned in commit order starting at 0
pub type RevisionNumber = u64;

/// Key of the synthetic document root, present in every revision
pub const DOCUMENT_ROOT_KEY: NodeKey = 0;
