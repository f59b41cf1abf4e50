//! Indented listing of one revision.

use std::fmt::Write as _;
use std::path::PathBuf;

use revtree_core::errors::{ExError, ExErrorKind};
use revtree_core::model::{NodeKind, RevisionNumber, TreeNode, DOCUMENT_ROOT_KEY};
use revtree_core::storage::{RevisionCursor, RevisionStore};

use crate::commands::diff::load_seed;

#[derive(Debug, Clone)]
pub struct RevisionListing {
    pub document: String,
    pub seed_digest: String,
    pub revision: RevisionNumber,
    pub lines: Vec<String>,
}

/// Import `seed` and list `revision`, or the latest one.
///
/// # Errors
///
/// Seed errors from the import, or `NotFound` for an unknown revision.
pub async fn show_seed_revision(
    seed: PathBuf,
    revision: Option<RevisionNumber>,
) -> Result<RevisionListing, ExError> {
    let imported = load_seed(seed).await?;
    let revision = match revision.or_else(|| imported.store.latest_revision()) {
        Some(revision) => revision,
        None => {
            return Err(ExError::new(ExErrorKind::NotFound)
                .with_op("show_revision")
                .with_message("store has no revisions"))
        }
    };
    let lines = render_revision(&imported.store, revision)?;
    Ok(RevisionListing {
        document: imported.document,
        seed_digest: imported.digest,
        revision,
        lines,
    })
}

/// One line per structural node in document order, indented two spaces per
/// level below the document root.
///
/// # Errors
///
/// `NotFound` if the revision does not exist.
pub fn render_revision<S: RevisionStore>(
    store: &S,
    revision: RevisionNumber,
) -> Result<Vec<String>, ExError> {
    let mut cursor = store
        .open_cursor(revision, DOCUMENT_ROOT_KEY)
        .map_err(|e| ExError::from(e).with_op("show_revision"))?;

    let mut lines = Vec::new();
    let mut depth = 0usize;
    'walk: loop {
        if cursor.move_to_first_child() {
            depth += 1;
        } else {
            loop {
                if depth == 0 {
                    break 'walk;
                }
                if cursor.move_to_right_sibling() {
                    break;
                }
                cursor.move_to_parent();
                depth -= 1;
            }
        }
        lines.push(format!(
            "{}{}",
            "  ".repeat(depth.saturating_sub(1)),
            describe(cursor.node())
        ));
    }

    cursor.close()?;
    Ok(lines)
}

fn describe(node: &TreeNode) -> String {
    let mut out = String::new();
    match node.kind {
        NodeKind::Text => {
            let _ = write!(out, "{:?}", node.value.as_deref().unwrap_or_default());
        }
        _ => {
            let name = node.name.as_ref().map(ToString::to_string).unwrap_or_default();
            let _ = write!(out, "<{name}");
            for ns in &node.namespaces {
                match &ns.prefix {
                    Some(prefix) => {
                        let _ = write!(out, " xmlns:{prefix}={:?}", ns.uri);
                    }
                    None => {
                        let _ = write!(out, " xmlns={:?}", ns.uri);
                    }
                }
            }
            for attr in &node.attributes {
                let _ = write!(out, " {}={:?}", attr.name, attr.value);
            }
            out.push('>');
        }
    }
    let _ = write!(out, " #{}", node.key);
    out
}
