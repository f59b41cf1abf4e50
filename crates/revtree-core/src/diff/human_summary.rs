//! Human-readable rendering of a diff event stream.

use super::model::{DiffEvent, DiffVerdict, VerdictCounts};
use crate::model::{NodeKind, NodeSnapshot};

/// Render one line per event plus a closing count line.
///
/// Lines are indented by depth and prefixed with `=` same, `+` inserted,
/// `-` deleted or `~` updated. Updated lines show `old -> new`.
pub fn render_human_summary(events: &[DiffEvent]) -> String {
    let mut out = String::new();

    for event in events {
        let depth = match event.verdict {
            DiffVerdict::Deleted => event.depth.old_depth,
            _ => event.depth.new_depth,
        };
        let indent = "  ".repeat(depth.saturating_sub(1).max(0) as usize);
        let (marker, label) = match (event.verdict, &event.new_node, &event.old_node) {
            (DiffVerdict::Updated, Some(new), Some(old)) => {
                ('~', format!("{} -> {}", describe(old), describe(new)))
            }
            (verdict, new, old) => {
                let node = new.as_ref().or(old.as_ref());
                (marker_for(verdict), node.map(describe).unwrap_or_default())
            }
        };
        out.push_str(&format!("{indent}{marker} {label}\n"));
    }

    let counts = VerdictCounts::from_events(events);
    out.push_str(&format!(
        "{} same, {} inserted, {} deleted, {} updated\n",
        counts.same, counts.inserted, counts.deleted, counts.updated
    ));
    out
}

fn marker_for(verdict: DiffVerdict) -> char {
    match verdict {
        DiffVerdict::Same | DiffVerdict::SameSubtree => '=',
        DiffVerdict::Inserted => '+',
        DiffVerdict::Deleted => '-',
        DiffVerdict::Updated => '~',
    }
}

fn describe(node: &NodeSnapshot) -> String {
    match node.kind {
        NodeKind::Text => format!("{:?} #{}", node.value.as_deref().unwrap_or(""), node.key),
        NodeKind::Root => format!("/ #{}", node.key),
        _ => format!("<{}> #{}", node.name.as_deref().unwrap_or("?"), node.key),
    }
}
