//! Engine-level commands that require I/O (seed files, worker threads).

use std::path::PathBuf;

use revtree_core::diff::ObserverSet;
use revtree_core::errors::ExError;
use revtree_core::model::RevisionNumber;

use crate::commands::diff::{diff_seed, DiffOptions, DiffReport};
use crate::commands::show::{show_seed_revision, RevisionListing};

/// Engine-level commands
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// Diff two revisions of a seeded document.
    Diff { seed: PathBuf, options: DiffOptions },
    /// List one revision of a seeded document; `None` means the latest.
    Show {
        seed: PathBuf,
        revision: Option<RevisionNumber>,
    },
}

/// Result of applying an engine command.
#[derive(Debug, Clone)]
pub enum EngineCommandResult {
    Diff(DiffReport),
    Show(RevisionListing),
}

/// Apply an engine command. `observers` receive the live event stream of
/// a diff in addition to the report.
pub async fn apply_engine_command(
    cmd: EngineCommand,
    observers: &ObserverSet,
) -> Result<EngineCommandResult, ExError> {
    match cmd {
        EngineCommand::Diff { seed, options } => {
            let report = diff_seed(seed, options, observers).await?;
            Ok(EngineCommandResult::Diff(report))
        }
        EngineCommand::Show { seed, revision } => {
            let listing = show_seed_revision(seed, revision).await?;
            Ok(EngineCommandResult::Show(listing))
        }
    }
}
