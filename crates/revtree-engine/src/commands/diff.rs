//! Diff two revisions of a seeded document.

use std::path::PathBuf;
use std::sync::Arc;

use revtree_core::diff::{
    CollectingObserver, DiffEvent, DiffMode, DiffOutcome, DiffVariant, ObserverSet,
};
use revtree_core::errors::{ExError, ExErrorKind};
use revtree_core::model::{NodeKey, RevisionNumber, DOCUMENT_ROOT_KEY};
use revtree_core::storage::StoreHandle;
use revtree_store::seed::{import_seed_file, ImportedSeed};
use serde::Serialize;

use crate::dispatch::DiffDispatcher;

/// What to compare
#[derive(Debug, Clone)]
pub struct DiffOptions {
    pub old_revision: RevisionNumber,
    pub new_revision: RevisionNumber,
    pub start_key: NodeKey,
    pub mode: DiffMode,
    pub variant: DiffVariant,
}

impl DiffOptions {
    /// Whole-document structural diff in normal mode
    pub fn new(old_revision: RevisionNumber, new_revision: RevisionNumber) -> Self {
        Self {
            old_revision,
            new_revision,
            start_key: DOCUMENT_ROOT_KEY,
            mode: DiffMode::Normal,
            variant: DiffVariant::structural(),
        }
    }
}

/// Everything a finished diff produced
#[derive(Debug, Clone, Serialize)]
pub struct DiffReport {
    pub document: String,
    pub seed_digest: String,
    pub request_id: String,
    pub old_revision: RevisionNumber,
    pub new_revision: RevisionNumber,
    pub variant: &'static str,
    pub outcome: DiffOutcome,
    pub events: Vec<DiffEvent>,
}

/// Import `seed` and diff two of its revisions.
///
/// # Errors
///
/// Seed errors from the import, `InvalidRequest` for bad options, and any
/// session error.
pub async fn diff_seed(
    seed: PathBuf,
    options: DiffOptions,
    observers: &ObserverSet,
) -> Result<DiffReport, ExError> {
    let ImportedSeed {
        store,
        digest,
        document,
    } = load_seed(seed).await?;

    let collector = Arc::new(CollectingObserver::new());
    let mut observers = observers.clone();
    observers.add(collector.clone());

    let dispatcher = DiffDispatcher::new(StoreHandle::new(store));
    let handle = dispatcher.submit(
        dispatcher
            .request()
            .revisions(options.old_revision, options.new_revision)
            .start_key(options.start_key)
            .mode(options.mode)
            .variant(options.variant)
            .observers(&observers),
    )?;
    let request_id = handle.request_id().to_string();
    let outcome = handle.wait().await?;

    Ok(DiffReport {
        document,
        seed_digest: digest,
        request_id,
        old_revision: options.old_revision,
        new_revision: options.new_revision,
        variant: options.variant.name(),
        outcome,
        events: collector.events(),
    })
}

/// Seed import reads a file and rebuilds every revision, so it runs on the
/// blocking pool as well.
pub(crate) async fn load_seed(seed: PathBuf) -> Result<ImportedSeed, ExError> {
    tokio::task::spawn_blocking(move || import_seed_file(&seed))
        .await
        .map_err(|e| {
            ExError::new(ExErrorKind::Internal)
                .with_op("seed_import")
                .with_message(format!("seed import worker failed: {e}"))
        })?
}
