//! Validated diff requests and the synchronous entry point.

use std::time::Instant;

use revtree_core_types::RequestId;
use tokio_util::sync::CancellationToken;

use super::model::{DiffMode, DiffOutcome};
use super::observer::ObserverSet;
use super::session::DiffSession;
use super::variant::DiffVariant;
use crate::errors::{ExError, RevTreeError};
use crate::model::{NodeKey, RevisionNumber, DOCUMENT_ROOT_KEY};
use crate::storage::{RevisionStore, StoreHandle};
use crate::{log_op_end, log_op_error, log_op_start};

/// A request that passed validation
pub struct DiffRequest<S> {
    store: StoreHandle<S>,
    start_key: NodeKey,
    new_revision: RevisionNumber,
    old_revision: RevisionNumber,
    mode: DiffMode,
    variant: DiffVariant,
    observers: ObserverSet,
    request_id: RequestId,
}

impl<S: RevisionStore> DiffRequest<S> {
    pub fn builder() -> DiffRequestBuilder<S> {
        DiffRequestBuilder::default()
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn start_key(&self) -> NodeKey {
        self.start_key
    }

    pub fn new_revision(&self) -> RevisionNumber {
        self.new_revision
    }

    pub fn old_revision(&self) -> RevisionNumber {
        self.old_revision
    }

    pub fn mode(&self) -> DiffMode {
        self.mode
    }

    pub fn variant(&self) -> &DiffVariant {
        &self.variant
    }
}

impl<S> std::fmt::Debug for DiffRequest<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffRequest")
            .field("request_id", &self.request_id.as_str())
            .field("start_key", &self.start_key)
            .field("new_revision", &self.new_revision)
            .field("old_revision", &self.old_revision)
            .field("mode", &self.mode)
            .field("variant", &self.variant.name())
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Collects request fields; `build` validates them
pub struct DiffRequestBuilder<S> {
    store: Option<StoreHandle<S>>,
    start_key: NodeKey,
    new_revision: Option<RevisionNumber>,
    old_revision: Option<RevisionNumber>,
    mode: Option<DiffMode>,
    variant: Option<DiffVariant>,
    observers: ObserverSet,
    request_id: Option<RequestId>,
}

impl<S> Default for DiffRequestBuilder<S> {
    fn default() -> Self {
        Self {
            store: None,
            start_key: DOCUMENT_ROOT_KEY,
            new_revision: None,
            old_revision: None,
            mode: None,
            variant: None,
            observers: ObserverSet::new(),
            request_id: None,
        }
    }
}

impl<S: RevisionStore> DiffRequestBuilder<S> {
    pub fn store(mut self, store: StoreHandle<S>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn start_key(mut self, key: NodeKey) -> Self {
        self.start_key = key;
        self
    }

    pub fn revisions(mut self, old: RevisionNumber, new: RevisionNumber) -> Self {
        self.old_revision = Some(old);
        self.new_revision = Some(new);
        self
    }

    pub fn new_revision(mut self, revision: RevisionNumber) -> Self {
        self.new_revision = Some(revision);
        self
    }

    pub fn old_revision(mut self, revision: RevisionNumber) -> Self {
        self.old_revision = Some(revision);
        self
    }

    pub fn mode(mut self, mode: DiffMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn variant(mut self, variant: DiffVariant) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Snapshot of the caller's observer set
    pub fn observers(mut self, observers: &ObserverSet) -> Self {
        self.observers = observers.clone();
        self
    }

    pub fn request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Validate and freeze the request.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` when the store, either revision, the mode or the
    /// variant is missing, or when `new_revision <= old_revision`.
    pub fn build(self) -> Result<DiffRequest<S>, ExError> {
        let request_id = self.request_id.unwrap_or_default();
        let invalid = |reason: &str| {
            ExError::from(RevTreeError::InvalidRequest {
                reason: reason.to_string(),
            })
            .with_op("build_diff_request")
            .with_request_id(request_id.clone())
        };

        let store = self.store.ok_or_else(|| invalid("store handle is required"))?;
        let new_revision = self
            .new_revision
            .ok_or_else(|| invalid("new revision is required"))?;
        let old_revision = self
            .old_revision
            .ok_or_else(|| invalid("old revision is required"))?;
        if new_revision <= old_revision {
            return Err(invalid(&format!(
                "new revision {new_revision} must be greater than old revision {old_revision}"
            )));
        }
        let mode = self.mode.ok_or_else(|| invalid("diff mode is required"))?;
        let variant = self
            .variant
            .ok_or_else(|| invalid("diff variant is required"))?;

        Ok(DiffRequest {
            store,
            start_key: self.start_key,
            new_revision,
            old_revision,
            mode,
            variant,
            observers: self.observers,
            request_id,
        })
    }
}

/// Open both cursors and run one session to completion on this thread.
///
/// # Errors
///
/// `CursorAcquisition` before any event if either cursor cannot be opened,
/// otherwise whatever [`DiffSession::run`] returns. Errors carry the
/// request id.
pub fn run_diff<S: RevisionStore>(
    request: DiffRequest<S>,
    cancel: CancellationToken,
) -> Result<DiffOutcome, ExError> {
    let started = Instant::now();
    let request_id = request.request_id.clone();
    log_op_start!(
        "run_diff",
        request_id = request_id.as_str(),
        new_revision = request.new_revision,
        old_revision = request.old_revision,
        start_key = request.start_key,
        mode = %request.mode,
        variant = request.variant.name(),
    );

    let result = execute(request, cancel);
    let duration_ms = started.elapsed().as_millis() as u64;
    match result {
        Ok(outcome) => {
            log_op_end!(
                "run_diff",
                duration_ms = duration_ms,
                request_id = request_id.as_str(),
                events_fired = outcome.events_fired,
                optimized = outcome.optimized,
            );
            Ok(outcome)
        }
        Err(err) => {
            let err = err.with_request_id(request_id.clone());
            log_op_error!(
                "run_diff",
                err.clone(),
                duration_ms = duration_ms,
                request_id = request_id.as_str(),
            );
            Err(err)
        }
    }
}

fn execute<S: RevisionStore>(
    request: DiffRequest<S>,
    cancel: CancellationToken,
) -> Result<DiffOutcome, ExError> {
    let pair = request.store.open_pair(
        request.new_revision,
        request.old_revision,
        request.start_key,
    )?;
    // Hashing is read once, at acquisition.
    let optimized = request.mode == DiffMode::Optimized && pair.hashing.is_enabled();
    DiffSession::new(
        pair.new,
        pair.old,
        request.variant,
        optimized,
        request.observers,
        cancel,
    )
    .run()
}
