//! Asynchronous diff dispatch
//!
//! A session is CPU bound and walks its cursors synchronously, so each
//! submitted request runs on tokio's blocking pool. The caller gets a
//! [`DiffHandle`] to await or cancel it.

use revtree_core::diff::{
    run_diff, CancellationToken, DiffOutcome, DiffRequest, DiffRequestBuilder,
};
use revtree_core::errors::{ExError, ExErrorKind};
use revtree_core::storage::{RevisionStore, StoreHandle};
use revtree_core_types::RequestId;
use tokio::task::JoinHandle;

/// Submits validated diff requests against one store
///
/// Every session runs under a child of the dispatcher's shutdown token, so
/// cancelling that token stops all of them.
pub struct DiffDispatcher<S> {
    store: StoreHandle<S>,
    shutdown: CancellationToken,
}

impl<S> Clone for DiffDispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            shutdown: self.shutdown.clone(),
        }
    }
}

impl<S: RevisionStore + 'static> DiffDispatcher<S> {
    pub fn new(store: StoreHandle<S>) -> Self {
        Self::with_shutdown(store, CancellationToken::new())
    }

    /// Tie every submitted session to an owner's shutdown token
    pub fn with_shutdown(store: StoreHandle<S>, shutdown: CancellationToken) -> Self {
        Self { store, shutdown }
    }

    /// Cancel every session submitted through this dispatcher or its clones
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn store(&self) -> &StoreHandle<S> {
        &self.store
    }

    /// A request builder already bound to this dispatcher's store
    pub fn request(&self) -> DiffRequestBuilder<S> {
        DiffRequest::builder().store(self.store.clone())
    }

    /// Validate the request and start its session on the blocking pool.
    ///
    /// Validation happens on the caller's task, so an invalid request never
    /// reaches a worker and never opens a cursor.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` from validation, or `Internal` when called outside a
    /// tokio runtime.
    pub fn submit(&self, request: DiffRequestBuilder<S>) -> Result<DiffHandle, ExError> {
        let request = request.build()?;
        let request_id = request.request_id().clone();

        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            ExError::new(ExErrorKind::Internal)
                .with_op("submit_diff")
                .with_request_id(request_id.clone())
                .with_message(format!("no tokio runtime: {e}"))
        })?;

        let cancel = self.shutdown.child_token();
        let session_cancel = cancel.clone();
        let task = runtime.spawn_blocking(move || run_diff(request, session_cancel));

        tracing::debug!(request_id = request_id.as_str(), "diff submitted");
        Ok(DiffHandle {
            request_id,
            cancel,
            task,
        })
    }
}

/// A running diff session
pub struct DiffHandle {
    request_id: RequestId,
    cancel: CancellationToken,
    task: JoinHandle<Result<DiffOutcome, ExError>>,
}

impl DiffHandle {
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Ask this session to stop before its next node comparison
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token shared with the running session
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the session to finish.
    ///
    /// # Errors
    ///
    /// Whatever the session returned, or `Internal` if its worker panicked.
    pub async fn wait(self) -> Result<DiffOutcome, ExError> {
        match self.task.await {
            Ok(result) => result,
            Err(join_err) => Err(ExError::new(ExErrorKind::Internal)
                .with_op("run_diff")
                .with_request_id(self.request_id)
                .with_message(format!("diff worker failed: {join_err}"))),
        }
    }
}

impl std::fmt::Debug for DiffHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffHandle")
            .field("request_id", &self.request_id.as_str())
            .field("cancelled", &self.cancel.is_cancelled())
            .field("finished", &self.task.is_finished())
            .finish()
    }
}
