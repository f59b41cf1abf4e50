use std::sync::{Arc, Mutex};

use super::{HashingPolicy, RevisionCursor, RevisionStore};
use crate::errors::{ExError, ExErrorKind};
use crate::model::{NodeKey, RevisionNumber};

/// Shared handle to a store
///
/// Cursor acquisition goes through one mutex per handle so that the pair of
/// read views for a session is opened without interleaving another session's
/// acquisition. Navigation afterwards is lock free.
pub struct StoreHandle<S> {
    store: Arc<S>,
    acquisition: Arc<Mutex<()>>,
}

impl<S> Clone for StoreHandle<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            acquisition: Arc::clone(&self.acquisition),
        }
    }
}

/// Both cursors of a session plus the hashing policy read at acquisition
pub struct CursorPair<C> {
    pub new: C,
    pub old: C,
    pub hashing: HashingPolicy,
}

impl<S: RevisionStore> StoreHandle<S> {
    pub fn new(store: S) -> Self {
        Self::from_arc(Arc::new(store))
    }

    pub fn from_arc(store: Arc<S>) -> Self {
        Self {
            store,
            acquisition: Arc::new(Mutex::new(())),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Open the new and old cursors at `start_key`.
    ///
    /// # Errors
    ///
    /// `CursorAcquisition` wrapping the store error when either side cannot
    /// be opened; the cursor already opened is closed first.
    /// `Concurrency` if the acquisition lock is poisoned.
    pub fn open_pair(
        &self,
        new_revision: RevisionNumber,
        old_revision: RevisionNumber,
        start_key: NodeKey,
    ) -> Result<CursorPair<S::Cursor>, ExError> {
        let _guard = self.acquisition.lock().map_err(|_| {
            ExError::new(ExErrorKind::Concurrency)
                .with_op("open_pair")
                .with_message("cursor acquisition lock poisoned")
        })?;

        let hashing = self.store.hashing_policy();
        let mut new = self
            .store
            .open_cursor(new_revision, start_key)
            .map_err(|e| acquisition_error(new_revision, start_key, e.into()))?;

        match self.store.open_cursor(old_revision, start_key) {
            Ok(old) => Ok(CursorPair { new, old, hashing }),
            Err(e) => {
                if let Err(close_err) = new.close() {
                    tracing::warn!(
                        revision = new_revision,
                        err.code = close_err.code(),
                        "failed to close cursor after partial acquisition"
                    );
                }
                Err(acquisition_error(old_revision, start_key, e.into()))
            }
        }
    }
}

fn acquisition_error(revision: RevisionNumber, key: NodeKey, source: ExError) -> ExError {
    ExError::new(ExErrorKind::CursorAcquisition)
        .with_op("open_cursor")
        .with_revision(revision)
        .with_node_key(key)
        .with_message(source.message().to_string())
        .with_source(source)
}
