//! Listeners for diff events.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::model::DiffEvent;
use crate::errors::{ExError, ExErrorKind};

/// Receives every event of a session, then one completion signal
///
/// Callbacks run inline on the session's thread. Returning an error stops
/// the session; no further events and no completion are delivered.
pub trait DiffObserver: Send + Sync {
    /// # Errors
    ///
    /// Any error stops the session with `ObserverFailure`.
    fn on_diff(&self, event: &DiffEvent) -> Result<(), ExError>;

    /// # Errors
    ///
    /// Any error is surfaced as `ObserverFailure` after cursors are closed.
    fn on_complete(&self) -> Result<(), ExError>;
}

/// Ordered set of observers
///
/// Cloning is cheap and yields an independent snapshot, so a running
/// session never sees later `add`/`remove` calls.
#[derive(Clone, Default)]
pub struct ObserverSet {
    observers: Vec<Arc<dyn DiffObserver>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, observer: Arc<dyn DiffObserver>) {
        self.observers.push(observer);
    }

    /// Remove an observer by identity; returns whether it was present
    pub fn remove(&mut self, observer: &Arc<dyn DiffObserver>) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| !Arc::ptr_eq(o, observer));
        self.observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Deliver one event to every observer in registration order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing observer and returns `ObserverFailure`.
    pub fn fire_event(&self, event: &DiffEvent) -> Result<(), ExError> {
        for observer in &self.observers {
            observer
                .on_diff(event)
                .map_err(|e| observer_failure("on_diff", e))?;
        }
        Ok(())
    }

    /// Signal completion to every observer.
    ///
    /// # Errors
    ///
    /// Stops at the first failing observer and returns `ObserverFailure`.
    pub fn done(&self) -> Result<(), ExError> {
        for observer in &self.observers {
            observer
                .on_complete()
                .map_err(|e| observer_failure("on_complete", e))?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for ObserverSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverSet")
            .field("len", &self.observers.len())
            .finish()
    }
}

fn observer_failure(op: &str, source: ExError) -> ExError {
    ExError::new(ExErrorKind::ObserverFailure)
        .with_op(op)
        .with_message(source.message().to_string())
        .with_source(source)
}

/// Records events and completion in memory
#[derive(Debug, Default)]
pub struct CollectingObserver {
    events: Mutex<Vec<DiffEvent>>,
    completed: AtomicBool,
}

impl CollectingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DiffEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn is_complete(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }
}

impl DiffObserver for CollectingObserver {
    fn on_diff(&self, event: &DiffEvent) -> Result<(), ExError> {
        self.events
            .lock()
            .map_err(|_| {
                ExError::new(ExErrorKind::Concurrency).with_message("event buffer lock poisoned")
            })?
            .push(event.clone());
        Ok(())
    }

    fn on_complete(&self) -> Result<(), ExError> {
        self.completed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Emits one debug-level `tracing` event per diff event, tagged with a
/// caller-chosen `source` so interleaved runs can be told apart
#[derive(Debug, Clone)]
pub struct TracingObserver {
    source: String,
}

impl TracingObserver {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl DiffObserver for TracingObserver {
    fn on_diff(&self, event: &DiffEvent) -> Result<(), ExError> {
        tracing::debug!(
            source = self.source.as_str(),
            verdict = %event.verdict,
            new_key = ?event.new_node.as_ref().map(|n| n.key),
            old_key = ?event.old_node.as_ref().map(|n| n.key),
            new_depth = event.depth.new_depth,
            old_depth = event.depth.old_depth,
            "diff event"
        );
        Ok(())
    }

    fn on_complete(&self) -> Result<(), ExError> {
        tracing::debug!(source = self.source.as_str(), "diff complete");
        Ok(())
    }
}
