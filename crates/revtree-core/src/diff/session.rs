//! The merge loop: walks both revisions in lock-step and fires one event per
//! classified node.

use std::time::Instant;

use revtree_core_types::SessionId;
use tokio_util::sync::CancellationToken;

use super::classify::DiffClassifier;
use super::depth::{DepthTracker, Side};
use super::model::{DiffEvent, DiffOutcome, DiffVerdict, VerdictCounts};
use super::observer::ObserverSet;
use super::sync::CursorSynchronizer;
use super::variant::DiffVariant;
use crate::errors::{ExError, ExErrorKind};
use crate::storage::RevisionCursor;

/// One diff between two cursors opened at the same start key
///
/// Single use: `run` consumes the session. Both cursors are closed on every
/// exit path; observers get `on_complete` only after a full walk.
pub struct DiffSession<C: RevisionCursor> {
    new: C,
    old: C,
    classifier: DiffClassifier,
    sync: CursorSynchronizer,
    depth: DepthTracker,
    verdict: DiffVerdict,
    old_exhausted: bool,
    observers: ObserverSet,
    cancel: CancellationToken,
    counts: VerdictCounts,
    events_fired: usize,
    session_id: SessionId,
}

impl<C: RevisionCursor> DiffSession<C> {
    /// `observers` is taken as a snapshot; `optimized` must already account
    /// for the store's hashing policy.
    pub fn new(
        new: C,
        old: C,
        variant: DiffVariant,
        optimized: bool,
        observers: ObserverSet,
        cancel: CancellationToken,
    ) -> Self {
        let scope_root = new.key();
        Self {
            new,
            old,
            classifier: DiffClassifier::new(variant, optimized),
            sync: CursorSynchronizer::new(optimized, scope_root),
            depth: DepthTracker::new(),
            verdict: DiffVerdict::Same,
            old_exhausted: false,
            observers,
            cancel,
            counts: VerdictCounts::default(),
            events_fired: 0,
            session_id: SessionId::new(),
        }
    }

    /// Walk both sides to exhaustion.
    ///
    /// # Errors
    ///
    /// `Cancelled` if the token was set, `ObserverFailure` if a callback
    /// failed, or the cursor's error if closing failed. No completion is
    /// delivered in any of these cases.
    pub fn run(mut self) -> Result<DiffOutcome, ExError> {
        let started = Instant::now();
        let walked = self.walk();
        let closed = self.close_cursors();
        walked?;
        closed?;
        self.observers.done()?;

        tracing::debug!(
            session_id = self.session_id.as_str(),
            events_fired = self.events_fired,
            optimized = self.classifier.is_optimized(),
            variant = self.classifier.variant().name(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "diff session complete"
        );
        Ok(DiffOutcome {
            events_fired: self.events_fired,
            counts: self.counts,
            optimized: self.classifier.is_optimized(),
        })
    }

    fn walk(&mut self) -> Result<(), ExError> {
        if !self.new.node().is_document_root() {
            self.classify_and_fire()?;
        }

        // A Deleted verdict holds the new side still; an Inserted verdict
        // holds the old side still.
        loop {
            self.check_cancelled()?;
            if self.verdict != DiffVerdict::Deleted
                && !self
                    .sync
                    .advance(&mut self.new, Side::New, &mut self.depth, self.verdict)
            {
                break;
            }
            if self.verdict != DiffVerdict::Inserted
                && !self
                    .sync
                    .advance(&mut self.old, Side::Old, &mut self.depth, self.verdict)
            {
                self.old_exhausted = true;
            }
            self.classify_and_fire()?;
        }

        // New side exhausted: whatever is left on the old side was deleted.
        // An old cursor still on the document root either ran out or never
        // moved because the new document is empty.
        if self.old.node().is_document_root() && self.old_exhausted {
            return Ok(());
        }
        if self.verdict == DiffVerdict::Inserted {
            // compared against an inserted node but never resolved
            self.fire_old_deleted()?;
        }
        loop {
            self.check_cancelled()?;
            if !self
                .sync
                .advance(&mut self.old, Side::Old, &mut self.depth, self.verdict)
            {
                return Ok(());
            }
            self.fire_old_deleted()?;
        }
    }

    fn classify_and_fire(&mut self) -> Result<(), ExError> {
        let depth = self.depth.pair();
        match self.classifier.classify(&mut self.new, &mut self.old, depth) {
            Some(verdict) => {
                self.verdict = verdict;
                let event = DiffEvent::new(
                    verdict,
                    self.new.node().snapshot(),
                    self.old.node().snapshot(),
                    depth,
                );
                self.fire(event)
            }
            None => {
                self.verdict = DiffVerdict::Same;
                Ok(())
            }
        }
    }

    fn fire_old_deleted(&mut self) -> Result<(), ExError> {
        self.verdict = DiffVerdict::Deleted;
        let old = self.old.node();
        if !self.classifier.variant().participates(old.kind) {
            return Ok(());
        }
        let event = DiffEvent::deleted(old.snapshot(), self.depth.pair());
        self.fire(event)
    }

    fn fire(&mut self, event: DiffEvent) -> Result<(), ExError> {
        self.observers.fire_event(&event)?;
        self.counts.record(event.verdict);
        self.events_fired += 1;
        Ok(())
    }

    fn check_cancelled(&self) -> Result<(), ExError> {
        if self.cancel.is_cancelled() {
            return Err(ExError::new(ExErrorKind::Cancelled)
                .with_op("diff_session")
                .with_revision(self.new.revision())
                .with_message(format!(
                    "cancelled after {} events",
                    self.events_fired
                )));
        }
        Ok(())
    }

    fn close_cursors(&mut self) -> Result<(), ExError> {
        let new = self.new.close();
        let old = self.old.close();
        new.and(old)
    }
}
