use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};

use revtree_core::diff::{
    CollectingObserver, DiffEvent, DiffMode, DiffObserver, DiffOutcome, DiffVariant, DiffVerdict,
    ObserverSet,
};
use revtree_core::errors::{ExError, ExErrorKind};
use revtree_core::model::{NodeKey, RevisionNumber};
use revtree_core::storage::StoreHandle;
use revtree_engine::DiffDispatcher;
use revtree_store::seed::{import_seed, parse_seed_str};
use revtree_store::MemoryStore;

/// (verdict, new key, old key) per event
pub type Summary = Vec<(DiffVerdict, Option<NodeKey>, Option<NodeKey>)>;

#[allow(dead_code)]
pub fn store_from_seed(yaml: &str) -> MemoryStore {
    import_seed(&parse_seed_str(yaml).unwrap()).unwrap()
}

#[allow(dead_code)]
pub fn seed_file(yaml: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

#[allow(dead_code)]
pub fn dispatcher(store: MemoryStore) -> DiffDispatcher<MemoryStore> {
    DiffDispatcher::new(StoreHandle::new(store))
}

pub fn summarize(events: &[DiffEvent]) -> Summary {
    events
        .iter()
        .map(|e| {
            (
                e.verdict,
                e.new_node.as_ref().map(|n| n.key),
                e.old_node.as_ref().map(|n| n.key),
            )
        })
        .collect()
}

/// Submit one diff with a collecting observer and wait for it
#[allow(dead_code)]
pub async fn run(
    dispatcher: &DiffDispatcher<MemoryStore>,
    old: RevisionNumber,
    new: RevisionNumber,
    mode: DiffMode,
    variant: DiffVariant,
) -> (Summary, Arc<CollectingObserver>, Result<DiffOutcome, ExError>) {
    let collector = Arc::new(CollectingObserver::new());
    let mut observers = ObserverSet::new();
    observers.add(collector.clone());
    let handle = dispatcher
        .submit(
            dispatcher
                .request()
                .revisions(old, new)
                .mode(mode)
                .variant(variant)
                .observers(&observers),
        )
        .unwrap();
    let result = handle.wait().await;
    (summarize(&collector.events()), collector, result)
}

/// Fails on the first event
#[allow(dead_code)]
pub struct FailingObserver;

impl DiffObserver for FailingObserver {
    fn on_diff(&self, _event: &DiffEvent) -> Result<(), ExError> {
        Err(ExError::new(ExErrorKind::Io).with_message("sink closed"))
    }

    fn on_complete(&self) -> Result<(), ExError> {
        Ok(())
    }
}

/// Signals `entered` from inside the first event, then blocks there until
/// the test opens the gate
#[allow(dead_code)]
pub struct GateObserver {
    entered: Mutex<Sender<()>>,
    gate: Mutex<Receiver<()>>,
    seen: AtomicUsize,
}

#[allow(dead_code)]
impl GateObserver {
    pub fn new(entered: Sender<()>, gate: Receiver<()>) -> Self {
        Self {
            entered: Mutex::new(entered),
            gate: Mutex::new(gate),
            seen: AtomicUsize::new(0),
        }
    }

    pub fn seen(&self) -> usize {
        self.seen.load(Ordering::SeqCst)
    }
}

impl DiffObserver for GateObserver {
    fn on_diff(&self, _event: &DiffEvent) -> Result<(), ExError> {
        if self.seen.fetch_add(1, Ordering::SeqCst) == 0 {
            let _ = self.entered.lock().unwrap().send(());
            let _ = self.gate.lock().unwrap().recv();
        }
        Ok(())
    }

    fn on_complete(&self) -> Result<(), ExError> {
        Ok(())
    }
}

/// Structural keys of a revision in document order, document root excluded
#[allow(dead_code)]
pub fn preorder_keys(store: &MemoryStore, revision: RevisionNumber) -> Vec<NodeKey> {
    use revtree_core::model::DOCUMENT_ROOT_KEY;
    use revtree_core::storage::{RevisionCursor, RevisionStore};

    let mut cursor = store.open_cursor(revision, DOCUMENT_ROOT_KEY).unwrap();
    let mut keys = Vec::new();
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
        keys.push(cursor.key());
    }
    keys
}
