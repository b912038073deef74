//! Navigation coordinator
//!
//! One per application. Hands out navigator identities, keeps the registry
//! of live navigators and, on the web platform, owns the activity ledger and
//! forwards every history mutation through the task queue.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use navstack_history::{ActivityLedger, HistoryApi, HistoryMutation, HistoryState, NavigatorId};
use navstack_queue::TaskQueue;

use crate::bridge::HistoryBridge;
use crate::navigator::{Navigator, NavigatorInner};

pub(crate) struct WebHistory {
    api: Arc<dyn HistoryApi>,
    queue: TaskQueue,
}

pub(crate) struct CoordinatorInner<S> {
    next_id: AtomicU64,
    registry: RwLock<HashMap<NavigatorId, Weak<NavigatorInner<S>>>>,
    /// Shared with queued history actions
    ledger: Arc<Mutex<ActivityLedger>>,
    web: Option<WebHistory>,
}

pub struct Coordinator<S> {
    inner: Arc<CoordinatorInner<S>>,
}

impl<S> Coordinator<S> {
    /// Coordinator without browser history
    pub fn native() -> Self {
        Self::build(None)
    }

    /// Coordinator that mirrors every stack change into `history`
    pub fn web(history: Arc<dyn HistoryApi>, queue: TaskQueue) -> Self {
        Self::build(Some(WebHistory {
            api: history,
            queue,
        }))
    }

    fn build(web: Option<WebHistory>) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                next_id: AtomicU64::new(0),
                registry: RwLock::new(HashMap::new()),
                ledger: Arc::new(Mutex::new(ActivityLedger::new())),
                web,
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<CoordinatorInner<S>>) -> Self {
        Self { inner }
    }

    pub fn is_web(&self) -> bool {
        self.inner.web.is_some()
    }

    /// Mount a top-level navigator showing `root`
    pub fn navigator(&self, root: S) -> Navigator<S> {
        Navigator::mount(self.clone(), None, root)
    }

    /// Bridge for browser back/forward events; `None` without history
    pub fn bridge(&self) -> Option<HistoryBridge<S>> {
        self.is_web()
            .then(|| HistoryBridge::new(Arc::downgrade(&self.inner)))
    }

    /// Look up a live navigator
    pub fn find(&self, id: NavigatorId) -> Option<Navigator<S>> {
        self.inner
            .registry
            .read()
            .get(&id)
            .and_then(Weak::upgrade)
            .map(Navigator::from_inner)
    }

    /// Number of registered navigators
    pub fn navigator_count(&self) -> usize {
        self.inner.registry.read().len()
    }

    /// Copy of the activity ledger
    pub fn ledger(&self) -> ActivityLedger {
        self.inner.ledger.lock().clone()
    }

    pub fn ledger_len(&self) -> usize {
        self.inner.ledger.lock().len()
    }

    pub fn page_index(&self) -> i64 {
        self.inner.ledger.lock().page_index()
    }

    pub(crate) fn allocate_id(&self) -> NavigatorId {
        NavigatorId::new(self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub(crate) fn register(&self, id: NavigatorId, navigator: Weak<NavigatorInner<S>>) {
        self.inner.registry.write().insert(id, navigator);
    }

    pub(crate) fn deregister(&self, id: NavigatorId) {
        self.inner.registry.write().remove(&id);
    }

    pub(crate) fn with_ledger<R>(&self, f: impl FnOnce(&mut ActivityLedger) -> R) -> R {
        f(&mut self.inner.ledger.lock())
    }

    /// A navigator pushed a route: new history slot owned by it
    pub(crate) fn record_push(&self, navigator: NavigatorId) {
        self.serialize(move |ledger| match ledger.record_push(navigator) {
            Some(index) => Some(HistoryMutation::Push(HistoryState::new(index, navigator))),
            None => {
                tracing::debug!(navigator = %navigator, "Pushed route already removed, skipping slot");
                None
            }
        });
    }

    /// A navigator replaced its top route: rewrite the current slot
    pub(crate) fn record_replace(&self, navigator: NavigatorId) {
        self.serialize(move |ledger| {
            let index = ledger.page_index();
            Some(HistoryMutation::Replace(HistoryState::new(index, navigator)))
        });
    }

    /// A navigator removed a route on its own: give its slot back to the
    /// browser with a compensating `back()`
    pub(crate) fn record_pop(&self, navigator: NavigatorId) {
        self.serialize(move |ledger| {
            if ledger.retire(navigator) {
                Some(HistoryMutation::Back)
            } else {
                tracing::debug!(navigator = %navigator, "Removed route has no history slot yet");
                None
            }
        });
    }

    /// Undo a forward navigation the stacks cannot replay
    pub(crate) fn neutralize_forward(&self) {
        self.serialize(|ledger| {
            ledger.record_ignore();
            Some(HistoryMutation::Back)
        });
    }

    /// Run `step` on the task queue so the ledger changes together with the
    /// history mutation it describes, in the order the browser sees them
    fn serialize<F>(&self, step: F)
    where
        F: FnOnce(&mut ActivityLedger) -> Option<HistoryMutation> + Send + 'static,
    {
        let Some(web) = &self.inner.web else {
            return;
        };

        let ledger = Arc::clone(&self.inner.ledger);
        let api = Arc::clone(&web.api);
        web.queue.execute(move || {
            // the ledger lock is released before the history can call back
            let mutation = step(&mut ledger.lock());
            if let Some(mutation) = mutation {
                mutation.apply(api.as_ref());
            }
        });
    }
}

impl<S> Clone for Coordinator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> std::fmt::Debug for Coordinator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("web", &self.is_web())
            .field("navigators", &self.navigator_count())
            .field("ledger", &self.ledger_len())
            .finish()
    }
}
