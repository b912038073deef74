//! Navigator instance
//!
//! ```text
//!            push / replace / pop
//! caller ──────────────────────────▶ dispatch(StackAction) ──▶ RouteStack
//!   ▲                                        │
//!   └──── RouteFuture ◀── completer ◀── route removed ──▶ coordinator (ledger, history)
//! ```
//!
//! A route's completer fires exactly once, when the route leaves the stack:
//! explicit pop, pop delegated from a child, browser back, replace, removal
//! of the route hosting a nested navigator, or unmount.

use parking_lot::Mutex;
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::watch;

use navstack_history::NavigatorId;

use crate::coordinator::Coordinator;
use crate::error::NavigatorError;
use crate::route::{Presentation, RouteEntry, RouteFuture, RouteKey, RouteResult};
use crate::stack::{RouteStack, StackSnapshot};
use crate::Result;

/// Message driving a navigator's state machine
#[derive(Debug)]
pub enum StackAction<S> {
    Push(RouteEntry<S>),
    Replace(RouteEntry<S>),
    Pop(Option<RouteResult>),
}

struct NestedNavigator<S> {
    /// Route of the parent that hosts the nested navigator
    route: RouteKey,
    navigator: Weak<NavigatorInner<S>>,
}

pub(crate) struct NavigatorInner<S> {
    id: NavigatorId,
    coordinator: Coordinator<S>,
    parent: Option<Navigator<S>>,
    stack: Mutex<RouteStack<S>>,
    nested: Mutex<Vec<NestedNavigator<S>>>,
    mounted: AtomicBool,
    snapshot: watch::Sender<StackSnapshot>,
}

/// Handle to one navigator. Cloning shares the same stack.
pub struct Navigator<S> {
    inner: Arc<NavigatorInner<S>>,
}

impl<S> Navigator<S> {
    pub(crate) fn mount(coordinator: Coordinator<S>, parent: Option<Navigator<S>>, root: S) -> Self {
        let id = coordinator.allocate_id();
        let stack = RouteStack::new(root);
        let (snapshot, _) = watch::channel(stack.snapshot());

        let inner = Arc::new(NavigatorInner {
            id,
            coordinator: coordinator.clone(),
            parent,
            stack: Mutex::new(stack),
            nested: Mutex::new(Vec::new()),
            mounted: AtomicBool::new(true),
            snapshot,
        });
        coordinator.register(id, Arc::downgrade(&inner));

        tracing::info!(
            navigator = %id,
            parent = ?inner.parent.as_ref().map(|p| p.id()),
            "Mounted navigator"
        );

        Self { inner }
    }

    pub(crate) fn from_inner(inner: Arc<NavigatorInner<S>>) -> Self {
        Self { inner }
    }

    /// Mount a navigator inside the current top route of this one.
    /// Removing that route unmounts the nested navigator.
    pub fn nested(&self, root: S) -> Navigator<S> {
        let child = Self::mount(self.inner.coordinator.clone(), Some(self.clone()), root);
        let route = self.top_key();
        let mut nested = self.inner.nested.lock();
        nested.retain(|n| n.navigator.strong_count() > 0);
        nested.push(NestedNavigator {
            route,
            navigator: Arc::downgrade(&child.inner),
        });
        drop(nested);
        child
    }

    pub fn id(&self) -> NavigatorId {
        self.inner.id
    }

    pub fn parent(&self) -> Option<Navigator<S>> {
        self.inner.parent.clone()
    }

    pub fn coordinator(&self) -> &Coordinator<S> {
        &self.inner.coordinator
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.load(Ordering::SeqCst)
    }

    pub fn can_go_back(&self) -> bool {
        self.is_mounted() && self.inner.stack.lock().can_go_back()
    }

    pub fn depth(&self) -> usize {
        self.inner.stack.lock().depth()
    }

    pub fn top_key(&self) -> RouteKey {
        self.inner.stack.lock().top().key().clone()
    }

    pub fn with_top<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(self.inner.stack.lock().top().content())
    }

    /// Receive a snapshot every time the visible route changes
    pub fn watch(&self) -> watch::Receiver<StackSnapshot> {
        self.inner.snapshot.subscribe()
    }

    pub fn push<T: Any>(&self, content: S) -> RouteFuture<T> {
        self.open(content, Presentation::Card, false)
    }

    pub fn push_modal<T: Any>(&self, content: S) -> RouteFuture<T> {
        self.open(content, Presentation::Modal, false)
    }

    pub fn replace<T: Any>(&self, content: S) -> RouteFuture<T> {
        self.open(content, Presentation::Card, true)
    }

    pub fn replace_modal<T: Any>(&self, content: S) -> RouteFuture<T> {
        self.open(content, Presentation::Modal, true)
    }

    /// Pop the top route without a result
    pub fn pop(&self) -> Result<()> {
        self.dispatch(StackAction::Pop(None))
    }

    /// Pop the top route, handing `value` to whoever pushed it
    pub fn pop_with<T: Any + Send>(&self, value: T) -> Result<()> {
        self.dispatch(StackAction::Pop(Some(Box::new(value))))
    }

    fn open<T: Any>(&self, content: S, presentation: Presentation, replace: bool) -> RouteFuture<T> {
        let (entry, future) = RouteEntry::pushed(content, presentation);
        let action = if replace {
            StackAction::Replace(entry)
        } else {
            StackAction::Push(entry)
        };

        // a rejected entry is dropped, which resolves the future as abandoned
        if let Err(err) = self.dispatch(action) {
            tracing::warn!(navigator = %self.id(), error = %err, "Navigation rejected");
        }
        future
    }

    pub fn dispatch(&self, action: StackAction<S>) -> Result<()> {
        if !self.is_mounted() {
            return Err(NavigatorError::Unmounted(self.id()));
        }

        match action {
            StackAction::Push(entry) => {
                let depth = self.inner.update_stack(|stack| {
                    stack.push(entry);
                    stack.depth()
                });
                tracing::debug!(navigator = %self.id(), depth, "Pushed route");
                self.inner.coordinator.record_push(self.id());
                Ok(())
            }
            StackAction::Replace(entry) => {
                let outgoing = self.inner.update_stack(|stack| stack.replace_top(entry));
                tracing::debug!(navigator = %self.id(), replaced = %outgoing.key(), "Replaced route");
                self.inner.coordinator.record_replace(self.id());
                self.inner.release(outgoing, None);
                Ok(())
            }
            StackAction::Pop(result) => self.pop_top(result),
        }
    }

    fn pop_top(&self, result: Option<RouteResult>) -> Result<()> {
        let removed = self.inner.update_stack(|stack| stack.pop());

        match removed {
            Some(entry) => {
                tracing::debug!(navigator = %self.id(), route = %entry.key(), "Popped route");
                self.inner.release(entry, result);
                self.inner.coordinator.record_pop(self.id());
                Ok(())
            }
            None => match &self.inner.parent {
                Some(parent) => {
                    tracing::debug!(
                        navigator = %self.id(),
                        parent = %parent.id(),
                        "At root, delegating pop to parent"
                    );
                    parent.dispatch(StackAction::Pop(result))
                }
                None => {
                    tracing::error!(navigator = %self.id(), "pop called at root with no parent navigator");
                    Err(NavigatorError::NothingToPop {
                        navigator: self.id(),
                    })
                }
            },
        }
    }

    /// Pop driven by a browser back event. The history slot is already gone,
    /// so the ledger and history are left alone.
    pub(crate) fn pop_from_history(&self) -> bool {
        if !self.is_mounted() {
            return false;
        }

        match self.inner.update_stack(|stack| stack.pop()) {
            Some(entry) => {
                tracing::debug!(navigator = %self.id(), route = %entry.key(), "Popped route from history");
                self.inner.release(entry, None);
                true
            }
            None => false,
        }
    }

    /// Unwind every pushed route (completing each with no result), unmount
    /// nested navigators and leave the registry. Idempotent.
    pub fn unmount(&self) {
        self.inner.teardown();
    }
}

impl<S> NavigatorInner<S> {
    /// Mutate the stack and publish the new snapshot
    fn update_stack<R>(&self, f: impl FnOnce(&mut RouteStack<S>) -> R) -> R {
        let (result, snapshot) = {
            let mut stack = self.stack.lock();
            let result = f(&mut stack);
            (result, stack.snapshot())
        };
        self.snapshot.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            *current = snapshot;
            true
        });
        result
    }

    /// A route left the stack: unmount what it hosts, then complete it
    fn release(&self, entry: RouteEntry<S>, result: Option<RouteResult>) {
        self.unmount_nested(entry.key());
        entry.dismiss(result);
    }

    fn unmount_nested(&self, route: &RouteKey) {
        let hosted: Vec<Weak<NavigatorInner<S>>> = {
            let mut nested = self.nested.lock();
            let (hosted, kept): (Vec<_>, Vec<_>) =
                nested.drain(..).partition(|n| &n.route == route);
            *nested = kept;
            hosted.into_iter().map(|n| n.navigator).collect()
        };

        // newest first
        for navigator in hosted.into_iter().rev() {
            if let Some(navigator) = navigator.upgrade() {
                navigator.teardown();
            }
        }
    }

    fn teardown(&self) {
        if !self.mounted.swap(false, Ordering::SeqCst) {
            return;
        }

        let (pushed, root_key, root_completer) = {
            let mut stack = self.stack.lock();
            (
                stack.drain_pushed(),
                stack.root_key().clone(),
                stack.take_root_completer(),
            )
        };

        let unwound = pushed.len();
        for entry in pushed {
            self.release(entry, None);
            self.coordinator.record_pop(self.id);
        }

        self.unmount_nested(&root_key);
        if let Some(completer) = root_completer {
            completer.complete(None);
        }

        let snapshot = self.stack.lock().snapshot();
        self.snapshot.send_replace(snapshot);
        self.coordinator.deregister(self.id);

        tracing::info!(navigator = %self.id, unwound, "Unmounted navigator");
    }
}

impl<S> Drop for NavigatorInner<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<S> Clone for Navigator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> std::fmt::Debug for Navigator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("id", &self.inner.id)
            .field("depth", &self.depth())
            .field("mounted", &self.is_mounted())
            .finish()
    }
}
