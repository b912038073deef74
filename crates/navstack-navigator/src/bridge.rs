//! History bridge
//!
//! Routes browser back/forward events to the navigator that owns the
//! history slot being left, using the tail of the activity ledger:
//!
//! ```text
//! event.index > page index ─▶ forward ─▶ queue (ledger += ignore, back())
//! ledger tail = ignore     ─▶ swallowed (compensating navigation)
//! ledger tail = nav-N      ─▶ nav-N pops its top route with no result
//! ledger empty             ─▶ untracked, nothing to do
//! ```

use std::sync::Weak;

use navstack_history::{LedgerEntry, MemoryHistory, NavigatorId, PopStateEvent};

use crate::coordinator::{Coordinator, CoordinatorInner};

/// What the bridge did with one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeOutcome {
    /// The coordinator is gone
    Detached,
    /// No navigator owns any history slot
    Untracked,
    /// Forward navigation undone with a compensating back
    ForwardNeutralized,
    /// Event produced by a compensating back
    Swallowed,
    /// The navigator popped its top route
    Popped(NavigatorId),
    /// The owning navigator is gone or already at its root
    Stale(NavigatorId),
}

pub struct HistoryBridge<S> {
    coordinator: Weak<CoordinatorInner<S>>,
}

impl<S> HistoryBridge<S> {
    pub(crate) fn new(coordinator: Weak<CoordinatorInner<S>>) -> Self {
        Self { coordinator }
    }

    pub fn handle_pop_state(&self, event: PopStateEvent) -> BridgeOutcome {
        let Some(coordinator) = self.coordinator.upgrade().map(Coordinator::from_inner) else {
            return BridgeOutcome::Detached;
        };

        let routed = coordinator.with_ledger(|ledger| {
            let forward = event.index > ledger.page_index();
            ledger.set_page_index(event.index);

            let tail = ledger.tail()?;
            if !forward {
                ledger.consume();
            }
            Some((forward, tail))
        });

        let Some((forward, tail)) = routed else {
            tracing::debug!(index = event.index, "History event outside any navigator");
            return BridgeOutcome::Untracked;
        };

        if forward {
            tracing::debug!(index = event.index, "Neutralizing forward navigation");
            coordinator.neutralize_forward();
            return BridgeOutcome::ForwardNeutralized;
        }

        let id = match tail {
            LedgerEntry::Ignore => return BridgeOutcome::Swallowed,
            LedgerEntry::Navigator(id) => id,
        };

        let popped = coordinator
            .find(id)
            .is_some_and(|navigator| navigator.pop_from_history());

        if popped {
            tracing::debug!(navigator = %id, index = event.index, "Back navigation popped route");
            BridgeOutcome::Popped(id)
        } else {
            tracing::warn!(
                navigator = %id,
                index = event.index,
                "Back navigation for a navigator with nothing to pop"
            );
            BridgeOutcome::Stale(id)
        }
    }

    /// Feed every popstate from `history` into this bridge
    pub fn listen(&self, history: &MemoryHistory)
    where
        S: Send + 'static,
    {
        let bridge = self.clone();
        history.set_listener(move |event| {
            bridge.handle_pop_state(event);
        });
    }
}

impl<S> Clone for HistoryBridge<S> {
    fn clone(&self) -> Self {
        Self {
            coordinator: Weak::clone(&self.coordinator),
        }
    }
}

impl<S> std::fmt::Debug for HistoryBridge<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryBridge")
            .field("attached", &(self.coordinator.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator::Navigator;
    use navstack_queue::{DrainOrder, TaskQueue};
    use std::sync::Arc;
    use std::time::Duration;

    const DELAY: Duration = Duration::from_millis(100);

    struct Fixture {
        history: Arc<MemoryHistory>,
        coordinator: Coordinator<&'static str>,
        nav: Navigator<&'static str>,
    }

    fn web() -> Fixture {
        web_with(DrainOrder::Fifo)
    }

    fn web_with(order: DrainOrder) -> Fixture {
        let history = Arc::new(MemoryHistory::new());
        let queue = TaskQueue::new(DELAY, order).unwrap();
        let coordinator = Coordinator::web(history.clone(), queue);
        coordinator.bridge().unwrap().listen(&history);
        let nav = coordinator.navigator("home");
        Fixture {
            history,
            coordinator,
            nav,
        }
    }

    async fn settle(actions: u32) {
        tokio::time::sleep(DELAY * actions + DELAY / 2).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_browser_back_pops_with_no_result() {
        let fx = web();
        let mut details = fx.nav.push::<u32>("details");
        settle(1).await;
        assert_eq!(fx.history.cursor(), 1);

        assert!(fx.history.go_back());

        assert_eq!(details.try_result().unwrap().unwrap(), None);
        assert_eq!(fx.nav.depth(), 1);
        assert_eq!(fx.coordinator.ledger_len(), 0);
        assert_eq!(fx.coordinator.page_index(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_pop_rewinds_history() {
        let fx = web();
        let a = fx.nav.push::<u32>("a");
        let _b = fx.nav.push::<u32>("b");
        settle(2).await;
        assert_eq!(fx.history.cursor(), 2);

        fx.nav.pop().unwrap();
        fx.nav.pop_with(42u32).unwrap();
        assert_eq!(fx.coordinator.ledger_len(), 2);
        assert_eq!(fx.history.cursor(), 2);

        settle(2).await;
        assert_eq!(a.await.unwrap(), Some(42));
        assert_eq!(fx.history.cursor(), 0);
        assert_eq!(fx.coordinator.ledger_len(), 0);
        assert_eq!(fx.nav.depth(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lifo_pop_before_push_leaves_no_slot() {
        let fx = web_with(DrainOrder::Lifo);
        let _a = fx.nav.push::<()>("a");
        let _b = fx.nav.push::<()>("b");
        let _c = fx.nav.push::<()>("c");
        fx.nav.pop().unwrap();
        fx.nav.pop().unwrap();

        // push a, pop c, pop b (before its push), skipped push c, push b
        settle(5).await;
        assert_eq!(fx.nav.depth(), 2);
        assert_eq!(fx.nav.with_top(|top| *top), "a");
        assert_eq!(fx.coordinator.ledger_len(), 1);
        assert_eq!(fx.coordinator.ledger().pending_retires(fx.nav.id()), 0);
        assert_eq!(fx.history.cursor(), 1);

        assert!(fx.history.go_back());
        assert_eq!(fx.nav.depth(), 1);
        assert_eq!(fx.coordinator.ledger_len(), 0);
        assert!(!fx.history.go_back());
    }

    #[tokio::test(start_paused = true)]
    async fn test_forward_is_neutralized() {
        let fx = web();
        let _a = fx.nav.push::<()>("a");
        let _b = fx.nav.push::<()>("b");
        settle(2).await;

        assert!(fx.history.go_back());
        assert_eq!(fx.nav.depth(), 2);
        assert_eq!(fx.coordinator.ledger_len(), 1);

        assert!(fx.history.go_forward());
        assert_eq!(fx.coordinator.ledger_len(), 1);
        assert_eq!(fx.history.cursor(), 2);

        settle(1).await;
        assert_eq!(fx.history.cursor(), 1);
        assert_eq!(fx.nav.depth(), 2);
        assert_eq!(
            fx.coordinator.ledger().entries(),
            &[LedgerEntry::Navigator(fx.nav.id())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_untracked_event_is_ignored() {
        let fx = web();
        let bridge = fx.coordinator.bridge().unwrap();

        let outcome = bridge.handle_pop_state(PopStateEvent::default());
        assert_eq!(outcome, BridgeOutcome::Untracked);
        assert_eq!(fx.nav.depth(), 1);

        let forward = PopStateEvent {
            index: 3,
            active_navigator: None,
        };
        assert_eq!(bridge.handle_pop_state(forward), BridgeOutcome::Untracked);
        assert_eq!(fx.coordinator.ledger_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_routes_to_nested_navigator() {
        let fx = web();
        let _tab = fx.nav.push::<()>("tab");
        let child = fx.nav.nested("tab-home");
        let mut detail = child.push::<u32>("detail");
        settle(2).await;

        assert!(fx.history.go_back());
        assert_eq!(detail.try_result().unwrap().unwrap(), None);
        assert_eq!(child.depth(), 1);
        assert_eq!(fx.nav.depth(), 2);

        assert!(fx.history.go_back());
        assert_eq!(fx.nav.depth(), 1);
        assert!(!child.is_mounted());
        assert_eq!(fx.coordinator.ledger_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_unwinds_history_one_step_at_a_time() {
        let fx = web();
        let mut routes: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|name| fx.nav.push::<u32>(name))
            .collect();
        settle(3).await;
        assert_eq!(fx.history.cursor(), 3);

        fx.nav.unmount();
        for route in &mut routes {
            assert_eq!(route.try_result().unwrap().unwrap(), None);
        }
        assert_eq!(fx.coordinator.ledger_len(), 3);
        assert_eq!(fx.coordinator.navigator_count(), 0);

        settle(1).await;
        assert_eq!(fx.history.cursor(), 2);

        settle(2).await;
        assert_eq!(fx.history.cursor(), 0);
        assert_eq!(fx.coordinator.ledger_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_navigator() {
        let fx = web();
        let other = fx.coordinator.navigator("other");
        let _sheet = other.push::<()>("sheet");
        let other_id = other.id();
        settle(1).await;

        // the navigator goes away without unwinding through the ledger
        fx.coordinator.deregister(other_id);

        assert!(fx.history.go_back());
        assert_eq!(fx.coordinator.ledger_len(), 0);
        assert_eq!(other.depth(), 2);

        let bridge = fx.coordinator.bridge().unwrap();
        let _again = other.push::<()>("again");
        settle(1).await;
        fx.coordinator.deregister(other_id);
        let outcome = bridge.handle_pop_state(PopStateEvent::default());
        assert_eq!(outcome, BridgeOutcome::Stale(other_id));
    }

    #[test]
    fn test_detached_bridge() {
        let history = Arc::new(MemoryHistory::new());
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let queue = TaskQueue::with_runtime(runtime.handle().clone(), DELAY, DrainOrder::Fifo);
        let coordinator = Coordinator::<&str>::web(history, queue);
        let bridge = coordinator.bridge().unwrap();

        drop(coordinator);
        assert_eq!(
            bridge.handle_pop_state(PopStateEvent::default()),
            BridgeOutcome::Detached
        );
    }
}
