//! Navigation container
//!
//! Owns the coordinator for one application. Every navigator of the
//! application is built from here so they share one registry, one activity
//! ledger and one history queue.

use std::sync::Arc;

use navstack_history::{HistoryApi, MemoryHistory, PopStateEvent};
use navstack_navigator::{BridgeOutcome, Coordinator, HistoryBridge, Navigator};
use navstack_queue::TaskQueue;

use crate::config::{Config, Platform};
use crate::error::CoreError;
use crate::Result;

pub struct Navigation<S> {
    config: Config,
    coordinator: Coordinator<S>,
    /// Set when the container created its own in-memory history
    memory_history: Option<Arc<MemoryHistory>>,
}

impl<S: Send + 'static> Navigation<S> {
    /// Build from config. The web platform gets an in-memory history;
    /// use `with_history` to drive a real browser.
    pub fn new(config: Config) -> Result<Self> {
        match config.platform {
            Platform::Native => {
                tracing::info!(platform = %config.platform, "Navigation initialized");
                Ok(Self {
                    config,
                    coordinator: Coordinator::native(),
                    memory_history: None,
                })
            }
            Platform::Web => Self::with_memory_history(config),
        }
    }

    /// Web navigation mirrored into `history`. The host feeds popstate
    /// events to `handle_pop_state`.
    pub fn with_history(config: Config, history: Arc<dyn HistoryApi>) -> Result<Self> {
        if config.platform != Platform::Web {
            return Err(CoreError::Config(format!(
                "Browser history requires the web platform, got {}",
                config.platform
            )));
        }

        let queue = TaskQueue::new(config.queue_delay(), config.drain_order)?;
        let coordinator = Coordinator::web(history, queue);

        tracing::info!(
            platform = %config.platform,
            queue_delay_ms = config.queue_delay_ms,
            drain_order = %config.drain_order,
            "Navigation initialized"
        );

        Ok(Self {
            config,
            coordinator,
            memory_history: None,
        })
    }

    /// Web navigation over an in-process history whose events are routed
    /// straight into the bridge
    pub fn with_memory_history(config: Config) -> Result<Self> {
        let history = Arc::new(MemoryHistory::new());
        let mut navigation = Self::with_history(config, history.clone())?;

        if let Some(bridge) = navigation.coordinator.bridge() {
            bridge.listen(&history);
        }
        navigation.memory_history = Some(history);

        Ok(navigation)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn coordinator(&self) -> &Coordinator<S> {
        &self.coordinator
    }

    /// Mount a top-level navigator
    pub fn navigator(&self, root: S) -> Navigator<S> {
        self.coordinator.navigator(root)
    }

    pub fn bridge(&self) -> Option<HistoryBridge<S>> {
        self.coordinator.bridge()
    }

    pub fn memory_history(&self) -> Option<&Arc<MemoryHistory>> {
        self.memory_history.as_ref()
    }

    /// Route one back/forward event
    pub fn handle_pop_state(&self, event: PopStateEvent) -> Result<BridgeOutcome> {
        let bridge = self.bridge().ok_or(CoreError::NotWeb)?;
        Ok(bridge.handle_pop_state(event))
    }

    /// Route a back/forward event given as the JSON `event.state` of a
    /// browser `popstate`
    pub fn handle_pop_state_json(&self, state: &str) -> Result<BridgeOutcome> {
        let event = PopStateEvent::from_json(state)?;
        self.handle_pop_state(event)
    }
}

impl<S> std::fmt::Debug for Navigation<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigation")
            .field("config", &self.config)
            .field("coordinator", &self.coordinator)
            .finish()
    }
}
