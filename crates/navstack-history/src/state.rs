//! History state and the platform history API

use serde::{Deserialize, Serialize};

use crate::id::NavigatorId;
use crate::Result;

/// State attached to each history slot created by a navigator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryState {
    /// Page index at the time the slot was written
    pub index: i64,
    /// Navigator that created the slot
    pub active_navigator: Option<NavigatorId>,
}

impl HistoryState {
    pub fn new(index: i64, active_navigator: NavigatorId) -> Self {
        Self {
            index,
            active_navigator: Some(active_navigator),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Back/forward notification delivered by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopStateEvent {
    /// Index stored on the slot that is now current (0 for the initial slot)
    #[serde(default)]
    pub index: i64,
    #[serde(default)]
    pub active_navigator: Option<NavigatorId>,
}

impl PopStateEvent {
    /// Build the event for the slot that became current
    pub fn for_slot(state: Option<&HistoryState>) -> Self {
        match state {
            Some(state) => Self {
                index: state.index,
                active_navigator: state.active_navigator,
            },
            None => Self::default(),
        }
    }

    /// Parse the event payload forwarded by a browser `popstate` listener.
    /// A `null` state means the initial slot.
    pub fn from_json(json: &str) -> Result<Self> {
        let state: Option<PopStateEvent> = serde_json::from_str(json)?;
        Ok(state.unwrap_or_default())
    }
}

/// Sink for history mutations (`window.history` on the web)
pub trait HistoryApi: Send + Sync {
    fn push_state(&self, state: HistoryState);

    fn replace_state(&self, state: HistoryState);

    fn back(&self);
}

/// One call into a `HistoryApi`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMutation {
    Push(HistoryState),
    Replace(HistoryState),
    Back,
}

impl HistoryMutation {
    pub fn apply(self, history: &dyn HistoryApi) {
        match self {
            HistoryMutation::Push(state) => history.push_state(state),
            HistoryMutation::Replace(state) => history.replace_state(state),
            HistoryMutation::Back => history.back(),
        }
    }
}
