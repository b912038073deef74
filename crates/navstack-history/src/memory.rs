//! In-memory history
//!
//! Behaves like `window.history` for a single tab: a list of slots with a
//! cursor, where pushing truncates any forward slots and moving the cursor
//! emits a `PopStateEvent` to the registered listener.

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

use crate::state::{HistoryApi, HistoryState, PopStateEvent};

type Listener = Arc<dyn Fn(PopStateEvent) + Send + Sync>;

struct Slots {
    /// `None` is the initial page, which carries no state
    entries: Vec<Option<HistoryState>>,
    cursor: usize,
}

pub struct MemoryHistory {
    slots: Mutex<Slots>,
    listener: RwLock<Option<Listener>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(Slots {
                entries: vec![None],
                cursor: 0,
            }),
            listener: RwLock::new(None),
        }
    }

    /// Register the popstate listener, replacing any previous one
    pub fn set_listener<F>(&self, listener: F)
    where
        F: Fn(PopStateEvent) + Send + Sync + 'static,
    {
        *self.listener.write() = Some(Arc::new(listener));
    }

    /// User pressed the back button. Returns false at the first slot.
    pub fn go_back(&self) -> bool {
        let event = {
            let mut slots = self.slots.lock();
            if slots.cursor == 0 {
                return false;
            }
            slots.cursor -= 1;
            PopStateEvent::for_slot(slots.entries[slots.cursor].as_ref())
        };

        self.emit(event);
        true
    }

    /// User pressed the forward button. Returns false at the last slot.
    pub fn go_forward(&self) -> bool {
        let event = {
            let mut slots = self.slots.lock();
            if slots.cursor + 1 >= slots.entries.len() {
                return false;
            }
            slots.cursor += 1;
            PopStateEvent::for_slot(slots.entries[slots.cursor].as_ref())
        };

        self.emit(event);
        true
    }

    /// Position of the current slot (0 is the initial page)
    pub fn cursor(&self) -> usize {
        self.slots.lock().cursor
    }

    /// Total number of slots, including forward ones
    pub fn slot_count(&self) -> usize {
        self.slots.lock().entries.len()
    }

    pub fn current(&self) -> Option<HistoryState> {
        let slots = self.slots.lock();
        slots.entries[slots.cursor]
    }

    fn emit(&self, event: PopStateEvent) {
        // clone out so the listener may call back into this history
        let listener = self.listener.read().clone();
        match listener {
            Some(listener) => listener(event),
            None => tracing::debug!(index = event.index, "popstate with no listener"),
        }
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryApi for MemoryHistory {
    fn push_state(&self, state: HistoryState) {
        let mut slots = self.slots.lock();
        let keep = slots.cursor + 1;
        slots.entries.truncate(keep);
        slots.entries.push(Some(state));
        slots.cursor += 1;
        tracing::trace!(index = state.index, cursor = slots.cursor, "pushState");
    }

    fn replace_state(&self, state: HistoryState) {
        let mut slots = self.slots.lock();
        let cursor = slots.cursor;
        slots.entries[cursor] = Some(state);
    }

    fn back(&self) {
        if !self.go_back() {
            tracing::debug!("back() at the first history slot");
        }
    }
}
