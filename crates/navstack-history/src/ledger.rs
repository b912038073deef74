//! Activity ledger
//!
//! One entry per history slot created on top of the initial page. The tail
//! names the navigator that must react to the next back event:
//!
//! ```text
//! push (nav-1)        → [nav-1]
//! push (nav-2)        → [nav-1, nav-2]
//! explicit pop nav-2  → [nav-1, ignore]      back() queued
//! back event          → [nav-1]              ignore consumed
//! ```
//!
//! Every history-depth change appends exactly one entry and every consumed
//! history event removes exactly one entry from the tail.
//!
//! When queued actions drain out of order a retire can run before the push
//! it undoes. The retire is then held per navigator and cancels that push.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::id::NavigatorId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerEntry {
    /// Slot owned by a navigator
    Navigator(NavigatorId),
    /// Slot produced by a compensating navigation; its event is swallowed
    Ignore,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityLedger {
    entries: Vec<LedgerEntry>,
    /// Mirror of the browser history index
    page_index: i64,
    /// Retires that found no slot, waiting for their push
    #[serde(skip)]
    early_retires: HashMap<NavigatorId, usize>,
}

impl ActivityLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a slot pushed by `navigator` and return the new page index.
    /// Returns `None` when an earlier retire already undid this push; no
    /// slot must be created then.
    pub fn record_push(&mut self, navigator: NavigatorId) -> Option<i64> {
        if let Some(pending) = self.early_retires.get_mut(&navigator) {
            *pending -= 1;
            if *pending == 0 {
                self.early_retires.remove(&navigator);
            }
            return None;
        }

        self.entries.push(LedgerEntry::Navigator(navigator));
        self.page_index += 1;
        Some(self.page_index)
    }

    /// Record a slot whose upcoming event must be swallowed
    pub fn record_ignore(&mut self) {
        self.entries.push(LedgerEntry::Ignore);
    }

    /// Drop the most recent slot owned by `navigator` and append a sentinel
    /// for the compensating `back()` the caller is about to issue.
    /// Returns false if the navigator owns no slot yet; its next push is
    /// then cancelled instead.
    pub fn retire(&mut self, navigator: NavigatorId) -> bool {
        let target = LedgerEntry::Navigator(navigator);
        match self.entries.iter().rposition(|entry| *entry == target) {
            Some(position) => {
                self.entries.remove(position);
                self.entries.push(LedgerEntry::Ignore);
                true
            }
            None => {
                *self.early_retires.entry(navigator).or_default() += 1;
                false
            }
        }
    }

    /// Retires still waiting for the push they undo
    pub fn pending_retires(&self, navigator: NavigatorId) -> usize {
        self.early_retires.get(&navigator).copied().unwrap_or(0)
    }

    /// Remove the tail entry for a consumed history event
    pub fn consume(&mut self) -> Option<LedgerEntry> {
        self.entries.pop()
    }

    pub fn tail(&self) -> Option<LedgerEntry> {
        self.entries.last().copied()
    }

    pub fn page_index(&self) -> i64 {
        self.page_index
    }

    pub fn set_page_index(&mut self, index: i64) {
        self.page_index = index;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Number of slots owned by `navigator`
    pub fn owned_by(&self, navigator: NavigatorId) -> usize {
        self.entries
            .iter()
            .filter(|entry| **entry == LedgerEntry::Navigator(navigator))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_advances_page_index() {
        let mut ledger = ActivityLedger::new();
        assert_eq!(ledger.record_push(NavigatorId::new(1)), Some(1));
        assert_eq!(ledger.record_push(NavigatorId::new(2)), Some(2));
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.tail(), Some(LedgerEntry::Navigator(NavigatorId::new(2))));
    }

    #[test]
    fn test_consume_never_goes_negative() {
        let mut ledger = ActivityLedger::new();
        assert!(ledger.consume().is_none());
        assert_eq!(ledger.len(), 0);

        ledger.record_push(NavigatorId::new(1));
        assert!(ledger.consume().is_some());
        assert!(ledger.consume().is_none());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_retire_keeps_other_slots_in_order() {
        let parent = NavigatorId::new(1);
        let child = NavigatorId::new(2);
        let mut ledger = ActivityLedger::new();
        ledger.record_push(parent);
        ledger.record_push(child);
        ledger.record_push(parent);

        assert!(ledger.retire(child));
        assert_eq!(
            ledger.entries(),
            &[
                LedgerEntry::Navigator(parent),
                LedgerEntry::Navigator(parent),
                LedgerEntry::Ignore,
            ]
        );
        assert_eq!(ledger.owned_by(parent), 2);
    }

    #[test]
    fn test_retire_before_push_cancels_it() {
        let nav = NavigatorId::new(1);
        let other = NavigatorId::new(2);
        let mut ledger = ActivityLedger::new();

        assert!(!ledger.retire(nav));
        assert!(!ledger.retire(nav));
        assert_eq!(ledger.pending_retires(nav), 2);
        assert!(ledger.is_empty());

        assert_eq!(ledger.record_push(other), Some(1));
        assert_eq!(ledger.record_push(nav), None);
        assert_eq!(ledger.record_push(nav), None);
        assert_eq!(ledger.pending_retires(nav), 0);
        assert_eq!(ledger.record_push(nav), Some(2));

        assert_eq!(
            ledger.entries(),
            &[LedgerEntry::Navigator(other), LedgerEntry::Navigator(nav)]
        );
    }
}
