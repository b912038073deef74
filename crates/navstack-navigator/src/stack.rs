//! Route stack owned by one navigator

use serde::Serialize;
use std::mem;

use crate::route::{Completer, Presentation, RouteEntry, RouteKey};

/// What the host needs to render a stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackSnapshot {
    pub depth: usize,
    pub top: RouteKey,
    pub presentation: Presentation,
}

/// Ordered routes. The root is always present, so the stack is never empty.
#[derive(Debug)]
pub struct RouteStack<S> {
    root: RouteEntry<S>,
    pushed: Vec<RouteEntry<S>>,
}

impl<S> RouteStack<S> {
    pub fn new(root: S) -> Self {
        Self {
            root: RouteEntry::root(root),
            pushed: Vec::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.pushed.len() + 1
    }

    pub fn can_go_back(&self) -> bool {
        !self.pushed.is_empty()
    }

    pub fn top(&self) -> &RouteEntry<S> {
        self.pushed.last().unwrap_or(&self.root)
    }

    pub fn push(&mut self, entry: RouteEntry<S>) {
        self.pushed.push(entry);
    }

    /// Swap the top entry, returning the outgoing one
    pub fn replace_top(&mut self, entry: RouteEntry<S>) -> RouteEntry<S> {
        let slot = self.pushed.last_mut().unwrap_or(&mut self.root);
        mem::replace(slot, entry)
    }

    /// Remove the top entry. The root is never removed.
    pub fn pop(&mut self) -> Option<RouteEntry<S>> {
        self.pushed.pop()
    }

    /// Remove every entry above the root, topmost first
    pub fn drain_pushed(&mut self) -> Vec<RouteEntry<S>> {
        let mut drained = mem::take(&mut self.pushed);
        drained.reverse();
        drained
    }

    /// A replace at the root leaves a completer there; unwinding claims it
    pub fn take_root_completer(&mut self) -> Option<Completer> {
        self.root.take_completer()
    }

    pub fn root_key(&self) -> &RouteKey {
        self.root.key()
    }

    /// Keys from root to top
    pub fn keys(&self) -> Vec<RouteKey> {
        std::iter::once(&self.root)
            .chain(self.pushed.iter())
            .map(|entry| entry.key().clone())
            .collect()
    }

    pub fn snapshot(&self) -> StackSnapshot {
        let top = self.top();
        StackSnapshot {
            depth: self.depth(),
            top: top.key().clone(),
            presentation: top.presentation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_pop() {
        let mut stack = RouteStack::new("home");
        assert_eq!(stack.depth(), 1);
        assert!(!stack.can_go_back());
        assert!(stack.pop().is_none());

        let (entry, _future) = RouteEntry::pushed::<()>("a", Presentation::Card);
        stack.push(entry);
        assert_eq!(stack.depth(), 2);
        assert_eq!(*stack.top().content(), "a");

        let popped = stack.pop().unwrap();
        assert_eq!(*popped.content(), "a");
        assert_eq!(*stack.top().content(), "home");
    }

    #[test]
    fn test_replace_keeps_depth() {
        let mut stack = RouteStack::new("home");
        let (a, _a) = RouteEntry::pushed::<()>("a", Presentation::Card);
        let (b, _b) = RouteEntry::pushed::<()>("b", Presentation::Modal);
        stack.push(a);

        let outgoing = stack.replace_top(b);
        assert_eq!(*outgoing.content(), "a");
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.snapshot().presentation, Presentation::Modal);
    }

    #[test]
    fn test_replace_root() {
        let mut stack = RouteStack::new("home");
        let (login, _login) = RouteEntry::pushed::<()>("login", Presentation::Card);

        let outgoing = stack.replace_top(login);
        assert_eq!(*outgoing.content(), "home");
        assert_eq!(stack.depth(), 1);
        assert!(!stack.can_go_back());
        assert!(stack.take_root_completer().is_some());
        assert!(stack.take_root_completer().is_none());
    }

    #[test]
    fn test_drain_is_top_down() {
        let mut stack = RouteStack::new("home");
        let mut futures = Vec::new();
        for name in ["a", "b", "c"] {
            let (entry, future) = RouteEntry::pushed::<()>(name, Presentation::Card);
            stack.push(entry);
            futures.push(future);
        }
        assert_eq!(stack.keys().len(), 4);

        let drained: Vec<&str> = stack
            .drain_pushed()
            .into_iter()
            .map(|entry| entry.dismiss(None))
            .collect();
        assert_eq!(drained, vec!["c", "b", "a"]);
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.keys(), vec![stack.root_key().clone()]);
    }
}
