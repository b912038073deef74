//! Route entries and their completers
//!
//! Every pushed route carries a `Completer`. Completing consumes it, so a
//! route can deliver at most one result; the stack guarantees it is
//! completed when the route is removed.

use serde::{Deserialize, Serialize};
use std::any::{Any, type_name};
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::error::NavigatorError;
use crate::Result;

/// Type-erased value handed back to whoever pushed a route
pub type RouteResult = Box<dyn Any + Send>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteKey(String);

impl RouteKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RouteKey {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RouteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the host should present a route. Stack semantics are identical.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presentation {
    #[default]
    Card,
    Modal,
}

pub struct Completer {
    sender: oneshot::Sender<Option<RouteResult>>,
}

impl Completer {
    pub fn channel<T>() -> (Self, RouteFuture<T>) {
        let (sender, receiver) = oneshot::channel();
        (
            Self { sender },
            RouteFuture {
                receiver,
                _result: PhantomData,
            },
        )
    }

    pub fn complete(self, result: Option<RouteResult>) {
        // the caller may have stopped waiting
        let _ = self.sender.send(result);
    }
}

impl std::fmt::Debug for Completer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completer")
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

#[derive(Debug)]
pub struct RouteEntry<S> {
    key: RouteKey,
    content: S,
    presentation: Presentation,
    completer: Option<Completer>,
}

impl<S> RouteEntry<S> {
    /// Initial entry of a navigator; nobody awaits it
    pub fn root(content: S) -> Self {
        Self {
            key: RouteKey::new(),
            content,
            presentation: Presentation::Card,
            completer: None,
        }
    }

    /// Entry for a push/replace, paired with the future its caller awaits
    pub fn pushed<T>(content: S, presentation: Presentation) -> (Self, RouteFuture<T>) {
        let (completer, future) = Completer::channel();
        let entry = Self {
            key: RouteKey::new(),
            content,
            presentation,
            completer: Some(completer),
        };
        (entry, future)
    }

    pub fn key(&self) -> &RouteKey {
        &self.key
    }

    pub fn content(&self) -> &S {
        &self.content
    }

    pub fn presentation(&self) -> Presentation {
        self.presentation
    }

    pub fn has_completer(&self) -> bool {
        self.completer.is_some()
    }

    pub(crate) fn take_completer(&mut self) -> Option<Completer> {
        self.completer.take()
    }

    /// Consume the entry, delivering `result` to its completer
    pub fn dismiss(self, result: Option<RouteResult>) -> S {
        if let Some(completer) = self.completer {
            completer.complete(result);
        }
        self.content
    }
}

/// Resolves once the pushed route is removed from its stack.
///
/// - `Ok(Some(value))`: popped with a `T`
/// - `Ok(None)`: popped without a result, replaced, or unwound
/// - `Err(ResultTypeMismatch)`: popped with a value of another type
/// - `Err(Abandoned)`: the route never reached a stack
pub struct RouteFuture<T> {
    receiver: oneshot::Receiver<Option<RouteResult>>,
    _result: PhantomData<fn() -> T>,
}

impl<T: Any> RouteFuture<T> {
    /// Non-blocking check; `None` while the route is still on its stack
    pub fn try_result(&mut self) -> Option<Result<Option<T>>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(downcast(result)),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(NavigatorError::Abandoned)),
        }
    }
}

impl<T: Any> Future for RouteFuture<T> {
    type Output = Result<Option<T>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(downcast(result)),
            Poll::Ready(Err(_)) => Poll::Ready(Err(NavigatorError::Abandoned)),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> std::fmt::Debug for RouteFuture<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteFuture")
            .field("result", &type_name::<T>())
            .finish()
    }
}

fn downcast<T: Any>(result: Option<RouteResult>) -> Result<Option<T>> {
    match result {
        Some(value) => value
            .downcast::<T>()
            .map(|value| Some(*value))
            .map_err(|_| NavigatorError::ResultTypeMismatch {
                expected: type_name::<T>(),
            }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dismiss_delivers_result() {
        let (entry, mut future) = RouteEntry::<&str>::pushed::<u32>("details", Presentation::Card);
        assert!(future.try_result().is_none());

        let content = entry.dismiss(Some(Box::new(42u32)));
        assert_eq!(content, "details");
        assert_eq!(future.try_result().unwrap().unwrap(), Some(42));
    }

    #[test]
    fn test_dismiss_without_result() {
        let (entry, mut future) = RouteEntry::<&str>::pushed::<String>("details", Presentation::Modal);
        assert_eq!(entry.presentation(), Presentation::Modal);
        entry.dismiss(None);
        assert_eq!(future.try_result().unwrap().unwrap(), None);
    }

    #[test]
    fn test_wrong_result_type() {
        let (entry, mut future) = RouteEntry::<&str>::pushed::<u32>("details", Presentation::Card);
        entry.dismiss(Some(Box::new("not a number")));
        assert!(matches!(
            future.try_result().unwrap(),
            Err(NavigatorError::ResultTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_dropped_entry_abandons_future() {
        let (entry, mut future) = RouteEntry::<&str>::pushed::<u32>("details", Presentation::Card);
        drop(entry);
        assert!(matches!(future.try_result().unwrap(), Err(NavigatorError::Abandoned)));
    }

    #[test]
    fn test_root_has_no_completer() {
        let root = RouteEntry::root("home");
        assert!(!root.has_completer());
        assert_ne!(root.key(), RouteEntry::root("home").key());
    }

    #[tokio::test]
    async fn test_await_result() {
        let (entry, future) = RouteEntry::<&str>::pushed::<String>("picker", Presentation::Card);
        tokio::spawn(async move {
            entry.dismiss(Some(Box::new("blue".to_string())));
        });
        assert_eq!(future.await.unwrap(), Some("blue".to_string()));
    }
}
