//! navstack Navigator
//!
//! Stack navigators whose pushed routes hand a typed result back to the
//! caller when they are dismissed:
//!
//! ```ignore
//! let coordinator = Coordinator::native();
//! let nav = coordinator.navigator(Screen::Home);
//!
//! let color = nav.push::<Color>(Screen::Picker);
//! // ... later, from the picker screen
//! nav.pop_with(Color::Blue)?;
//!
//! assert_eq!(color.await?, Some(Color::Blue));
//! ```
//!
//! On the web platform the coordinator mirrors stacks into browser history
//! and the `HistoryBridge` turns back/forward events into pops.

mod bridge;
mod coordinator;
mod error;
mod navigator;
mod route;
mod stack;

pub use bridge::{BridgeOutcome, HistoryBridge};
pub use coordinator::Coordinator;
pub use error::NavigatorError;
pub use navigator::{Navigator, StackAction};
pub use route::{Completer, Presentation, RouteEntry, RouteFuture, RouteKey, RouteResult};
pub use stack::{RouteStack, StackSnapshot};

pub type Result<T> = std::result::Result<T, NavigatorError>;
