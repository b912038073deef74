//! navstack History
//!
//! The browser-history side of navigation:
//! - `HistoryApi`: the `pushState` / `replaceState` / `back` sink
//! - `PopStateEvent`: back/forward notifications coming from the host
//! - `ActivityLedger`: which navigator owns each history slot
//! - `MemoryHistory`: in-process history for tests and non-browser hosts

mod error;
mod id;
mod ledger;
mod memory;
mod state;

pub use error::HistoryError;
pub use id::NavigatorId;
pub use ledger::{ActivityLedger, LedgerEntry};
pub use memory::MemoryHistory;
pub use state::{HistoryApi, HistoryMutation, HistoryState, PopStateEvent};

pub type Result<T> = std::result::Result<T, HistoryError>;
