//! navstack Task Queue
//!
//! Serializes history mutations so the platform history subsystem can settle
//! between them. At most one action is in flight at any time; each action
//! fires after a fixed delay.

mod error;
mod queue;

pub use error::QueueError;
pub use queue::{DrainOrder, TaskQueue};

pub type Result<T> = std::result::Result<T, QueueError>;
